//! Page resolver - maps loaded records of one document type to pages

mod components;

pub use components::{
    Audio, Callout, Components, ImageProps, ImageRenderer, LinkProps, LinkRenderer, RenderContext,
    RenderError, SiteImage, SiteLink, TagRenderer,
};

use chrono::{DateTime, FixedOffset};
use indexmap::IndexSet;
use serde::Serialize;
use std::cmp::Ordering;

use crate::content::{ContentCollection, ContentRecord, Node};
use crate::helpers::url_path;
use crate::schema::{DocumentType, FieldValue};

/// One entry of a listing page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub date: Option<DateTime<FixedOffset>>,
    /// Root-relative page path
    pub url: String,
}

/// A detail page known ahead of time
#[derive(Debug, Clone, PartialEq)]
pub struct PageRoute<'a> {
    pub slug: &'a str,
    /// Root-relative page path
    pub path: String,
    pub record: &'a ContentRecord,
}

/// Outcome of resolving a slug
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    Found(&'a ContentRecord),
    NotFound,
}

impl<'a> Resolution<'a> {
    pub fn found(self) -> Option<&'a ContentRecord> {
        match self {
            Resolution::Found(record) => Some(record),
            Resolution::NotFound => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound)
    }
}

/// Resolves pages for a single document type
#[derive(Debug, Clone, Copy)]
pub struct PageResolver<'a> {
    collection: &'a ContentCollection,
    doc_type: &'a DocumentType,
}

impl<'a> PageResolver<'a> {
    pub fn new(collection: &'a ContentCollection, doc_type: &'a DocumentType) -> Self {
        Self {
            collection,
            doc_type,
        }
    }

    pub fn doc_type(&self) -> &'a DocumentType {
        self.doc_type
    }

    fn records(&self) -> impl Iterator<Item = &'a ContentRecord> + 'a {
        self.collection.of_type(self.doc_type.name())
    }

    /// Summaries sorted by date, newest first.
    ///
    /// Ties and dateless records keep load order; dateless records come last.
    pub fn list_page(&self) -> Vec<Summary> {
        let mut records: Vec<&ContentRecord> = self.records().collect();
        records.sort_by(|a, b| match (a.date(), b.date()) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        records
            .into_iter()
            .map(|record| Summary {
                slug: record.slug.clone(),
                title: record.title().unwrap_or(&record.slug).to_string(),
                summary: record.summary().unwrap_or_default().to_string(),
                date: record.date().copied(),
                url: self.page_url(record),
            })
            .collect()
    }

    /// Every slug of the type, in load order
    pub fn static_paths(&self) -> IndexSet<&'a str> {
        self.records().map(|r| r.slug.as_str()).collect()
    }

    /// Every detail page of the type, in load order
    pub fn routes(&self) -> Vec<PageRoute<'a>> {
        self.records()
            .map(|record| PageRoute {
                slug: &record.slug,
                path: self.page_url(record),
                record,
            })
            .collect()
    }

    pub fn resolve(&self, slug: &str) -> Resolution<'a> {
        match self.collection.get(self.doc_type.name(), slug) {
            Some(record) => Resolution::Found(record),
            None => Resolution::NotFound,
        }
    }

    /// Render a record's compiled body, substituting components by tag name
    pub fn render(
        &self,
        record: &ContentRecord,
        components: &Components,
        ctx: &RenderContext,
    ) -> Result<String, RenderError> {
        render_nodes(&record.body.nodes, components, ctx)
    }

    /// The record's `url` computed field, or `/<route>/<slug>/`
    pub fn page_url(&self, record: &ContentRecord) -> String {
        match record.computed.get("url") {
            Some(FieldValue::String(url)) => url.clone(),
            _ => url_path(self.doc_type.route(), &record.slug),
        }
    }
}

fn render_nodes(nodes: &[Node], components: &Components, ctx: &RenderContext) -> Result<String, RenderError> {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Html { html } => out.push_str(html),
            Node::Link {
                href,
                title,
                children,
            } => {
                let children = render_nodes(children, components, ctx)?;
                out.push_str(&components.link(
                    &LinkProps {
                        href,
                        title,
                        children: &children,
                    },
                    ctx,
                )?);
            }
            Node::Image { src, alt, title } => {
                out.push_str(&components.image(
                    &ImageProps {
                        src,
                        alt,
                        title,
                        ..ImageProps::default()
                    },
                    ctx,
                )?);
            }
            Node::Component {
                name,
                props,
                children,
            } => {
                let children = render_nodes(children, components, ctx)?;
                out.push_str(&components.component(name, props, &children, ctx)?);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::load_all;
    use crate::schema::{post_type, SchemaRegistry};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn post(title: &str, date: &str, body: &str) -> String {
        format!(
            "---\ntitle: {}\ndate: {}\nsummary: About {}\nimage: /images/{}.png\n---\n\n{}\n",
            title, date, title, title, body
        )
    }

    fn load(files: &[(&str, String)]) -> (TempDir, SchemaRegistry, ContentCollection) {
        let dir = TempDir::new().unwrap();
        for (rel, content) in files {
            write(dir.path(), rel, content);
        }
        let mut registry = SchemaRegistry::new();
        registry.define_document_type(post_type()).unwrap();
        let collection = load_all(dir.path(), &registry).unwrap().collection;
        (dir, registry, collection)
    }

    #[test]
    fn test_list_page_newest_first() {
        let (_dir, registry, collection) = load(&[
            ("posts/a.mdx", post("A", "2022-02-05", "First.")),
            ("posts/b.mdx", post("B", "2022-03-01", "Second.")),
        ]);
        let resolver = PageResolver::new(&collection, registry.get("Post").unwrap());

        let listing = resolver.list_page();
        let titles: Vec<_> = listing.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["B", "A"]);
        assert_eq!(listing[0].slug, "b");
        assert_eq!(listing[0].summary, "About B");
        assert_eq!(listing[0].url, "/posts/b/");
        assert!(listing.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn test_ties_and_dateless_keep_load_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "notes/x.md", "---\ntitle: X\n---\nx");
        write(dir.path(), "notes/y.md", "---\ntitle: Y\ndate: 2021-01-01\n---\ny");
        write(dir.path(), "notes/z.md", "---\ndate: 2021-01-01\n---\nz");
        write(dir.path(), "notes/w.md", "---\ndate: 2023-01-01\n---\nw");

        let mut registry = SchemaRegistry::new();
        registry
            .define_document_type(
                DocumentType::new("Note", "notes/*.md")
                    .with_field("title", crate::schema::FieldDef::optional(crate::schema::FieldType::String))
                    .with_field("date", crate::schema::FieldDef::optional(crate::schema::FieldType::Date)),
            )
            .unwrap();
        let collection = load_all(dir.path(), &registry).unwrap().collection;
        let resolver = PageResolver::new(&collection, registry.get("Note").unwrap());

        let listing = resolver.list_page();
        let slugs: Vec<_> = listing.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, ["w", "y", "z", "x"]);
        // missing title falls back to the slug, missing summary to ""
        assert_eq!(listing[2].title, "z");
        assert_eq!(listing[2].summary, "");
        assert_eq!(listing[0].url, "/notes/w/");
    }

    #[test]
    fn test_static_paths_and_resolve() {
        let (_dir, registry, collection) = load(&[
            ("posts/a.mdx", post("A", "2022-02-05", "First.")),
            ("posts/b.mdx", post("B", "2022-03-01", "Second.")),
        ]);
        let resolver = PageResolver::new(&collection, registry.get("Post").unwrap());

        let paths = resolver.static_paths();
        assert_eq!(paths.iter().copied().collect::<Vec<_>>(), ["a", "b"]);

        let routes = resolver.routes();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[1].path, "/posts/b/");
        assert_eq!(routes[1].record.title(), Some("B"));

        let first = resolver.resolve("a");
        assert_eq!(first, resolver.resolve("a"));
        assert_eq!(first.found().and_then(|r| r.title()), Some("A"));
        assert!(resolver.resolve("missing").is_not_found());
    }

    #[test]
    fn test_render_substitutes_components() {
        let body = "Listen to [episode one](/posts/a/) or [elsewhere](https://example.com).\n\n\
                    <Audio src=\"/audio/1.mp3\" title=\"Episode 1\" />\n\n\
                    <Callout type=\"tip\">\n\nTake **notes**.\n\n</Callout>\n";
        let (_dir, registry, collection) = load(&[("posts/a.mdx", post("A", "2022-02-05", body))]);
        let resolver = PageResolver::new(&collection, registry.get("Post").unwrap());
        let record = resolver.resolve("a").found().unwrap();

        let ctx = RenderContext {
            root: "/blog/".into(),
            external_links: true,
        };
        let html = resolver.render(record, &Components::new(), &ctx).unwrap();
        assert!(html.contains(r#"<a href="/blog/posts/a/">episode one</a>"#));
        assert!(html.contains(r#"target="_blank""#));
        assert!(html.contains(r#"<source src="/blog/audio/1.mp3" type="audio/mpeg">"#));
        assert!(html.contains(r#"<aside class="callout callout-tip">"#));
        assert!(html.contains("<strong>notes</strong>"));

        let err = resolver
            .render(record, &Components::bare(), &ctx)
            .unwrap_err();
        assert_eq!(err, RenderError::UnknownComponent("Audio".into()));
    }
}
