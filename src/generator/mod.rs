//! Generator module - writes the static site using built-in Tera templates

use anyhow::{Context as _, Result};
use chrono::Datelike;
use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use std::fs;
use std::path::PathBuf;
use tera::Context;
use walkdir::WalkDir;

use crate::content::{ContentCollection, ContentRecord};
use crate::helpers::{date_xml, escape_xml, full_url_for, strip_html, url_for};
use crate::resolver::{Components, PageResolver, RenderContext, Summary};
use crate::schema::{DocumentType, FieldValue, SchemaRegistry};
use crate::templates::{
    ConfigData, DetailData, ListingData, MenuItem, NavPost, PaginationData, TemplateRenderer,
};
use crate::Site;

/// What one generation pass wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateStats {
    pub documents: usize,
    pub listing_pages: usize,
}

/// Static site generator using Tera templates
pub struct Generator<'s> {
    site: &'s Site,
    registry: &'s SchemaRegistry,
    renderer: TemplateRenderer,
    components: Components,
    render_ctx: RenderContext,
}

impl<'s> Generator<'s> {
    /// Create a new generator
    pub fn new(site: &'s Site, registry: &'s SchemaRegistry) -> Result<Self> {
        Ok(Self {
            site,
            registry,
            renderer: TemplateRenderer::new(&site.config)?,
            components: Components::new(),
            render_ctx: site.config.render_context(),
        })
    }

    /// Replace the component renderers used for document bodies
    pub fn with_components(mut self, components: Components) -> Self {
        self.components = components;
        self
    }

    /// Generate the entire site
    pub fn generate(&self, collection: &ContentCollection) -> Result<GenerateStats> {
        let public_dir = &self.site.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create {:?}", public_dir))?;

        self.copy_static_assets()?;

        let home = self.site.home_type(self.registry);
        let mut stats = GenerateStats::default();
        let mut search_entries = Vec::new();

        for doc_type in self.registry.types() {
            let resolver = PageResolver::new(collection, doc_type);
            let listing = resolver.list_page();

            let rendered = self.generate_detail_pages(&resolver, &listing)?;
            stats.documents += rendered.len();
            stats.listing_pages += self.generate_listing_pages(&resolver, false)?;

            if home.map(DocumentType::name) == Some(doc_type.name()) {
                stats.listing_pages += self.generate_listing_pages(&resolver, true)?;
                self.generate_atom_feed(&listing, &rendered)?;
            }

            search_entries.extend(listing.iter().map(|item| {
                let content = rendered.get(&item.slug).map(String::as_str).unwrap_or_default();
                serde_json::json!({
                    "title": item.title,
                    "type": doc_type.name(),
                    "url": url_for(&self.site.config.root, &item.url),
                    "content": strip_html(content).split_whitespace().collect::<Vec<_>>().join(" "),
                    "date": item.date.map(|d| d.format("%Y-%m-%d").to_string()),
                })
            }));
        }

        let not_found = self.render_not_found("/404.html")?;
        self.write(public_dir.join("404.html"), not_found)?;

        let json = serde_json::to_string_pretty(&search_entries)?;
        self.write(public_dir.join("search.json"), json)?;
        tracing::info!("Generated search.json");

        Ok(stats)
    }

    /// Navigation menu: one listing per document type
    pub fn menu(&self) -> Vec<MenuItem> {
        self.registry
            .types()
            .map(|ty| MenuItem {
                name: ty.name().to_string(),
                path: listing_base(ty, false),
            })
            .collect()
    }

    /// Number of listing pages for a type
    pub fn page_count(&self, resolver: &PageResolver<'_>) -> usize {
        let total = resolver.static_paths().len();
        match self.site.config.per_page {
            0 => 1,
            per_page => total.div_ceil(per_page).max(1),
        }
    }

    /// Render one listing page; `None` when the page number is out of range
    pub fn render_listing(
        &self,
        resolver: &PageResolver<'_>,
        page_num: usize,
        is_home: bool,
    ) -> Result<Option<String>> {
        let total_pages = self.page_count(resolver);
        if page_num == 0 || page_num > total_pages {
            return Ok(None);
        }

        let listing = resolver.list_page();
        let per_page = match self.site.config.per_page {
            0 => listing.len().max(1),
            n => n,
        };
        let start = (page_num - 1) * per_page;
        let end = (start + per_page).min(listing.len());
        let items = listing.get(start..end).map(<[Summary]>::to_vec).unwrap_or_default();

        let base = listing_base(resolver.doc_type(), is_home);
        let pagination = PaginationData {
            per_page,
            total: total_pages,
            current: page_num,
            current_url: page_url(&base, page_num),
            prev_link: if page_num > 1 {
                page_url(&base, page_num - 1)
            } else {
                String::new()
            },
            next_link: if page_num < total_pages {
                page_url(&base, page_num + 1)
            } else {
                String::new()
            },
        };

        let mut context = self.create_base_context(&pagination.current_url);
        context.insert(
            "listing",
            &ListingData {
                doc_type: resolver.doc_type().name().to_string(),
                is_home,
                items,
                pagination,
            },
        );

        self.renderer.render("index.html", &context).map(Some)
    }

    /// Render a detail page
    pub fn render_detail(&self, resolver: &PageResolver<'_>, record: &ContentRecord) -> Result<String> {
        let listing = resolver.list_page();
        let content = self.render_body(resolver, record)?;
        self.render_detail_with(resolver, record, &listing, content)
    }

    /// Render the 404 page for a request path
    pub fn render_not_found(&self, path: &str) -> Result<String> {
        let context = self.create_base_context(path);
        self.renderer.render("404.html", &context)
    }

    /// Create a base context with common variables
    fn create_base_context(&self, current_path: &str) -> Context {
        let mut context = Context::new();
        context.insert("config", &ConfigData::from(&self.site.config));
        context.insert("menu", &self.menu());
        context.insert("current_path", current_path);
        context.insert("current_year", &chrono::Utc::now().year().to_string());
        context
    }

    fn render_body(&self, resolver: &PageResolver<'_>, record: &ContentRecord) -> Result<String> {
        resolver
            .render(record, &self.components, &self.render_ctx)
            .with_context(|| format!("Failed to render {}", record.source))
    }

    fn render_detail_with(
        &self,
        resolver: &PageResolver<'_>,
        record: &ContentRecord,
        listing: &[Summary],
        content: String,
    ) -> Result<String> {
        let position = listing.iter().position(|s| s.slug == record.slug);
        let nav = |i: Option<usize>| {
            i.and_then(|i| listing.get(i)).map(|s| NavPost {
                title: s.title.clone(),
                path: s.url.clone(),
            })
        };
        // Listing is newest first: prev is older, next is newer
        let prev = nav(position.map(|i| i + 1));
        let next = nav(position.and_then(|i| i.checked_sub(1)));

        let fields: IndexMap<&str, &FieldValue> = record
            .fields
            .iter()
            .chain(record.computed.iter())
            .map(|(k, v)| (k.as_str(), v))
            .collect();

        let path = resolver.page_url(record);
        let page = DetailData {
            doc_type: record.doc_type.clone(),
            slug: record.slug.clone(),
            title: record.title().unwrap_or(&record.slug).to_string(),
            summary: record.summary().unwrap_or_default().to_string(),
            date: record.date().map(|d| d.to_rfc3339()).unwrap_or_default(),
            image: record.image().unwrap_or_default().to_string(),
            tags: string_list(record.get("tags")),
            reading_time: reading_time_text(record),
            path: path.clone(),
            content,
            fields: serde_json::to_value(&fields)?,
            prev,
            next,
        };

        let mut context = self.create_base_context(&path);
        context.insert("page", &page);
        self.renderer.render("detail.html", &context)
    }

    /// Generate every detail page of a type; returns the rendered bodies by slug
    fn generate_detail_pages(
        &self,
        resolver: &PageResolver<'_>,
        listing: &[Summary],
    ) -> Result<IndexMap<String, String>> {
        let mut rendered = IndexMap::new();

        for route in resolver.routes() {
            let content = self.render_body(resolver, route.record)?;
            let html = self.render_detail_with(resolver, route.record, listing, content.clone())?;

            let output_path = self.output_path(&route.path);
            self.write(output_path, html)?;
            tracing::debug!("Generated {}", route.path);

            rendered.insert(route.slug.to_string(), content);
        }

        Ok(rendered)
    }

    /// Generate listing pages with pagination
    fn generate_listing_pages(&self, resolver: &PageResolver<'_>, is_home: bool) -> Result<usize> {
        let base = listing_base(resolver.doc_type(), is_home);
        let total_pages = self.page_count(resolver);

        for page_num in 1..=total_pages {
            if let Some(html) = self.render_listing(resolver, page_num, is_home)? {
                self.write(self.output_path(&page_url(&base, page_num)), html)?;
            }
        }

        tracing::info!(
            "Generated {} listing page(s) for {}",
            total_pages,
            if is_home { "home" } else { resolver.doc_type().name() }
        );
        Ok(total_pages)
    }

    /// Generate Atom feed for the home type
    fn generate_atom_feed(&self, listing: &[Summary], rendered: &IndexMap<String, String>) -> Result<()> {
        let config = &self.site.config;
        let site_url = full_url_for(&config.url, &config.root, "/");
        let updated = listing
            .iter()
            .find_map(|s| s.date)
            .map(|d| date_xml(&d))
            .unwrap_or_else(|| date_xml(&chrono::Utc::now()));

        let mut feed = String::new();
        feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        feed.push('\n');
        feed.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
        feed.push('\n');
        feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
        feed.push_str(&format!(
            "  <link href=\"{}\" rel=\"self\"/>\n",
            full_url_for(&config.url, &config.root, "/atom.xml")
        ));
        feed.push_str(&format!("  <link href=\"{}\"/>\n", site_url));
        feed.push_str(&format!("  <updated>{}</updated>\n", updated));
        feed.push_str(&format!("  <id>{}</id>\n", site_url));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&config.author)
        ));

        for item in listing.iter().take(config.feed_limit) {
            let link = full_url_for(&config.url, &config.root, &item.url);
            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&item.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", link));
            feed.push_str(&format!("    <id>{}</id>\n", link));
            if let Some(date) = &item.date {
                feed.push_str(&format!("    <published>{}</published>\n", date_xml(date)));
                feed.push_str(&format!("    <updated>{}</updated>\n", date_xml(date)));
            }
            if !item.summary.is_empty() {
                feed.push_str(&format!(
                    "    <summary>{}</summary>\n",
                    escape_xml(&item.summary)
                ));
            }
            if let Some(content) = rendered.get(&item.slug) {
                let base_url = config.url.trim_end_matches('/');
                let content = strip_invalid_xml_chars(&convert_relative_urls_to_absolute(content, base_url));
                feed.push_str(&format!(
                    "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                    content.replace("]]>", "]]]]><![CDATA[>")
                ));
            }
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");

        self.write(self.site.public_dir.join("atom.xml"), feed)?;
        tracing::info!("Generated atom.xml");

        Ok(())
    }

    /// Copy the static directory to the public directory verbatim
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.site.static_dir;
        if !static_dir.is_dir() {
            return Ok(());
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.site.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest).with_context(|| format!("Failed to copy {:?}", path))?;
            copied += 1;
        }

        tracing::debug!("Copied {} static file(s)", copied);
        Ok(())
    }

    /// `public/<path>/index.html` for a root-relative page path
    fn output_path(&self, url: &str) -> PathBuf {
        let decoded = percent_decode_str(url.trim_matches('/')).decode_utf8_lossy();
        let mut path = self.site.public_dir.clone();
        for segment in decoded.split('/').filter(|s| !s.is_empty() && *s != "..") {
            path.push(segment);
        }
        path.join("index.html")
    }

    fn write(&self, path: PathBuf, contents: String) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir {:?}", parent))?;
        }
        fs::write(&path, contents).with_context(|| format!("Failed to write {:?}", path))
    }
}

/// `/` for the home listing, `/<route>/` otherwise
fn listing_base(doc_type: &DocumentType, is_home: bool) -> String {
    if is_home || doc_type.route().is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", doc_type.route())
    }
}

/// First page lives at the base; later pages under `page/<n>/`
fn page_url(base: &str, page_num: usize) -> String {
    if page_num <= 1 {
        base.to_string()
    } else {
        format!("{}page/{}/", base, page_num)
    }
}

fn string_list(value: Option<&FieldValue>) -> Vec<String> {
    value
        .and_then(FieldValue::as_list)
        .map(|items| {
            items
                .iter()
                .filter_map(FieldValue::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn reading_time_text(record: &ContentRecord) -> String {
    match record.computed.get("reading_time") {
        Some(FieldValue::Map(map)) => map
            .get("text")
            .and_then(FieldValue::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

/// Convert root-relative URLs in HTML content to absolute URLs
fn convert_relative_urls_to_absolute(content: &str, base_url: &str) -> String {
    content
        .replace("href=\"/", &format!("href=\"{}/", base_url))
        .replace("src=\"/", &format!("src=\"{}/", base_url))
        .replace("href='/", &format!("href='{}/", base_url))
        .replace("src='/", &format!("src='{}/", base_url))
}

/// Strip characters XML 1.0 does not allow
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}
