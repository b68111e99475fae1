//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded in the binary, so a site needs nothing but its
//! content directory and config file to build.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::helpers::{format_iso, strip_html, truncate, url_for};
use crate::resolver::Summary;

/// Template renderer with the embedded templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates and filters loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        // Bodies are pre-rendered HTML; user text is escaped in the templates
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("layout.html")),
            ("index.html", include_str!("index.html")),
            ("detail.html", include_str!("detail.html")),
            ("404.html", include_str!("404.html")),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        let format = config.date_format.clone();
        let timezone = config.timezone.clone();
        tera.register_filter(
            "date_format",
            move |value: &tera::Value, args: &HashMap<String, tera::Value>| {
                date_format_filter(value, args, &format, &timezone)
            },
        );

        let root = config.root.clone();
        tera.register_filter(
            "url_for",
            move |value: &tera::Value, _args: &HashMap<String, tera::Value>| {
                let path = tera::try_get_value!("url_for", "value", String, value);
                Ok(tera::Value::String(url_for(&root, &path)))
            },
        );

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(strip_html(&s)))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => Some(tera::try_get_value!("truncate_chars", "omission", String, val)),
        None => None,
    };

    Ok(tera::Value::String(truncate(&s, length, omission.as_deref())))
}

/// Tera filter: format an ISO date with a Moment-style format.
///
/// Unparseable values pass through unchanged.
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
    default_format: &str,
    timezone: &str,
) -> tera::Result<tera::Value> {
    if value.is_null() {
        return Ok(tera::Value::String(String::new()));
    }
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => default_format.to_string(),
    };

    Ok(tera::Value::String(
        format_iso(&s, &format, timezone).unwrap_or(s),
    ))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub url: String,
    pub root: String,
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl From<&SiteConfig> for ConfigData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            url: config.url.clone(),
            root: config.root.clone(),
            extra: config.extra.clone(),
        }
    }
}

/// A document type in the navigation menu
#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub per_page: usize,
    pub total: usize,
    pub current: usize,
    pub current_url: String,
    pub prev_link: String,
    pub next_link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingData {
    /// Document type name
    pub doc_type: String,
    pub is_home: bool,
    pub items: Vec<Summary>,
    pub pagination: PaginationData,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailData {
    pub doc_type: String,
    pub slug: String,
    pub title: String,
    pub summary: String,
    /// RFC 3339, empty when the document has no date
    pub date: String,
    pub image: String,
    pub tags: Vec<String>,
    pub reading_time: String,
    pub path: String,
    pub content: String,
    /// Every declared and computed field, for type-specific templates
    pub fields: serde_json::Value,
    pub prev: Option<NavPost>,
    pub next: Option<NavPost>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> TemplateRenderer {
        let config = SiteConfig {
            root: "/blog/".into(),
            timezone: "Asia/Shanghai".into(),
            ..SiteConfig::default()
        };
        TemplateRenderer::new(&config).unwrap()
    }

    #[test]
    fn test_filters() {
        let mut tera = renderer().tera;
        let mut context = Context::new();
        context.insert("date", "2022-02-05T20:00:00+00:00");
        context.insert("html", "<p>Hello <b>world</b></p>");

        let out = tera
            .render_str(
                "{{ date | date_format }}|{{ date | date_format(format='YYYY-MM-DD') }}|{{ html | strip_html | trim }}|{{ '/posts/a/' | url_for }}",
                &context,
            )
            .unwrap();
        assert_eq!(out, "February 06, 2022|2022-02-06|Hello  world|/blog/posts/a/");
    }

    #[test]
    fn test_not_found_page_renders() {
        let renderer = renderer();
        let mut context = Context::new();
        context.insert("config", &ConfigData::from(&SiteConfig::default()));
        context.insert("menu", &Vec::<MenuItem>::new());
        context.insert("current_path", "/missing/");
        context.insert("current_year", "2022");
        let html = renderer.render("404.html", &context).unwrap();
        assert!(html.contains("404"));
    }
}
