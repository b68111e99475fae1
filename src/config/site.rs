//! Site configuration (_config.yml or _config.toml)

use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::content::MdxCompiler;
use crate::resolver::RenderContext;
use crate::schema::{self, DocumentType, FieldDef, SchemaRegistry};

/// Config file names, in lookup order
pub const CONFIG_FILES: &[&str] = &["_config.yml", "_config.yaml", "_config.toml"];

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,
    pub static_dir: String,

    // Writing
    #[serde(default)]
    pub external_link: ExternalLinkConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Date / Time format
    pub date_format: String,

    // Listing
    pub per_page: usize,
    pub feed_limit: usize,
    /// Document type listed on the home page
    pub home: Option<String>,

    // Content model
    #[serde(default)]
    pub document_types: Vec<DocumentTypeConfig>,

    // Free-form values exposed to templates
    #[serde(default)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Pressroll".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: "John Doe".to_string(),
            language: "en".to_string(),
            timezone: String::new(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            external_link: ExternalLinkConfig::default(),
            highlight: HighlightConfig::default(),

            date_format: "MMMM DD, YYYY".to_string(),

            per_page: 10,
            feed_limit: 20,
            home: None,

            document_types: Vec::new(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file; `.toml` files are read as TOML, anything else as YAML
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;

        let config: SiteConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config {:?}", path))?,
            _ if content.trim().is_empty() => SiteConfig::default(),
            _ => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config {:?}", path))?,
        };
        Ok(config)
    }

    /// Load the first config file found in `base_dir`, or the defaults
    pub fn load_from_dir<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        for name in CONFIG_FILES {
            let path = base_dir.as_ref().join(name);
            if path.exists() {
                tracing::debug!("Loading config from {:?}", path);
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    /// Build the schema registry; the default `Post` type when none are configured
    pub fn registry(&self) -> Result<SchemaRegistry> {
        let mut registry = SchemaRegistry::new();

        if self.document_types.is_empty() {
            registry.define_document_type(schema::post_type())?;
        }
        for ty in &self.document_types {
            registry.define_document_type(ty.to_document_type()?)?;
        }

        if let Some(home) = &self.home {
            if registry.get(home).is_none() {
                bail!("Home document type `{}` is not defined", home);
            }
        }

        Ok(registry)
    }

    /// Settings renderers need while rendering bodies
    pub fn render_context(&self) -> RenderContext {
        RenderContext {
            root: self.root.clone(),
            external_links: self.external_link.enable,
        }
    }

    /// MDX compiler with the configured highlighting
    pub fn compiler(&self) -> MdxCompiler {
        MdxCompiler::with_options(&self.highlight.theme, self.highlight.line_number)
    }
}

/// A document type declared in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTypeConfig {
    pub name: String,
    pub file_path_pattern: String,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDef>,
    /// Names of built-in computed fields
    #[serde(default)]
    pub computed_fields: Vec<String>,
}

impl DocumentTypeConfig {
    pub fn to_document_type(&self) -> Result<DocumentType> {
        let mut ty = DocumentType::new(&self.name, &self.file_path_pattern);
        if let Some(route) = &self.route {
            ty = ty.with_route(route);
        }
        for (name, def) in &self.fields {
            ty = ty.with_field(name, *def);
        }
        for name in &self.computed_fields {
            let compute = schema::builtin(name).ok_or_else(|| {
                anyhow!(
                    "Unknown computed field `{}` for `{}` (available: {})",
                    name,
                    self.name,
                    schema::BUILTIN_NAMES.join(", ")
                )
            })?;
            ty = ty.with_compute_fn(name, compute);
        }
        Ok(ty)
    }
}

/// External link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalLinkConfig {
    /// Open external links in a new tab
    pub enable: bool,
}

impl Default for ExternalLinkConfig {
    fn default() -> Self {
        Self { enable: true }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// syntect theme name
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.date_format, "MMMM DD, YYYY");
        assert_eq!(config.feed_limit, 20);

        let registry = config.registry().unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("Post").is_some());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Podcast
author: Test User
per_page: 20
external_link:
  enable: false
document_types:
  - name: Episode
    file_path_pattern: "episodes/*.mdx"
    fields:
      title: { type: string, required: true }
      number: { type: number, required: true }
      explicit: { type: boolean }
    computed_fields: [url, reading_time]
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Podcast");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.per_page, 20);
        assert!(!config.render_context().external_links);

        let registry = config.registry().unwrap();
        assert!(registry.get("Post").is_none());
        let episode = registry.get("Episode").unwrap();
        assert_eq!(episode.route(), "episodes");
        assert_eq!(episode.fields()["number"], FieldDef::required(FieldType::Number));
        assert!(!episode.fields()["explicit"].required);
        let computed: Vec<_> = episode.computed_fields().map(|(n, _)| n).collect();
        assert_eq!(computed, ["url", "reading_time"]);
    }

    #[test]
    fn test_unknown_field_type_is_rejected() {
        let yaml = r#"
document_types:
  - name: Episode
    file_path_pattern: "episodes/*.mdx"
    fields:
      number: { type: integer }
"#;
        assert!(serde_yaml::from_str::<SiteConfig>(yaml).is_err());
    }

    #[test]
    fn test_unknown_computed_field_is_rejected() {
        let config = SiteConfig {
            document_types: vec![DocumentTypeConfig {
                name: "Episode".into(),
                file_path_pattern: "episodes/*.mdx".into(),
                route: None,
                fields: IndexMap::new(),
                computed_fields: vec!["sentiment".into()],
            }],
            ..SiteConfig::default()
        };
        let err = config.registry().unwrap_err();
        assert!(err.to_string().contains("sentiment"));
    }

    #[test]
    fn test_unknown_home_type() {
        let config = SiteConfig {
            home: Some("Episode".into()),
            ..SiteConfig::default()
        };
        assert!(config.registry().is_err());
    }

    #[test]
    fn test_load_toml_from_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("_config.toml"),
            "title = \"Toml Site\"\nroot = \"/blog/\"\n\n[highlight]\nline_number = true\n",
        )
        .unwrap();

        let config = SiteConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.title, "Toml Site");
        assert_eq!(config.root, "/blog/");
        assert!(config.highlight.line_number);
        assert_eq!(config.highlight.theme, "base16-ocean.dark");

        let empty = TempDir::new().unwrap();
        assert_eq!(SiteConfig::load_from_dir(empty.path()).unwrap().title, "Pressroll");
    }
}
