//! pressroll: a content pipeline for MDX blogs and podcast sites
//!
//! Source documents are matched to typed schemas, loaded into an immutable
//! collection, and resolved into listing and detail pages that can be
//! written out as a static site or served by the preview server.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod resolver;
pub mod schema;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::{ContentCollection, ContentLoader, LoadReport};
use schema::SchemaRegistry;

/// The application handle: configuration plus resolved directories
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory
    pub content_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static asset directory
    pub static_dir: PathBuf,
}

impl Site {
    /// Create a site from a directory, reading its config file if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = config::SiteConfig::load_from_dir(&base_dir)?;
        Ok(Self::with_config(base_dir, config))
    }

    /// Create a site with an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
            static_dir,
        }
    }

    /// Build the schema registry from configuration
    pub fn registry(&self) -> Result<SchemaRegistry> {
        self.config.registry()
    }

    /// Run one load pass over the content directory
    pub fn load(&self, registry: &SchemaRegistry) -> Result<LoadReport> {
        let loader = ContentLoader::with_compiler(registry, self.config.compiler());
        Ok(loader.load_all(&self.content_dir)?)
    }

    /// Load, failing with every per-document error if any document failed
    pub fn load_collection(&self, registry: &SchemaRegistry) -> Result<ContentCollection> {
        Ok(self.load(registry)?.into_collection()?)
    }

    /// Document type shown on the home page
    pub fn home_type<'r>(&self, registry: &'r SchemaRegistry) -> Option<&'r schema::DocumentType> {
        match &self.config.home {
            Some(name) => registry.get(name),
            None => registry.types().next(),
        }
    }
}
