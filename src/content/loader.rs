//! Content loader - loads typed records from the content directory

use indexmap::IndexMap;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::error::{DocumentError, DocumentErrorKind, LoadError};
use super::mdx::MdxCompiler;
use super::{ContentCollection, ContentRecord, FrontMatter};
use crate::schema::{Document, DocumentType, SchemaRegistry};

/// Outcome of a load pass
#[derive(Debug)]
pub struct LoadReport {
    /// Every document that loaded successfully
    pub collection: ContentCollection,
    /// Document-scoped failures, in load order
    pub errors: Vec<DocumentError>,
    /// Files no document type claimed, relative to the content directory
    pub stray_files: Vec<PathBuf>,
}

impl LoadReport {
    /// Whether every claimed document loaded
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// The collection, or every per-document error if any document failed
    pub fn into_collection(self) -> Result<ContentCollection, LoadError> {
        if self.errors.is_empty() {
            Ok(self.collection)
        } else {
            Err(LoadError::Documents(self.errors))
        }
    }
}

/// A file claimed by a document type
struct Claimed<'r> {
    doc_type: &'r DocumentType,
    slug: String,
    source: String,
    path: PathBuf,
}

/// Loads content from the content directory
pub struct ContentLoader<'r> {
    registry: &'r SchemaRegistry,
    compiler: MdxCompiler,
}

impl<'r> ContentLoader<'r> {
    /// Create a new content loader
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self::with_compiler(registry, MdxCompiler::new())
    }

    /// Create a loader with a configured compiler
    pub fn with_compiler(registry: &'r SchemaRegistry, compiler: MdxCompiler) -> Self {
        Self { registry, compiler }
    }

    /// Load every document under `content_dir`.
    ///
    /// Document-scoped failures are collected in the report; a duplicate slug
    /// aborts the whole pass before any file is parsed.
    pub fn load_all(&self, content_dir: &Path) -> Result<LoadReport, LoadError> {
        if !content_dir.is_dir() {
            return Err(LoadError::MissingContentDir(content_dir.to_path_buf()));
        }

        let (claimed, stray_files) = self.enumerate(content_dir)?;

        for stray in &stray_files {
            tracing::warn!("No document type matches {}, skipping", stray.display());
        }

        // Each file is independent; results are merged in enumeration order
        let results: Vec<Result<ContentRecord, DocumentError>> =
            claimed.par_iter().map(|c| self.load_document(c)).collect();

        let mut records = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Failed to load {}", e);
                    errors.push(e);
                }
            }
        }

        tracing::debug!(
            "Loaded {} documents ({} failed, {} unmatched)",
            records.len(),
            errors.len(),
            stray_files.len()
        );

        Ok(LoadReport {
            collection: ContentCollection::from_records(records),
            errors,
            stray_files,
        })
    }

    /// Walk the content directory and assign files to document types
    fn enumerate(&self, content_dir: &Path) -> Result<(Vec<Claimed<'r>>, Vec<PathBuf>), LoadError> {
        let mut claimed = Vec::new();
        let mut stray = Vec::new();
        let mut seen: HashMap<(&str, String), String> = HashMap::new();

        let walker = WalkDir::new(content_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(content_dir).unwrap_or(path);

            let Some(doc_type) = self.registry.match_path(relative) else {
                stray.push(relative.to_path_buf());
                continue;
            };

            let slug = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let source = relative_source(relative);

            if let Some(first) = seen.insert((doc_type.name(), slug.clone()), source.clone()) {
                return Err(LoadError::DuplicateSlug {
                    doc_type: doc_type.name().to_string(),
                    slug,
                    first,
                    second: source,
                });
            }

            tracing::debug!("{} claimed {}", doc_type.name(), source);
            claimed.push(Claimed {
                doc_type,
                slug,
                source,
                path: path.to_path_buf(),
            });
        }

        Ok((claimed, stray))
    }

    /// Load a single document
    fn load_document(&self, claimed: &Claimed<'_>) -> Result<ContentRecord, DocumentError> {
        let fail = |kind: DocumentErrorKind| DocumentError {
            path: claimed.source.clone(),
            doc_type: claimed.doc_type.name().to_string(),
            kind,
        };

        let content = fs::read_to_string(&claimed.path).map_err(|e| fail(e.into()))?;
        let (fm, body) = FrontMatter::parse(&content).map_err(|e| fail(e.into()))?;
        let (fields, extra) = claimed
            .doc_type
            .validate(fm.fields)
            .map_err(|e| fail(e.into()))?;

        let document = Document {
            doc_type: claimed.doc_type.name(),
            slug: &claimed.slug,
            source: &claimed.source,
            route: claimed.doc_type.route(),
            fields: &fields,
            body,
        };

        let mut computed = IndexMap::new();
        for (name, compute) in claimed.doc_type.computed_fields() {
            let value = compute(&document).map_err(|e| {
                fail(DocumentErrorKind::ComputedField {
                    field: name.to_string(),
                    reason: format!("{:#}", e),
                })
            })?;
            computed.insert(name.to_string(), value);
        }

        let compiled = self.compiler.compile(body).map_err(|e| fail(e.into()))?;

        Ok(ContentRecord {
            doc_type: claimed.doc_type.name().to_string(),
            slug: claimed.slug.clone(),
            source: claimed.source.clone(),
            full_source: claimed.path.clone(),
            fields,
            extra,
            computed,
            raw: body.to_string(),
            body: compiled,
        })
    }
}

/// Load every document under `content_dir` with a default compiler
pub fn load_all(content_dir: &Path, registry: &SchemaRegistry) -> Result<LoadReport, LoadError> {
    ContentLoader::new(registry).load_all(content_dir)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// Relative path with `/` separators on every platform
fn relative_source(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
