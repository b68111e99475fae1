//! Load errors

use std::path::PathBuf;
use thiserror::Error;

use super::frontmatter::FrontMatterError;
use super::mdx::CompileError;
use crate::schema::ValidationError;

/// Why a single document failed to load
#[derive(Error, Debug)]
pub enum DocumentErrorKind {
    #[error("could not read file: {0}")]
    Read(#[from] std::io::Error),

    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("computed field `{field}` failed: {reason}")]
    ComputedField { field: String, reason: String },

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// A document-scoped failure. The document is skipped; its siblings still load.
#[derive(Error, Debug)]
#[error("{path} ({doc_type}): {kind}")]
pub struct DocumentError {
    /// Source path relative to the content directory
    pub path: String,
    pub doc_type: String,
    #[source]
    pub kind: DocumentErrorKind,
}

impl DocumentError {
    pub fn is_validation(&self) -> bool {
        matches!(self.kind, DocumentErrorKind::Validation(_))
    }
}

/// A failure that aborts the whole load pass
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("content directory {0:?} does not exist")]
    MissingContentDir(PathBuf),

    #[error("duplicate slug `{slug}` for {doc_type}: {first} and {second}")]
    DuplicateSlug {
        doc_type: String,
        slug: String,
        first: String,
        second: String,
    },

    #[error("could not walk content directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("{} document(s) failed to load:\n{}", .0.len(), list_errors(.0))]
    Documents(Vec<DocumentError>),
}

fn list_errors(errors: &[DocumentError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
