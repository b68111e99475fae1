//! Schema registry - declares document types, their fields and computed fields

mod computed;
mod field;

pub use computed::{builtin, BUILTIN_NAMES};
pub use field::{FieldDef, FieldType, FieldValue};

use glob::{MatchOptions, Pattern};
use indexmap::IndexMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while registering a document type
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("document type name must not be empty")]
    EmptyName,

    #[error("document type `{0}` is already registered")]
    DuplicateType(String),

    #[error("invalid file pattern `{pattern}` for `{name}`: {reason}")]
    InvalidPattern {
        name: String,
        pattern: String,
        reason: String,
    },
}

/// A declared field rejected a document's front-matter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("field `{field}` should be {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        found: &'static str,
    },

    #[error("field `{field}` is not a valid date: {value:?}")]
    InvalidDate { field: String, value: String },
}

/// The validated view of a document that computed fields are evaluated against.
///
/// Computed fields only see declared fields and the raw body; they never see
/// each other, so their evaluation order cannot change the result.
pub struct Document<'a> {
    pub doc_type: &'a str,
    pub slug: &'a str,
    pub source: &'a str,
    pub route: &'a str,
    pub fields: &'a IndexMap<String, FieldValue>,
    pub body: &'a str,
}

impl Document<'_> {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// A computed field function
pub type ComputeFn = Arc<dyn Fn(&Document<'_>) -> anyhow::Result<FieldValue> + Send + Sync>;

/// A content document type
#[derive(Clone)]
pub struct DocumentType {
    name: String,
    file_path_pattern: String,
    route: String,
    fields: IndexMap<String, FieldDef>,
    computed: IndexMap<String, ComputeFn>,
}

impl DocumentType {
    /// Create a new document type matching files under the content directory
    pub fn new(name: impl Into<String>, file_path_pattern: impl Into<String>) -> Self {
        let name = name.into();
        let route = default_route(&name);
        Self {
            name,
            file_path_pattern: file_path_pattern.into(),
            route,
            fields: IndexMap::new(),
            computed: IndexMap::new(),
        }
    }

    /// Set the URL prefix of this type's pages
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into().trim_matches('/').to_string();
        self
    }

    /// Declare a front-matter field
    pub fn with_field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    /// Declare a computed field
    pub fn with_computed<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Document<'_>) -> anyhow::Result<FieldValue> + Send + Sync + 'static,
    {
        self.computed.insert(name.into(), Arc::new(f));
        self
    }

    pub(crate) fn with_compute_fn(mut self, name: impl Into<String>, f: ComputeFn) -> Self {
        self.computed.insert(name.into(), f);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_path_pattern(&self) -> &str {
        &self.file_path_pattern
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn fields(&self) -> &IndexMap<String, FieldDef> {
        &self.fields
    }

    pub fn computed_fields(&self) -> impl Iterator<Item = (&str, &ComputeFn)> {
        self.computed.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Validate raw front-matter against the declared fields.
    ///
    /// Returns the typed declared fields and the undeclared remainder.
    pub fn validate(
        &self,
        raw: IndexMap<String, serde_yaml::Value>,
    ) -> Result<
        (
            IndexMap<String, FieldValue>,
            IndexMap<String, serde_yaml::Value>,
        ),
        ValidationError,
    > {
        let mut raw = raw;
        let mut fields = IndexMap::new();

        for (name, def) in &self.fields {
            match raw.shift_remove(name) {
                None | Some(serde_yaml::Value::Null) => {
                    if def.required {
                        return Err(ValidationError::MissingField(name.clone()));
                    }
                }
                Some(value) => {
                    fields.insert(name.clone(), def.ty.coerce(name, &value)?);
                }
            }
        }

        Ok((fields, raw))
    }
}

impl fmt::Debug for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentType")
            .field("name", &self.name)
            .field("file_path_pattern", &self.file_path_pattern)
            .field("route", &self.route)
            .field("fields", &self.fields)
            .field("computed", &self.computed.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// `Post` -> `posts`, `PodcastEpisode` -> `podcastepisodes`
fn default_route(name: &str) -> String {
    let lower = name.to_lowercase();
    if lower.ends_with('s') {
        lower
    } else {
        format!("{}s", lower)
    }
}

/// The example blog type: every post carries a title, date, summary and cover image
pub fn post_type() -> DocumentType {
    DocumentType::new("Post", "posts/**/*.{md,mdx}")
        .with_field("title", FieldDef::required(FieldType::String))
        .with_field("date", FieldDef::required(FieldType::Date))
        .with_field("summary", FieldDef::required(FieldType::String))
        .with_field("image", FieldDef::required(FieldType::String))
        .with_field("tags", FieldDef::optional(FieldType::List))
        .with_compute_fn("reading_time", computed::reading_time())
        .with_compute_fn("url", computed::url())
}

struct Registered {
    ty: DocumentType,
    patterns: Vec<Pattern>,
}

/// Registry of all document types known to a build
#[derive(Default)]
pub struct SchemaRegistry {
    types: Vec<Registered>,
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.types()).finish()
    }
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document type
    pub fn define_document_type(&mut self, ty: DocumentType) -> Result<&DocumentType, SchemaError> {
        if ty.name.trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }
        if self.get(&ty.name).is_some() {
            return Err(SchemaError::DuplicateType(ty.name));
        }

        let patterns = expand_braces(&ty.file_path_pattern)
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SchemaError::InvalidPattern {
                name: ty.name.clone(),
                pattern: ty.file_path_pattern.clone(),
                reason: e.msg.to_string(),
            })?;

        tracing::debug!("Registered document type {} ({})", ty.name, ty.file_path_pattern);
        self.types.push(Registered { ty, patterns });
        Ok(&self.types[self.types.len() - 1].ty)
    }

    pub fn get(&self, name: &str) -> Option<&DocumentType> {
        self.types.iter().find(|r| r.ty.name == name).map(|r| &r.ty)
    }

    /// Registered types in registration order
    pub fn types(&self) -> impl Iterator<Item = &DocumentType> {
        self.types.iter().map(|r| &r.ty)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Find the first type whose pattern matches a path relative to the content directory
    pub fn match_path(&self, relative: &Path) -> Option<&DocumentType> {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.types
            .iter()
            .find(|r| {
                r.patterns
                    .iter()
                    .any(|p| p.matches_path_with(relative, options))
            })
            .map(|r| &r.ty)
    }
}

/// Expand `{a,b}` alternatives, which `glob::Pattern` does not support
fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };
    let Some(close) = pattern[open..].find('}').map(|i| open + i) else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    pattern[open + 1..close]
        .split(',')
        .flat_map(|alt| expand_braces(&format!("{}{}{}", prefix, alt, suffix)))
        .collect()
}
