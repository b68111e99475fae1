//! Content records and the collection produced by one load pass

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

use super::mdx::CompiledBody;
use crate::schema::FieldValue;

/// One loaded document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentRecord {
    /// Name of the document type that claimed the file
    pub doc_type: String,

    /// File name without extension
    pub slug: String,

    /// Source file path relative to the content directory
    pub source: String,

    /// Full source file path
    #[serde(skip)]
    pub full_source: PathBuf,

    /// Validated declared fields
    pub fields: IndexMap<String, FieldValue>,

    /// Front-matter keys the type does not declare
    pub extra: IndexMap<String, serde_yaml::Value>,

    /// Computed field values, evaluated once at load time
    pub computed: IndexMap<String, FieldValue>,

    /// Raw body text
    pub raw: String,

    /// Compiled body
    pub body: CompiledBody,
}

impl ContentRecord {
    /// Declared or computed field by name; declared fields win
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name).or_else(|| self.computed.get(name))
    }

    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(FieldValue::as_str)
    }

    pub fn summary(&self) -> Option<&str> {
        self.fields.get("summary").and_then(FieldValue::as_str)
    }

    pub fn date(&self) -> Option<&DateTime<FixedOffset>> {
        self.fields.get("date").and_then(FieldValue::as_date)
    }

    pub fn image(&self) -> Option<&str> {
        self.fields.get("image").and_then(FieldValue::as_str)
    }
}

/// All records of one load pass, in load order.
///
/// The collection has no mutating API: once loaded it can be shared freely
/// between threads.
#[derive(Debug, Clone, Default)]
pub struct ContentCollection {
    records: Vec<ContentRecord>,
    /// doc type -> slug -> index into `records`
    index: HashMap<String, IndexMap<String, usize>>,
}

impl ContentCollection {
    /// Build a collection; callers guarantee slugs are unique per type
    pub(crate) fn from_records(records: Vec<ContentRecord>) -> Self {
        let mut index: HashMap<String, IndexMap<String, usize>> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            index
                .entry(record.doc_type.clone())
                .or_default()
                .insert(record.slug.clone(), i);
        }
        Self { records, index }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record in load order
    pub fn iter(&self) -> impl Iterator<Item = &ContentRecord> {
        self.records.iter()
    }

    /// Records of one document type in load order
    pub fn of_type<'a>(&'a self, doc_type: &str) -> impl Iterator<Item = &'a ContentRecord> + 'a {
        self.index
            .get(doc_type)
            .into_iter()
            .flat_map(|slugs| slugs.values())
            .map(|&i| &self.records[i])
    }

    /// Look up a record by type and slug
    pub fn get(&self, doc_type: &str, slug: &str) -> Option<&ContentRecord> {
        self.index
            .get(doc_type)
            .and_then(|slugs| slugs.get(slug))
            .map(|&i| &self.records[i])
    }

    /// Number of records of one type
    pub fn count(&self, doc_type: &str) -> usize {
        self.index.get(doc_type).map_or(0, IndexMap::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(doc_type: &str, slug: &str) -> ContentRecord {
        ContentRecord {
            doc_type: doc_type.to_string(),
            slug: slug.to_string(),
            source: format!("{}/{}.mdx", doc_type.to_lowercase(), slug),
            full_source: PathBuf::new(),
            fields: IndexMap::new(),
            extra: IndexMap::new(),
            computed: IndexMap::new(),
            raw: String::new(),
            body: CompiledBody::default(),
        }
    }

    #[test]
    fn test_lookup_by_type_and_slug() {
        let collection = ContentCollection::from_records(vec![
            record("Post", "a"),
            record("Episode", "a"),
            record("Post", "b"),
        ]);

        assert_eq!(collection.len(), 3);
        assert_eq!(collection.count("Post"), 2);
        assert_eq!(collection.get("Episode", "a").unwrap().doc_type, "Episode");
        assert!(collection.get("Episode", "b").is_none());
        assert!(collection.get("Page", "a").is_none());

        let slugs: Vec<_> = collection.of_type("Post").map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, ["a", "b"]);
        assert_eq!(collection.of_type("Page").count(), 0);
    }

    #[test]
    fn test_declared_fields_shadow_computed() {
        let mut r = record("Post", "a");
        r.fields.insert("url".into(), FieldValue::from("/declared/"));
        r.computed.insert("url".into(), FieldValue::from("/computed/"));
        r.computed.insert("words".into(), FieldValue::from(3usize));

        assert_eq!(r.get("url").and_then(FieldValue::as_str), Some("/declared/"));
        assert_eq!(r.get("words").and_then(FieldValue::as_f64), Some(3.0));
        assert!(r.title().is_none());
    }
}
