//! Built-in computed fields that configuration can refer to by name

use indexmap::IndexMap;
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use std::sync::Arc;

use super::{ComputeFn, Document, FieldValue};
use crate::helpers::{estimate_reading_time, url_path};

/// Names accepted in a document type's `computed_fields` list
pub const BUILTIN_NAMES: &[&str] = &["reading_time", "word_count", "url", "excerpt"];

/// Look up a built-in computed field by name
pub fn builtin(name: &str) -> Option<ComputeFn> {
    match name {
        "reading_time" => Some(reading_time()),
        "word_count" => Some(word_count()),
        "url" => Some(url()),
        "excerpt" => Some(excerpt()),
        _ => None,
    }
}

pub(super) fn reading_time() -> ComputeFn {
    Arc::new(|doc: &Document<'_>| {
        let stats = estimate_reading_time(doc.body);
        let mut map = IndexMap::new();
        map.insert("text".to_string(), FieldValue::String(stats.text()));
        map.insert("minutes".to_string(), FieldValue::Number(stats.minutes));
        map.insert("words".to_string(), FieldValue::from(stats.words));
        Ok(FieldValue::Map(map))
    })
}

pub(super) fn word_count() -> ComputeFn {
    Arc::new(|doc: &Document<'_>| Ok(FieldValue::from(estimate_reading_time(doc.body).words)))
}

pub(super) fn url() -> ComputeFn {
    Arc::new(|doc: &Document<'_>| Ok(FieldValue::String(url_path(doc.route, doc.slug))))
}

/// Plain text of the first paragraph
pub(super) fn excerpt() -> ComputeFn {
    Arc::new(|doc: &Document<'_>| {
        let mut text = String::new();
        let mut in_paragraph = false;

        for event in Parser::new(doc.body) {
            match event {
                Event::Start(Tag::Paragraph) => in_paragraph = true,
                Event::End(TagEnd::Paragraph) if !text.trim().is_empty() => break,
                Event::End(TagEnd::Paragraph) => in_paragraph = false,
                Event::Text(t) | Event::Code(t) if in_paragraph => text.push_str(&t),
                Event::SoftBreak | Event::HardBreak if in_paragraph => text.push(' '),
                _ => {}
            }
        }

        Ok(FieldValue::String(text.trim().to_string()))
    })
}
