//! Front-matter parsing

use indexmap::IndexMap;
use thiserror::Error;

/// Raw front-matter key/value pairs, in document order
pub type RawFields = IndexMap<String, serde_yaml::Value>;

/// A front-matter block was recognised but could not be read
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrontMatterError {
    #[error("invalid YAML front-matter: {0}")]
    Yaml(String),

    #[error("invalid JSON front-matter: {0}")]
    Json(String),

    #[error("front-matter block opened with `{0}` is never closed")]
    Unterminated(&'static str),
}

/// Front-matter data from a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub fields: RawFields,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        if content.starts_with("---") {
            return Self::parse_yaml(content);
        }

        if let Some(rest) = content.strip_prefix(";;;") {
            return Self::parse_fenced_json(rest);
        }

        // A leading `{` is only front-matter when it opens a JSON object;
        // otherwise it is body text such as an MDX comment
        if let Some((fields, remaining)) = Self::parse_bare_json(content) {
            return Ok((FrontMatter { fields }, remaining));
        }

        Ok((FrontMatter::default(), content))
    }

    fn parse_yaml(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let rest = content[3..].trim_start_matches(['\n', '\r']);

        let Some(end_pos) = rest.find("\n---") else {
            if looks_like_yaml(rest) {
                return Err(FrontMatterError::Unterminated("---"));
            }
            return Ok((FrontMatter::default(), content));
        };

        let yaml_content = &rest[..end_pos];
        let remaining = rest[end_pos + 4..].trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((FrontMatter::default(), remaining));
        }

        // A leading `---` can also be a markdown thematic break
        if !looks_like_yaml(yaml_content) {
            return Ok((FrontMatter::default(), content));
        }

        let fields: RawFields = serde_yaml::from_str(yaml_content)
            .map_err(|e| FrontMatterError::Yaml(e.to_string()))?;

        Ok((FrontMatter { fields }, remaining))
    }

    /// JSON between `;;;` fences
    fn parse_fenced_json(rest: &str) -> Result<(Self, &str), FrontMatterError> {
        let end_pos = rest
            .find(";;;")
            .ok_or(FrontMatterError::Unterminated(";;;"))?;
        let remaining = rest[end_pos + 3..].trim_start_matches(['\n', '\r']);
        let fields = Self::json_fields(&rest[..end_pos])?;
        Ok((FrontMatter { fields }, remaining))
    }

    /// A bare JSON object at the start of the file
    fn parse_bare_json(content: &str) -> Option<(RawFields, &str)> {
        if !content.starts_with('{') {
            return None;
        }

        let mut depth = 0;
        let mut in_string = false;
        let mut escaped = false;
        let mut end_pos = None;
        for (i, c) in content.char_indices() {
            match c {
                _ if escaped => escaped = false,
                '\\' if in_string => escaped = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        end_pos = Some(i + 1);
                        break;
                    }
                }
                _ => {}
            }
        }

        let end_pos = end_pos?;
        let fields = Self::json_fields(&content[..end_pos]).ok()?;
        let remaining = content[end_pos..].trim_start_matches(['\n', '\r']);
        Some((fields, remaining))
    }

    fn json_fields(json: &str) -> Result<RawFields, FrontMatterError> {
        let object: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(json.trim()).map_err(|e| FrontMatterError::Json(e.to_string()))?;

        object
            .into_iter()
            .map(|(k, v)| {
                serde_yaml::to_value(v)
                    .map(|v| (k, v))
                    .map_err(|e| FrontMatterError::Json(e.to_string()))
            })
            .collect()
    }
}

/// Whether a block has at least one `key: value` line.
///
/// Prose and markdown lists between `---` separators do not.
fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp" | "mailto");
        let after_colon = &trimmed[colon_pos + 1..];
        is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2022-02-05
tags:
  - rust
  - mdx
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(
            fm.fields.get("title").and_then(|v| v.as_str()),
            Some("Hello World")
        );
        assert_eq!(
            fm.fields.get("date").and_then(|v| v.as_str()),
            Some("2022-02-05")
        );
        assert_eq!(fm.fields.keys().collect::<Vec<_>>(), ["title", "date", "tags"]);
        assert!(remaining.starts_with("This is the content."));
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = "{\"title\": \"Test {Post}\", \"episode\": 3}\n\nThis is content.\n";

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(
            fm.fields.get("title").and_then(|v| v.as_str()),
            Some("Test {Post}")
        );
        assert_eq!(fm.fields.get("episode").and_then(|v| v.as_i64()), Some(3));
        assert!(remaining.starts_with("This is content."));
    }

    #[test]
    fn test_parse_semicolon_json_frontmatter() {
        let content = ";;;\n\"title\": \"Fenced\"\n;;;\nBody";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, FrontMatterError::Json(_)));

        let content = ";;;\n{\"title\": \"Fenced\"}\n;;;\nBody";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert!(fm.fields.contains_key("title"));
        assert_eq!(remaining, "Body");
    }

    #[test]
    fn test_leading_mdx_comment_is_body() {
        let content = "{/* draft notes */}\n\n# Heading\n";
        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert!(fm.fields.is_empty());
        assert_eq!(remaining, content);

        let (fm, remaining) = FrontMatter::parse("{ unbalanced\nBody").unwrap();
        assert!(fm.fields.is_empty());
        assert_eq!(remaining, "{ unbalanced\nBody");
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, remaining) = FrontMatter::parse("# Just markdown\n").unwrap();
        assert!(fm.fields.is_empty());
        assert_eq!(remaining, "# Just markdown\n");
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let content = "---\ntitle: [unclosed\ndate: 2022-02-05\n---\nBody";
        assert!(matches!(
            FrontMatter::parse(content),
            Err(FrontMatterError::Yaml(_))
        ));
    }

    #[test]
    fn test_unterminated_yaml_is_an_error() {
        let content = "---\ntitle: Missing end\n\nBody";
        assert_eq!(
            FrontMatter::parse(content).unwrap_err(),
            FrontMatterError::Unterminated("---")
        );
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"
---

Some random text with markdown lists:
- Item 1
- Item 2

Check out https://example.com/path

---
More content here.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert!(fm.fields.is_empty());
        assert!(remaining.contains("Some random text"));
    }
}
