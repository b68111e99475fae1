//! Create a new document

use anyhow::{anyhow, bail, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::schema::{DocumentType, FieldType};
use crate::Site;

/// Create a document of a type (default: the home type) with a front-matter skeleton
pub fn create_document(site: &Site, title: &str, doc_type: Option<&str>) -> Result<PathBuf> {
    let registry = site.registry()?;
    let ty = match doc_type {
        Some(name) => registry
            .get(name)
            .ok_or_else(|| anyhow!("Unknown document type: {}", name))?,
        None => site
            .home_type(&registry)
            .ok_or_else(|| anyhow!("No document types are defined"))?,
    };

    let slug = slug::slugify(title);
    if slug.is_empty() {
        bail!("Cannot derive a file name from title {:?}", title);
    }

    let relative = target_dir(ty.file_path_pattern()).join(format!(
        "{}.{}",
        slug,
        extension(ty.file_path_pattern())
    ));
    if registry.match_path(&relative).map(DocumentType::name) != Some(ty.name()) {
        tracing::warn!(
            "{} does not match the {} pattern {}",
            relative.display(),
            ty.name(),
            ty.file_path_pattern()
        );
    }

    let file_path = site.content_dir.join(&relative);
    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&file_path, skeleton(ty, title))?;
    println!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Front-matter listing every declared field
fn skeleton(ty: &DocumentType, title: &str) -> String {
    let now = chrono::Local::now();
    let mut content = String::from("---\n");
    for (name, def) in ty.fields() {
        let value = match (name.as_str(), def.ty) {
            ("title", FieldType::String) => quote(title),
            (_, FieldType::Date) => now.format("%Y-%m-%d").to_string(),
            (_, FieldType::String) => "''".to_string(),
            (_, FieldType::Number) => "0".to_string(),
            (_, FieldType::Boolean) => "false".to_string(),
            (_, FieldType::List) => "[]".to_string(),
        };
        content.push_str(&format!("{}: {}\n", name, value));
    }
    content.push_str("---\n\n");
    content
}

/// Single-quoted YAML scalar
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Leading literal directories of a glob, e.g. `posts/**/*.mdx` -> `posts`
fn target_dir(pattern: &str) -> PathBuf {
    let mut dir = PathBuf::new();
    let mut segments = pattern.split('/').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() || segment.contains(['*', '?', '[', '{']) {
            break;
        }
        dir.push(segment);
    }
    dir
}

/// `mdx` unless the pattern only admits `.md` files
fn extension(pattern: &str) -> &'static str {
    let file = Path::new(pattern)
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or_default();
    if file.contains("mdx") || !file.contains(".md") {
        "mdx"
    } else {
        "md"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DocumentTypeConfig, SiteConfig};
    use crate::schema::FieldDef;
    use tempfile::TempDir;

    #[test]
    fn test_target_dir_and_extension() {
        assert_eq!(target_dir("posts/**/*.{md,mdx}"), PathBuf::from("posts"));
        assert_eq!(target_dir("podcast/episodes/*.md"), PathBuf::from("podcast/episodes"));
        assert_eq!(target_dir("*.mdx"), PathBuf::new());
        assert_eq!(extension("posts/**/*.{md,mdx}"), "mdx");
        assert_eq!(extension("episodes/*.md"), "md");
    }

    #[test]
    fn test_new_post_loads_back() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();

        let path = create_document(&site, "It's a Test", None).unwrap();
        assert_eq!(path, site.content_dir.join("posts/it-s-a-test.mdx"));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("---\ntitle: 'It''s a Test'\ndate: "));
        assert!(content.contains("summary: ''\n"));
        assert!(content.contains("tags: []\n"));

        let registry = site.registry().unwrap();
        let report = site.load(&registry).unwrap();
        assert!(report.is_clean());
        assert_eq!(
            report.collection.get("Post", "it-s-a-test").and_then(|r| r.title()),
            Some("It's a Test")
        );

        assert!(create_document(&site, "It's a Test", None).is_err());
    }

    #[test]
    fn test_new_document_of_configured_type() {
        let dir = TempDir::new().unwrap();
        let mut fields = indexmap::IndexMap::new();
        fields.insert("title".to_string(), FieldDef::required(FieldType::String));
        fields.insert("number".to_string(), FieldDef::required(FieldType::Number));
        let config = SiteConfig {
            document_types: vec![DocumentTypeConfig {
                name: "Episode".into(),
                file_path_pattern: "episodes/*.md".into(),
                route: None,
                fields,
                computed_fields: Vec::new(),
            }],
            ..SiteConfig::default()
        };
        let site = Site::with_config(dir.path().to_path_buf(), config);

        let path = create_document(&site, "Pilot", Some("Episode")).unwrap();
        assert_eq!(path, site.content_dir.join("episodes/pilot.md"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "---\ntitle: 'Pilot'\nnumber: 0\n---\n\n"
        );
        assert!(create_document(&site, "Pilot", Some("Post")).is_err());
    }
}
