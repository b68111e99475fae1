//! Print every static path

use anyhow::Result;

use crate::content::ContentCollection;
use crate::resolver::PageResolver;
use crate::schema::SchemaRegistry;
use crate::Site;

/// Print every detail route of every document type
pub fn run(site: &Site) -> Result<()> {
    let registry = site.registry()?;
    let collection = site.load_collection(&registry)?;

    for line in route_lines(&registry, &collection) {
        println!("{}", line);
    }
    Ok(())
}

pub fn route_lines(registry: &SchemaRegistry, collection: &ContentCollection) -> Vec<String> {
    let mut lines = Vec::new();
    for ty in registry.types() {
        let routes = PageResolver::new(collection, ty).routes();
        lines.push(format!("{} ({}):", ty.name(), routes.len()));
        lines.extend(
            routes
                .iter()
                .map(|route| format!("  {} -> {}", route.path, route.record.source)),
        );
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{post_type, DocumentType};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_route_lines() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("posts")).unwrap();
        fs::create_dir_all(dir.path().join("episodes")).unwrap();
        fs::write(
            dir.path().join("posts/hello.mdx"),
            "---\ntitle: Hello\ndate: 2022-02-05\nsummary: s\nimage: /i.png\n---\n",
        )
        .unwrap();
        fs::write(dir.path().join("episodes/ep-1.md"), "Episode one\n").unwrap();

        let mut registry = SchemaRegistry::new();
        registry.define_document_type(post_type()).unwrap();
        registry
            .define_document_type(DocumentType::new("Episode", "episodes/*.md").with_route("podcast"))
            .unwrap();
        let collection = crate::content::load_all(dir.path(), &registry)
            .unwrap()
            .into_collection()
            .unwrap();

        assert_eq!(
            route_lines(&registry, &collection),
            [
                "Post (1):",
                "  /posts/hello/ -> posts/hello.mdx",
                "Episode (1):",
                "  /podcast/ep-1/ -> episodes/ep-1.md"
            ]
        );
    }
}
