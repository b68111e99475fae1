//! List documents in listing order

use anyhow::{anyhow, Result};

use crate::content::ContentCollection;
use crate::resolver::PageResolver;
use crate::schema::SchemaRegistry;
use crate::Site;

/// List the documents of one type (default: the home type), newest first
pub fn run(site: &Site, doc_type: Option<&str>) -> Result<()> {
    let registry = site.registry()?;
    let report = site.load(&registry)?;
    for error in &report.errors {
        tracing::warn!("{}", error);
    }

    for line in listing_lines(site, &registry, &report.collection, doc_type)? {
        println!("{}", line);
    }
    Ok(())
}

pub fn listing_lines(
    site: &Site,
    registry: &SchemaRegistry,
    collection: &ContentCollection,
    doc_type: Option<&str>,
) -> Result<Vec<String>> {
    let ty = match doc_type {
        Some(name) => registry.get(name).ok_or_else(|| {
            let available: Vec<_> = registry.types().map(|t| t.name()).collect();
            anyhow!("Unknown type: {}. Available: {}", name, available.join(", "))
        })?,
        None => site
            .home_type(registry)
            .ok_or_else(|| anyhow!("No document types are defined"))?,
    };

    let listing = PageResolver::new(collection, ty).list_page();
    let mut lines = vec![format!("{} ({}):", ty.name(), listing.len())];
    for item in listing {
        let date = item
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        lines.push(format!("  {} - {} [{}]", date, item.title, item.url));
    }
    Ok(lines)
}
