//! Build the static site

use anyhow::{Context, Result};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::config::CONFIG_FILES;
use crate::generator::{GenerateStats, Generator};
use crate::Site;

/// Load every document and write the site; any document error fails the build
pub fn run(site: &Site) -> Result<GenerateStats> {
    let start = Instant::now();

    let registry = site.registry()?;
    let collection = site
        .load_collection(&registry)
        .context("Content failed to load")?;
    tracing::info!("Loaded {} document(s)", collection.len());

    let stats = Generator::new(site, &registry)?.generate(&collection)?;

    tracing::info!(
        "Generated {} document(s) and {} listing page(s) in {:.2}s",
        stats.documents,
        stats.listing_pages,
        start.elapsed().as_secs_f64()
    );
    Ok(stats)
}

/// Rebuild whenever content, static files or the config change
pub fn watch(site: &Site) -> Result<()> {
    let base_dir = site.base_dir.clone();
    watch_changes(site, || {
        // Re-read the config so edits to it take effect
        match Site::new(&base_dir).and_then(|site| run(&site)) {
            Ok(_) => println!("Rebuilt successfully!"),
            Err(e) => tracing::error!("Build failed: {:#}", e),
        }
    })
}

/// Block until the watcher goes away, calling `on_change` after each burst of changes
pub fn watch_changes<F: FnMut()>(site: &Site, mut on_change: F) -> Result<()> {
    let (tx, rx) = channel();

    // Create debouncer to avoid multiple rapid rebuilds
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in [&site.content_dir, &site.static_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    for name in CONFIG_FILES {
        let config_path = site.base_dir.join(name);
        if config_path.exists() {
            debouncer
                .watcher()
                .watch(&config_path, RecursiveMode::NonRecursive)?;
            tracing::debug!("Watching: {:?}", config_path);
        }
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                // Filter out editor and VCS noise
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }
                on_change();
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_fails_with_every_document_error() {
        let dir = TempDir::new().unwrap();
        let posts = dir.path().join("content/posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("good.mdx"),
            "---\ntitle: Good\ndate: 2022-02-05\nsummary: s\nimage: /i.png\n---\nok\n",
        )
        .unwrap();
        fs::write(posts.join("one.mdx"), "---\ntitle: One\n---\n").unwrap();
        fs::write(posts.join("two.mdx"), "no front-matter\n").unwrap();

        let site = Site::new(dir.path()).unwrap();
        let err = run(&site).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("2 document(s) failed to load"));
        assert!(message.contains("posts/one.mdx"));
        assert!(message.contains("posts/two.mdx"));
        assert!(!site.public_dir.exists());

        fs::remove_file(posts.join("one.mdx")).unwrap();
        fs::remove_file(posts.join("two.mdx")).unwrap();
        let stats = run(&site).unwrap();
        assert_eq!(stats.documents, 1);
        assert!(site.public_dir.join("posts/good/index.html").exists());
    }
}
