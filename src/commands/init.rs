//! Initialize a new site

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

use crate::config::CONFIG_FILES;

const CONFIG_TEMPLATE: &str = r#"# Site
title: Pressroll
subtitle: ''
description: ''
author: John Doe
language: en
timezone: ''

# URL
url: http://example.com
root: /

# Directory
content_dir: content
public_dir: public
static_dir: static

# Writing
external_link:
  enable: true
highlight:
  theme: base16-ocean.dark
  line_number: false

# Date / Time format
date_format: MMMM DD, YYYY

# Listing
per_page: 10
feed_limit: 20

# Content model
document_types:
  - name: Post
    file_path_pattern: "posts/**/*.{md,mdx}"
    fields:
      title: { type: string, required: true }
      date: { type: date, required: true }
      summary: { type: string, required: true }
      image: { type: string, required: true }
      tags: { type: list }
    computed_fields: [reading_time, url]
"#;

const STYLE_TEMPLATE: &str = r#"body { max-width: 42rem; margin: 0 auto; padding: 1rem; font-family: system-ui, sans-serif; line-height: 1.6; }
.site-header nav a { margin-right: 1rem; }
.summary time, .meta { color: #666; font-size: 0.9rem; }
.callout { border-left: 4px solid #888; padding: 0.5rem 1rem; background: #f6f6f6; }
.callout-warning { border-color: #d80; }
figure.audio audio { width: 100%; }
pre { overflow-x: auto; padding: 1rem; }
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    for name in CONFIG_FILES {
        if target_dir.join(name).exists() {
            bail!("{:?} already contains {}", target_dir, name);
        }
    }

    fs::create_dir_all(target_dir.join("content/posts"))?;
    fs::create_dir_all(target_dir.join("static/css"))?;
    fs::create_dir_all(target_dir.join("static/images"))?;

    fs::write(target_dir.join("_config.yml"), CONFIG_TEMPLATE)?;
    fs::write(target_dir.join("static/css/style.css"), STYLE_TEMPLATE)?;

    let today = chrono::Local::now().format("%Y-%m-%d");
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
summary: Welcome to your new site.
image: /images/hello-world.png
tags: [welcome]
---

Welcome! This is your very first post. Posts live in `content/posts` and are
written in MDX: markdown plus a few components.

<Callout type="tip" title="Quick start">

Run `pressroll new "My New Post"` to create a post, `pressroll serve` to
preview the site and `pressroll build` to write it to `public/`.

</Callout>

Episodes of a podcast can embed their audio:

```mdx
<Audio src="/audio/episode-1.mp3" title="Episode 1" />
```
"#,
        today
    );

    fs::write(target_dir.join("content/posts/hello-world.mdx"), sample_post)?;

    Ok(())
}
