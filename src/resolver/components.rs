//! Component substitution for compiled bodies
//!
//! Links, images and capitalised JSX tags are handed to renderers looked up
//! by tag name. Every renderer is a trait object, so a site can swap any of
//! them without touching the resolver.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::content::Props;
use crate::helpers::{attributes, html_escape, image_tag, is_internal_href, link_tag, url_for};

/// Errors raised while rendering a body
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("unknown component <{0}>")]
    UnknownComponent(String),

    #[error("component <{component}> requires the `{prop}` prop")]
    MissingProp { component: String, prop: String },
}

/// Site-level settings renderers may need
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    /// Site root, prefixed to internal paths
    pub root: String,
    /// Open external links in a new tab
    pub external_links: bool,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            root: "/".to_string(),
            external_links: true,
        }
    }
}

impl RenderContext {
    /// Prefix site-absolute paths with the root; everything else is untouched
    pub fn local_url(&self, href: &str) -> String {
        if href.starts_with('/') && !href.starts_with("//") {
            url_for(&self.root, href)
        } else {
            href.to_string()
        }
    }
}

/// A link with its children already rendered
#[derive(Debug, Clone, Copy)]
pub struct LinkProps<'a> {
    pub href: &'a str,
    pub title: &'a str,
    pub children: &'a str,
}

/// An image reference
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageProps<'a> {
    pub src: &'a str,
    pub alt: &'a str,
    pub title: &'a str,
    pub width: Option<&'a str>,
    pub height: Option<&'a str>,
}

/// Renders `a` and `<Link>`
pub trait LinkRenderer: Send + Sync {
    fn render_link(&self, link: &LinkProps<'_>, ctx: &RenderContext) -> Result<String, RenderError>;
}

/// Renders `img` and `<Image>`
pub trait ImageRenderer: Send + Sync {
    fn render_image(&self, image: &ImageProps<'_>, ctx: &RenderContext) -> Result<String, RenderError>;
}

/// Renders any other capitalised component
pub trait TagRenderer: Send + Sync {
    fn render_tag(&self, props: &Props, children: &str, ctx: &RenderContext) -> Result<String, RenderError>;
}

impl<F> TagRenderer for F
where
    F: Fn(&Props, &str, &RenderContext) -> Result<String, RenderError> + Send + Sync,
{
    fn render_tag(&self, props: &Props, children: &str, ctx: &RenderContext) -> Result<String, RenderError> {
        self(props, children, ctx)
    }
}

/// Default link renderer.
///
/// `/path` and `#fragment` are internal; `/path` gets the site root.
/// Anything else opens in a new tab when external links are enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteLink;

impl LinkRenderer for SiteLink {
    fn render_link(&self, link: &LinkProps<'_>, ctx: &RenderContext) -> Result<String, RenderError> {
        if is_internal_href(link.href) {
            let href = ctx.local_url(link.href);
            return Ok(link_tag(&href, link.children, &[("title", link.title)]));
        }

        if ctx.external_links {
            Ok(link_tag(
                link.href,
                link.children,
                &[
                    ("title", link.title),
                    ("target", "_blank"),
                    ("rel", "noopener noreferrer"),
                ],
            ))
        } else {
            Ok(link_tag(link.href, link.children, &[("title", link.title)]))
        }
    }
}

/// Default image renderer: lazy-loaded, root-prefixed local sources
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteImage;

impl ImageRenderer for SiteImage {
    fn render_image(&self, image: &ImageProps<'_>, ctx: &RenderContext) -> Result<String, RenderError> {
        let src = ctx.local_url(image.src);
        Ok(image_tag(
            &src,
            image.alt,
            &[
                ("title", image.title),
                ("width", image.width.unwrap_or_default()),
                ("height", image.height.unwrap_or_default()),
                ("loading", "lazy"),
            ],
        ))
    }
}

fn require<'p>(component: &str, props: &'p Props, prop: &str) -> Result<&'p str, RenderError> {
    props
        .get(prop)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RenderError::MissingProp {
            component: component.to_string(),
            prop: prop.to_string(),
        })
}

/// `<Audio src="/episodes/1.mp3" title="Episode 1" />` for podcast episodes
#[derive(Debug, Clone, Copy, Default)]
pub struct Audio;

impl TagRenderer for Audio {
    fn render_tag(&self, props: &Props, children: &str, ctx: &RenderContext) -> Result<String, RenderError> {
        let src = ctx.local_url(require("Audio", props, "src")?);
        let mime = match src.rsplit('.').next() {
            Some("m4a") => "audio/mp4",
            Some("ogg") => "audio/ogg",
            Some("wav") => "audio/wav",
            _ => "audio/mpeg",
        };

        let mut html = String::from(r#"<figure class="audio">"#);
        html.push_str(&format!(
            r#"<audio controls preload="metadata"><source{}></audio>"#,
            attributes([("src", src.as_str()), ("type", mime)])
        ));

        let caption = props.get("title").map(|t| html_escape(t)).unwrap_or_default();
        if !caption.is_empty() || !children.trim().is_empty() {
            html.push_str(&format!("<figcaption>{}{}</figcaption>", caption, children));
        }
        html.push_str("</figure>");
        Ok(html)
    }
}

/// `<Callout type="warning" title="Heads up">...</Callout>`
#[derive(Debug, Clone, Copy, Default)]
pub struct Callout;

impl TagRenderer for Callout {
    fn render_tag(&self, props: &Props, children: &str, _ctx: &RenderContext) -> Result<String, RenderError> {
        let kind = props.get("type").map(String::as_str).unwrap_or("note");
        let class = format!("callout callout-{}", kind);

        let mut html = format!("<aside{}>", attributes([("class", class.as_str())]));
        if let Some(title) = props.get("title") {
            html.push_str(&format!(
                r#"<p class="callout-title">{}</p>"#,
                html_escape(title)
            ));
        }
        html.push_str(children);
        html.push_str("</aside>");
        Ok(html)
    }
}

/// Renderers used to substitute components while rendering a body
pub struct Components {
    link: Box<dyn LinkRenderer>,
    image: Box<dyn ImageRenderer>,
    tags: HashMap<String, Box<dyn TagRenderer>>,
}

impl Components {
    /// Default link and image renderers plus the built-in `Audio` and `Callout`
    pub fn new() -> Self {
        Self::bare().with_tag("Audio", Audio).with_tag("Callout", Callout)
    }

    /// Default link and image renderers with no tag renderers
    pub fn bare() -> Self {
        Self {
            link: Box::new(SiteLink),
            image: Box::new(SiteImage),
            tags: HashMap::new(),
        }
    }

    pub fn with_link(mut self, renderer: impl LinkRenderer + 'static) -> Self {
        self.link = Box::new(renderer);
        self
    }

    pub fn with_image(mut self, renderer: impl ImageRenderer + 'static) -> Self {
        self.image = Box::new(renderer);
        self
    }

    /// Register a renderer under a tag name, replacing any previous one
    pub fn with_tag(mut self, name: impl Into<String>, renderer: impl TagRenderer + 'static) -> Self {
        self.tags.insert(name.into(), Box::new(renderer));
        self
    }

    pub fn has_tag(&self, name: &str) -> bool {
        matches!(name, "Link" | "Image") || self.tags.contains_key(name)
    }

    pub(crate) fn link(&self, link: &LinkProps<'_>, ctx: &RenderContext) -> Result<String, RenderError> {
        self.link.render_link(link, ctx)
    }

    pub(crate) fn image(&self, image: &ImageProps<'_>, ctx: &RenderContext) -> Result<String, RenderError> {
        self.image.render_image(image, ctx)
    }

    /// Dispatch a JSX component by name
    pub(crate) fn component(
        &self,
        name: &str,
        props: &Props,
        children: &str,
        ctx: &RenderContext,
    ) -> Result<String, RenderError> {
        let prop = |key: &str| props.get(key).map(String::as_str);
        match name {
            "Link" => self.link(
                &LinkProps {
                    href: require(name, props, "href")?,
                    title: prop("title").unwrap_or_default(),
                    children,
                },
                ctx,
            ),
            "Image" => self.image(
                &ImageProps {
                    src: require(name, props, "src")?,
                    alt: prop("alt").unwrap_or_default(),
                    title: prop("title").unwrap_or_default(),
                    width: prop("width"),
                    height: prop("height"),
                },
                ctx,
            ),
            _ => self
                .tags
                .get(name)
                .ok_or_else(|| RenderError::UnknownComponent(name.to_string()))?
                .render_tag(props, children, ctx),
        }
    }
}

impl Default for Components {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.tags.keys().collect();
        tags.sort();
        f.debug_struct("Components").field("tags", &tags).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Props {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_internal_link_gets_root() {
        let ctx = RenderContext {
            root: "/blog/".into(),
            external_links: true,
        };
        let html = SiteLink
            .render_link(
                &LinkProps {
                    href: "/posts/a/",
                    title: "",
                    children: "A",
                },
                &ctx,
            )
            .unwrap();
        assert_eq!(html, r#"<a href="/blog/posts/a/">A</a>"#);

        let html = SiteLink
            .render_link(
                &LinkProps {
                    href: "#notes",
                    title: "",
                    children: "notes",
                },
                &ctx,
            )
            .unwrap();
        assert_eq!(html, r##"<a href="#notes">notes</a>"##);
    }

    #[test]
    fn test_external_link_opens_new_tab() {
        let html = SiteLink
            .render_link(
                &LinkProps {
                    href: "https://example.com",
                    title: "Example",
                    children: "ex",
                },
                &RenderContext::default(),
            )
            .unwrap();
        assert_eq!(
            html,
            r#"<a href="https://example.com" title="Example" target="_blank" rel="noopener noreferrer">ex</a>"#
        );

        let ctx = RenderContext {
            external_links: false,
            ..RenderContext::default()
        };
        let link = LinkProps {
            href: "//cdn.example.com/x",
            title: "",
            children: "x",
        };
        assert_eq!(
            SiteLink.render_link(&link, &ctx).unwrap(),
            r#"<a href="//cdn.example.com/x">x</a>"#
        );
    }

    #[test]
    fn test_image_is_lazy() {
        let html = SiteImage
            .render_image(
                &ImageProps {
                    src: "/images/a.png",
                    alt: "A",
                    width: Some("600"),
                    ..ImageProps::default()
                },
                &RenderContext::default(),
            )
            .unwrap();
        assert_eq!(
            html,
            r#"<img src="/images/a.png" alt="A" width="600" loading="lazy">"#
        );
    }

    #[test]
    fn test_audio_requires_src() {
        let components = Components::new();
        let ctx = RenderContext::default();

        let html = components
            .component("Audio", &props(&[("src", "/ep1.mp3"), ("title", "Episode 1")]), "", &ctx)
            .unwrap();
        assert!(html.contains(r#"<source src="/ep1.mp3" type="audio/mpeg">"#));
        assert!(html.contains("<figcaption>Episode 1</figcaption>"));

        let err = components.component("Audio", &Props::new(), "", &ctx).unwrap_err();
        assert_eq!(
            err,
            RenderError::MissingProp {
                component: "Audio".into(),
                prop: "src".into()
            }
        );
    }

    #[test]
    fn test_callout_wraps_children() {
        let html = Components::new()
            .component(
                "Callout",
                &props(&[("type", "warning")]),
                "<p>careful</p>",
                &RenderContext::default(),
            )
            .unwrap();
        assert_eq!(
            html,
            r#"<aside class="callout callout-warning"><p>careful</p></aside>"#
        );
    }

    #[test]
    fn test_unknown_component() {
        let err = Components::bare()
            .component("Callout", &Props::new(), "", &RenderContext::default())
            .unwrap_err();
        assert_eq!(err, RenderError::UnknownComponent("Callout".into()));
    }

    #[test]
    fn test_closure_and_custom_renderers() {
        struct Plain;
        impl LinkRenderer for Plain {
            fn render_link(&self, link: &LinkProps<'_>, _: &RenderContext) -> Result<String, RenderError> {
                Ok(format!("[{}]({})", link.children, link.href))
            }
        }

        let components = Components::bare()
            .with_link(Plain)
            .with_tag(
                "Shout",
                |_: &Props, children: &str, _: &RenderContext| -> Result<String, RenderError> {
                    Ok(children.to_uppercase())
                },
            );
        let ctx = RenderContext::default();

        assert!(components.has_tag("Shout"));
        assert_eq!(
            components.component("Shout", &Props::new(), "hey", &ctx).unwrap(),
            "HEY"
        );
        assert_eq!(
            components
                .component("Link", &props(&[("href", "/a/")]), "a", &ctx)
                .unwrap(),
            "[a](/a/)"
        );
    }
}
