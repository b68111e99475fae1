//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Prefix a site-absolute path with the configured root
///
/// # Examples
/// ```ignore
/// url_for("/blog/", "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(root: &str, path: &str) -> String {
    let root = root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for("https://example.com", "/blog/", "/about/") // -> "https://example.com/blog/about/"
/// ```
pub fn full_url_for(base_url: &str, root: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), url_for(root, path))
}

/// Root-relative path of a document page, `/<route>/<slug>/`
pub fn url_path(route: &str, slug: &str) -> String {
    let slug = encode_segment(slug);
    let route = route.trim_matches('/');
    if route.is_empty() {
        format!("/{}/", slug)
    } else {
        format!("/{}/{}/", route, slug)
    }
}

/// Percent-encode a single path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Whether an href points inside the site (`/path` or `#fragment`)
pub fn is_internal_href(href: &str) -> bool {
    (href.starts_with('/') && !href.starts_with("//")) || href.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for() {
        assert_eq!(url_for("/blog/", "/css/style.css"), "/blog/css/style.css");
        assert_eq!(url_for("/blog/", "about/"), "/blog/about/");
        assert_eq!(url_for("/", ""), "/");
    }

    #[test]
    fn test_full_url_for() {
        assert_eq!(
            full_url_for("https://example.com/", "/blog/", "/about/"),
            "https://example.com/blog/about/"
        );
    }

    #[test]
    fn test_url_path_encodes_slug() {
        assert_eq!(url_path("posts", "hello-world"), "/posts/hello-world/");
        assert_eq!(url_path("/posts/", "my post"), "/posts/my%20post/");
        assert_eq!(url_path("", "about"), "/about/");
    }

    #[test]
    fn test_is_internal_href() {
        assert!(is_internal_href("/posts/a/"));
        assert!(is_internal_href("#intro"));
        assert!(!is_internal_href("https://example.com"));
        assert!(!is_internal_href("//cdn.example.com/x.js"));
        assert!(!is_internal_href("mailto:me@example.com"));
    }
}
