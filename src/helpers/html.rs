//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape XML special characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Strip HTML tags from a string; each tag becomes a space so words stay apart
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                result.push(' ');
            }
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// Truncate a string to a specified length
pub fn truncate(s: &str, length: usize, omission: Option<&str>) -> String {
    let omission = omission.unwrap_or("...");

    if s.chars().count() <= length {
        s.to_string()
    } else {
        let truncated: String = s
            .chars()
            .take(length.saturating_sub(omission.chars().count()))
            .collect();
        format!("{}{}", truncated.trim_end(), omission)
    }
}

/// Render `name="value"` pairs, skipping empty values
pub fn attributes<'a, I>(attrs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    attrs
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!(r#" {}="{}""#, k, html_escape(v)))
        .collect()
}

/// Generate an anchor tag around already-rendered inner HTML
///
/// # Examples
/// ```ignore
/// link_tag("/about/", "About", &[]) // -> <a href="/about/">About</a>
/// ```
pub fn link_tag(href: &str, inner_html: &str, extra: &[(&str, &str)]) -> String {
    let attrs = attributes(std::iter::once(("href", href)).chain(extra.iter().copied()));
    format!("<a{}>{}</a>", attrs, inner_html)
}

/// Generate an image tag
pub fn image_tag(src: &str, alt: &str, extra: &[(&str, &str)]) -> String {
    let mut attrs = attributes([("src", src)]);
    // alt is kept even when empty: decorative images need alt=""
    attrs.push_str(&format!(r#" alt="{}""#, html_escape(alt)));
    attrs.push_str(&attributes(extra.iter().copied()));
    format!("<img{}>", attrs)
}

/// Generate meta generator tag
pub fn meta_generator() -> String {
    format!(
        r#"<meta name="generator" content="pressroll {}">"#,
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>Hello <b>World</b></p>").split_whitespace().collect::<Vec<_>>(),
            vec!["Hello", "World"]
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello World", 8, None), "Hello...");
        assert_eq!(truncate("Hi", 10, None), "Hi");
    }

    #[test]
    fn test_link_tag_escapes_attributes() {
        assert_eq!(
            link_tag("/a?x=\"1\"", "A", &[("target", ""), ("rel", "noopener")]),
            r#"<a href="/a?x=&quot;1&quot;" rel="noopener">A</a>"#
        );
    }

    #[test]
    fn test_image_tag_keeps_empty_alt() {
        assert_eq!(
            image_tag("/a.png", "", &[("loading", "lazy")]),
            r#"<img src="/a.png" alt="" loading="lazy">"#
        );
    }
}
