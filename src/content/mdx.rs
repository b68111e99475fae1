//! MDX body compilation
//!
//! Markdown is rendered to HTML with pulldown-cmark, except for the pieces a
//! page may want to substitute at render time: links, images and capitalised
//! JSX components. Those become dedicated [`Node`]s so the resolver can hand
//! them to whatever renderers the caller supplies.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use serde::Serialize;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use thiserror::Error;

use crate::helpers::html_escape;

lazy_static! {
    static ref JSX_TAG: Regex = Regex::new(
        r#"<(/?)([A-Z][A-Za-z0-9_.]*)((?:\s+(?:[^<>"'{}]|"[^"]*"|'[^']*'|\{[^{}]*\})*?)?)\s*(/?)>"#
    )
    .expect("valid JSX tag regex");
    static ref JSX_ATTR: Regex = Regex::new(
        r#"([A-Za-z_][\w\-:]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|\{([^{}]*)\}))?"#
    )
    .expect("valid JSX attribute regex");
}

/// Component props, in source order
pub type Props = IndexMap<String, String>;

/// A node of a compiled body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Already-rendered HTML
    Html { html: String },
    /// A markdown link
    Link {
        href: String,
        title: String,
        children: Vec<Node>,
    },
    /// A markdown image
    Image {
        src: String,
        alt: String,
        title: String,
    },
    /// A JSX component such as `<Audio src="/ep1.mp3" />`
    Component {
        name: String,
        props: Props,
        children: Vec<Node>,
    },
}

/// The compiled representation of a document body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompiledBody {
    pub nodes: Vec<Node>,
}

impl CompiledBody {
    /// Names of every component used in the body
    pub fn component_names(&self) -> Vec<&str> {
        fn walk<'a>(nodes: &'a [Node], out: &mut Vec<&'a str>) {
            for node in nodes {
                match node {
                    Node::Component { name, children, .. } => {
                        if !out.contains(&name.as_str()) {
                            out.push(name);
                        }
                        walk(children, out);
                    }
                    Node::Link { children, .. } => walk(children, out),
                    _ => {}
                }
            }
        }

        let mut names = Vec::new();
        walk(&self.nodes, &mut names);
        names
    }
}

/// Errors raised while compiling a body
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("component <{0}> is never closed")]
    UnclosedComponent(String),

    #[error("component <{0}> cannot be used inside a table")]
    ComponentInTable(String),

    #[error("unexpected closing tag </{found}> (open component: {})", .expected.as_deref().unwrap_or("none"))]
    UnexpectedClosingTag {
        found: String,
        expected: Option<String>,
    },
}

enum FrameKind {
    Root,
    Link { href: String, title: String },
    Component { name: String, props: Props },
}

struct Frame<'a> {
    kind: FrameKind,
    nodes: Vec<Node>,
    pending: Vec<Event<'a>>,
}

impl<'a> Frame<'a> {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Render buffered markdown events into an HTML node
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let mut out = String::new();
        html::push_html(&mut out, self.pending.drain(..));
        if !out.is_empty() {
            self.nodes.push(Node::Html { html: out });
        }
    }

    fn into_node(mut self) -> Option<Node> {
        self.flush();
        match self.kind {
            FrameKind::Root => None,
            FrameKind::Link { href, title } => Some(Node::Link {
                href,
                title,
                children: self.nodes,
            }),
            FrameKind::Component { name, props } => Some(Node::Component {
                name,
                props,
                children: self.nodes,
            }),
        }
    }
}

/// MDX compiler with syntax highlighting for fenced code
pub struct MdxCompiler {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MdxCompiler {
    /// Create a new compiler
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom highlight settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Compile an MDX body
    pub fn compile(&self, source: &str) -> Result<CompiledBody, CompileError> {
        let markdown = preprocess(source);
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(&markdown, options);

        let mut stack = vec![Frame::new(FrameKind::Root)];
        // Whether each open markdown link got its own frame
        let mut link_frames: Vec<bool> = Vec::new();
        let mut table_depth = 0usize;
        let mut image: Option<(String, String, String)> = None;
        let mut code: Option<(Option<String>, String)> = None;
        // Footnote numbers are shared by every HTML chunk of the body
        let mut footnotes: IndexMap<String, usize> = IndexMap::new();

        for event in parser {
            if let Some((_, buf)) = code.as_mut() {
                match event {
                    Event::Text(text) => buf.push_str(&text),
                    Event::End(TagEnd::CodeBlock) => {
                        if let Some((lang, buf)) = code.take() {
                            let highlighted = self.highlight_code(&buf, lang.as_deref());
                            top(&mut stack)
                                .pending
                                .push(Event::Html(CowStr::from(highlighted)));
                        }
                    }
                    _ => {}
                }
                continue;
            }

            if let Some((_, alt, _)) = image.as_mut() {
                match event {
                    Event::Text(text) | Event::Code(text) => alt.push_str(&text),
                    Event::End(TagEnd::Image) => {
                        if let Some((src, alt, title)) = image.take() {
                            let frame = top(&mut stack);
                            frame.flush();
                            frame.nodes.push(Node::Image { src, alt, title });
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) => {
                            let lang = lang.split_whitespace().next().unwrap_or("").to_string();
                            (!lang.is_empty()).then_some(lang)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code = Some((lang, String::new()));
                }
                Event::Start(Tag::Table(_)) => {
                    table_depth += 1;
                    top(&mut stack).pending.push(event);
                }
                Event::End(TagEnd::Table) => {
                    table_depth = table_depth.saturating_sub(1);
                    top(&mut stack).pending.push(event);
                }
                // Inside tables everything stays plain HTML so cells keep their writer state
                Event::Start(Tag::Link {
                    dest_url, title, ..
                }) if table_depth == 0 => {
                    top(&mut stack).flush();
                    stack.push(Frame::new(FrameKind::Link {
                        href: dest_url.to_string(),
                        title: title.to_string(),
                    }));
                    link_frames.push(true);
                }
                Event::Start(Tag::Link { .. }) => {
                    link_frames.push(false);
                    top(&mut stack).pending.push(event);
                }
                Event::End(TagEnd::Link) => {
                    if link_frames.pop().unwrap_or(false) {
                        close_frame(&mut stack)?;
                    } else {
                        top(&mut stack).pending.push(event);
                    }
                }
                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) if table_depth == 0 => {
                    image = Some((dest_url.to_string(), String::new(), title.to_string()));
                }
                Event::FootnoteReference(label) => {
                    let number = footnote_number(&mut footnotes, &label);
                    top(&mut stack).pending.push(Event::InlineHtml(CowStr::from(format!(
                        r##"<sup class="footnote-reference"><a href="#{}">{}</a></sup>"##,
                        html_escape(&label),
                        number
                    ))));
                }
                Event::Start(Tag::FootnoteDefinition(label)) => {
                    let number = footnote_number(&mut footnotes, &label);
                    top(&mut stack).pending.push(Event::Html(CowStr::from(format!(
                        r#"<div class="footnote-definition" id="{}"><sup class="footnote-definition-label">{}</sup>"#,
                        html_escape(&label),
                        number
                    ))));
                }
                Event::End(TagEnd::FootnoteDefinition) => {
                    top(&mut stack)
                        .pending
                        .push(Event::Html(CowStr::from("</div>\n")));
                }
                Event::Html(text) => self.push_html(&mut stack, &text, false, table_depth > 0)?,
                Event::InlineHtml(text) => self.push_html(&mut stack, &text, true, table_depth > 0)?,
                _ => top(&mut stack).pending.push(event),
            }
        }

        if stack.len() > 1 {
            let name = stack
                .iter()
                .rev()
                .find_map(|f| match &f.kind {
                    FrameKind::Component { name, .. } => Some(name.clone()),
                    _ => None,
                })
                .unwrap_or_else(|| "a".to_string());
            return Err(CompileError::UnclosedComponent(name));
        }

        let mut root = stack.pop().unwrap_or_else(|| Frame::new(FrameKind::Root));
        root.flush();
        Ok(CompiledBody { nodes: root.nodes })
    }

    /// Split raw HTML into plain HTML and component tags
    fn push_html<'a>(
        &self,
        stack: &mut Vec<Frame<'a>>,
        text: &str,
        inline: bool,
        in_table: bool,
    ) -> Result<(), CompileError> {
        let raw = |s: &str| -> Event<'a> {
            let s = CowStr::from(s.to_string());
            if inline {
                Event::InlineHtml(s)
            } else {
                Event::Html(s)
            }
        };

        let mut last = 0;
        for caps in JSX_TAG.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > last {
                top(stack).pending.push(raw(&text[last..whole.start()]));
            }
            last = whole.end();

            let closing = !caps[1].is_empty();
            let name = caps[2].to_string();
            let self_closing = !caps[4].is_empty();

            // Splitting a table would leave its cells without their row context
            if in_table {
                return Err(CompileError::ComponentInTable(name));
            }

            if closing {
                let expected = match &top(stack).kind {
                    FrameKind::Component { name, .. } => Some(name.clone()),
                    _ => None,
                };
                if expected.as_deref() != Some(name.as_str()) {
                    return Err(CompileError::UnexpectedClosingTag {
                        found: name,
                        expected,
                    });
                }
                close_frame(stack)?;
                continue;
            }

            let props = parse_props(caps.get(3).map(|m| m.as_str()).unwrap_or(""));
            top(stack).flush();
            if self_closing {
                top(stack).nodes.push(Node::Component {
                    name,
                    props,
                    children: Vec::new(),
                });
            } else {
                stack.push(Frame::new(FrameKind::Component { name, props }));
            }
        }

        let rest = &text[last..];
        if !rest.trim().is_empty() || (last == 0 && !rest.is_empty()) {
            top(stack).pending.push(raw(rest));
        }
        Ok(())
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted =
            theme.and_then(|t| highlighted_html_for_string(code, &self.syntax_set, syntax, t).ok());

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                lang, highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang,
                html_escape(code)
            ),
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();
        let gutter = (1..=lines.len())
            .map(|i| format!(r#"<span class="line-number">{}</span>"#, i))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            lang,
            gutter,
            lines.join("\n")
        )
    }
}

impl Default for MdxCompiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of a footnote label, assigned on first sight
fn footnote_number(numbers: &mut IndexMap<String, usize>, label: &str) -> usize {
    let next = numbers.len() + 1;
    *numbers.entry(label.to_string()).or_insert(next)
}

fn top<'s, 'a>(stack: &'s mut [Frame<'a>]) -> &'s mut Frame<'a> {
    let last = stack.len() - 1;
    &mut stack[last]
}

/// Pop the innermost frame and attach it to its parent
fn close_frame(stack: &mut Vec<Frame<'_>>) -> Result<(), CompileError> {
    if stack.len() < 2 {
        return Err(CompileError::UnexpectedClosingTag {
            found: "?".to_string(),
            expected: None,
        });
    }
    if let Some(node) = stack.pop().and_then(Frame::into_node) {
        let parent = top(stack);
        parent.flush();
        parent.nodes.push(node);
    }
    Ok(())
}

/// Parse JSX attributes into props; expressions keep their literal text
fn parse_props(attrs: &str) -> Props {
    JSX_ATTR
        .captures_iter(attrs)
        .map(|caps| {
            let name = caps[1].to_string();
            let value = if let Some(v) = caps.get(2) {
                v.as_str().replace("&quot;", "\"").replace("&amp;", "&")
            } else if let Some(v) = caps.get(3) {
                v.as_str().to_string()
            } else if let Some(expr) = caps.get(4) {
                expr.as_str()
                    .trim()
                    .trim_matches(|c| c == '"' || c == '\'' || c == '`')
                    .to_string()
            } else {
                "true".to_string()
            };
            (name, value)
        })
        .collect()
}

/// Prepare MDX source for the markdown parser.
///
/// ESM blocks (`import`/`export` at the start of a block, up to the next
/// blank line) are dropped and every component tag is rewritten onto one
/// line with double-quoted attributes, so that multi-line tags and
/// `{expression}` props still parse as raw HTML. Fenced code and inline
/// code spans are left untouched.
fn preprocess(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chunk = String::new();
    let mut fence: Option<&str> = None;
    let mut block_start = true;
    let mut in_esm = false;

    for line in source.lines() {
        let trimmed = line.trim_start();
        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
                block_start = true;
            }
            out.push_str(line);
            out.push('\n');
            continue;
        }

        if in_esm {
            if trimmed.is_empty() {
                in_esm = false;
                block_start = true;
            }
            continue;
        }

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            fence = Some(&trimmed[..3]);
            out.push_str(&normalize_tags(&chunk));
            chunk.clear();
            out.push_str(line);
            out.push('\n');
        } else if block_start && (line.starts_with("import ") || line.starts_with("export ")) {
            in_esm = true;
        } else {
            chunk.push_str(line);
            chunk.push('\n');
            block_start = trimmed.is_empty();
        }
    }

    out.push_str(&normalize_tags(&chunk));
    out
}

/// Rewrite component tags everywhere except inside inline code spans
fn normalize_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('`') {
        let run = rest[open..].bytes().take_while(|&b| b == b'`').count();
        let after = &rest[open + run..];
        match closing_backticks(after, run) {
            Some(close) => {
                let end = open + run + close + run;
                out.push_str(&rewrite_tags(&rest[..open]));
                out.push_str(&rest[open..end]);
                rest = &rest[end..];
            }
            None => {
                out.push_str(&rewrite_tags(&rest[..open + run]));
                rest = after;
            }
        }
    }

    out.push_str(&rewrite_tags(rest));
    out
}

/// Offset of the next backtick run of exactly `len` backticks
fn closing_backticks(text: &str, len: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        if i - start == len {
            return Some(start);
        }
    }
    None
}

fn rewrite_tags(text: &str) -> String {
    JSX_TAG
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let name = &caps[2];
            if !caps[1].is_empty() {
                return format!("</{}>", name);
            }
            let attrs: String = parse_props(caps.get(3).map(|m| m.as_str()).unwrap_or(""))
                .iter()
                .map(|(k, v)| format!(r#" {}="{}""#, k, v.replace('&', "&amp;").replace('"', "&quot;")))
                .collect();
            let close = if caps[4].is_empty() { "" } else { " /" };
            format!("<{}{}{}>", name, attrs, close)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(src: &str) -> CompiledBody {
        MdxCompiler::new().compile(src).unwrap()
    }

    fn html_of(body: &CompiledBody) -> String {
        body.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Html { html } => Some(html.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_plain_markdown_is_one_html_node() {
        let body = compile("# Hello World\n\nThis is a test.");
        assert_eq!(body.nodes.len(), 1);
        let html = html_of(&body);
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_links_become_nodes() {
        let body = compile("See [the docs](/docs/ \"Docs\") and [GitHub](https://github.com).");
        let links: Vec<_> = body
            .nodes
            .iter()
            .filter_map(|n| match n {
                Node::Link { href, title, children } => Some((href, title, children.len())),
                _ => None,
            })
            .collect();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].0, "/docs/");
        assert_eq!(links[0].1, "Docs");
        assert_eq!(links[1].0, "https://github.com");
        assert!(html_of(&body).starts_with("<p>See "));
    }

    #[test]
    fn test_images_collect_alt_text() {
        let body = compile("![A *cover* image](/images/cover.png)");
        assert!(body.nodes.contains(&Node::Image {
            src: "/images/cover.png".into(),
            alt: "A cover image".into(),
            title: String::new(),
        }));
    }

    #[test]
    fn test_self_closing_component() {
        let body = compile("Intro\n\n<Audio src=\"/ep1.mp3\" title={'Episode 1'} controls />\n\nOutro");
        let component = body
            .nodes
            .iter()
            .find_map(|n| match n {
                Node::Component { name, props, children } => Some((name, props, children)),
                _ => None,
            })
            .unwrap();
        assert_eq!(component.0, "Audio");
        assert_eq!(component.1.get("src").map(String::as_str), Some("/ep1.mp3"));
        assert_eq!(component.1.get("title").map(String::as_str), Some("Episode 1"));
        assert_eq!(component.1.get("controls").map(String::as_str), Some("true"));
        assert!(component.2.is_empty());
        assert_eq!(body.component_names(), vec!["Audio"]);
    }

    #[test]
    fn test_block_component_wraps_markdown() {
        let body = compile("<Callout type=\"warning\">\n\nSome **bold** advice.\n\n</Callout>\n");
        let Some(Node::Component { name, children, .. }) = body
            .nodes
            .iter()
            .find(|n| matches!(n, Node::Component { .. }))
        else {
            panic!("expected a component");
        };
        assert_eq!(name, "Callout");
        let inner = html_of(&CompiledBody {
            nodes: children.clone(),
        });
        assert!(inner.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_inline_component() {
        let body = compile("Read <Link href=\"/about/\">about us</Link> today.");
        assert!(body.nodes.iter().any(|n| matches!(
            n,
            Node::Component { name, children, .. } if name == "Link" && !children.is_empty()
        )));
    }

    #[test]
    fn test_unclosed_component_is_an_error() {
        let err = MdxCompiler::new()
            .compile("<Callout>\n\nNever closed.\n")
            .unwrap_err();
        assert_eq!(err, CompileError::UnclosedComponent("Callout".into()));
    }

    #[test]
    fn test_mismatched_closing_tag_is_an_error() {
        let err = MdxCompiler::new()
            .compile("<Callout>\n\nText\n\n</Aside>\n")
            .unwrap_err();
        assert!(matches!(err, CompileError::UnexpectedClosingTag { .. }));
    }

    #[test]
    fn test_lowercase_html_passes_through() {
        let body = compile("<div class=\"note\">\n\nhi\n\n</div>\n");
        assert!(body.component_names().is_empty());
        assert!(html_of(&body).contains("<div class=\"note\">"));
    }

    #[test]
    fn test_preprocess_strips_esm_outside_code() {
        let src = "import Chart from './chart'\nexport const meta = {}\n\n```js\nimport x from 'y'\n```\n";
        let out = preprocess(src);
        assert!(!out.contains("./chart"));
        assert!(!out.contains("export const"));
        assert!(out.contains("import x from 'y'"));
    }

    #[test]
    fn test_preprocess_joins_multiline_tags() {
        let src = "<Image\n  src=\"/a.png\"\n  width={600}\n/>\n";
        assert_eq!(preprocess(src), "<Image src=\"/a.png\" width=\"600\" />\n");

        let body = compile(src);
        assert_eq!(body.component_names(), vec!["Image"]);
    }

    #[test]
    fn test_code_block_is_highlighted() {
        let body = compile("```rust\nfn main() {}\n```");
        assert!(html_of(&body).contains("highlight rust"));
    }

    #[test]
    fn test_links_inside_tables_stay_html() {
        let body = compile("| a | b |\n|---|---|\n| [x](/x/) | y |\n");
        assert!(!body.nodes.iter().any(|n| matches!(n, Node::Link { .. })));
        assert!(html_of(&body).contains("<td><a href=\"/x/\">x</a></td>"));
    }

    #[test]
    fn test_footnotes_number_across_links() {
        let body = compile("One[^a] see [x](/x) two[^b].\n\n[^a]: First.\n[^b]: Second.\n");
        let html = html_of(&body);
        assert!(html.contains(r##"<a href="#a">1</a>"##));
        assert!(html.contains(r##"<a href="#b">2</a>"##));
        assert!(html.contains(r#"id="b"><sup class="footnote-definition-label">2</sup>"#));
        assert!(body.nodes.iter().any(|n| matches!(n, Node::Link { .. })));
    }

    #[test]
    fn test_component_inside_table_is_an_error() {
        let err = MdxCompiler::new()
            .compile("| a | b |\n|---|---|\n| <Audio src=\"/x.mp3\" /> | after |\n")
            .unwrap_err();
        assert_eq!(err, CompileError::ComponentInTable("Audio".into()));

        let body = compile("| a | b |\n|---|---|\n| <br> | after |\n");
        assert!(html_of(&body).contains("<td>after</td>"));
    }

    #[test]
    fn test_import_inside_paragraph_is_prose() {
        let html = html_of(&compile("To use it you must\nimport the module first."));
        assert!(html.contains("import the module first."));

        let src = "import Chart from './chart'\nexport const meta = {\n  draft: true,\n}\n\nHello\n";
        assert_eq!(html_of(&compile(src)), "<p>Hello</p>\n");
    }

    #[test]
    fn test_inline_code_keeps_component_source() {
        let body = compile("Use `<Image width={600} />` here.\n");
        assert!(body.component_names().is_empty());
        assert!(html_of(&body).contains("<code>&lt;Image width={600} /&gt;</code>"));

        assert_eq!(
            normalize_tags("``a ` <X a={1} />`` then <Y b={2} />"),
            "``a ` <X a={1} />`` then <Y b=\"2\" />"
        );
    }
}
