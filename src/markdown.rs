//! Markdown rendering for assistant messages.
//!
//! Wraps comrak: the document is parsed to an AST, code nodes are swapped
//! for pre-styled HTML and raw HTML from the source is demoted to text, so
//! the only markup in the output is what comrak and this module emit. Link
//! and image destinations with script-capable schemes are blanked.

use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
#[allow(deprecated)]
use comrak::{Arena, ComrakOptions, format_html, parse_document};
use once_cell::sync::Lazy;

// CommonMark HTML block kind 6 (block-level tags such as `<div>`)
const HTML_BLOCK_TYPE_DIV: u8 = 6;

const DANGEROUS_SCHEMES: [&str; 4] = ["javascript:", "vbscript:", "file:", "data:"];
const SAFE_DATA_IMAGES: [&str; 4] = [
    "data:image/png",
    "data:image/gif",
    "data:image/jpeg",
    "data:image/webp",
];

#[allow(deprecated)]
static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    #[allow(deprecated)]
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.footnotes = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.extension.autolink = true;
    // Only nodes produced by `restyle` carry raw HTML. This also turns off
    // comrak's URL filter, so `restyle` blanks dangerous destinations itself.
    options.render.unsafe_ = true;
    options
});

/// CSS classes applied to code spans and code blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkdownStyle {
    pub inline_code_class: &'static str,
    pub code_block_class: &'static str,
    pub code_block_accent_class: &'static str,
}

impl Default for MarkdownStyle {
    fn default() -> Self {
        Self {
            inline_code_class: "md-inline-code",
            code_block_class: "md-code-block",
            code_block_accent_class: "md-code-block-accent",
        }
    }
}

pub fn render_markdown(md: &str) -> String {
    render_markdown_with_style(md, &MarkdownStyle::default())
}

pub fn render_markdown_with_style(md: &str, style: &MarkdownStyle) -> String {
    let arena = Arena::new();
    let root = parse_document(&arena, md, &MARKDOWN_OPTIONS);
    restyle(root, style);

    let mut html = Vec::new();
    if let Err(err) = format_html(root, &MARKDOWN_OPTIONS, &mut html) {
        tracing::warn!("markdown render failed: {}", err);
        return escape_html(md);
    }
    String::from_utf8_lossy(&html).into_owned()
}

fn restyle<'a>(root: &'a AstNode<'a>, style: &MarkdownStyle) {
    for node in root.descendants() {
        let mut ast = node.data.borrow_mut();
        let replacement = match &mut ast.value {
            NodeValue::Code(code) => Some(NodeValue::HtmlInline(format!(
                "<code class=\"{}\">{}</code>",
                style.inline_code_class,
                escape_html(&code.literal)
            ))),
            NodeValue::CodeBlock(block) => Some(NodeValue::HtmlBlock(NodeHtmlBlock {
                block_type: HTML_BLOCK_TYPE_DIV,
                literal: code_block_html(&block.info, &block.literal, style),
            })),
            NodeValue::HtmlInline(raw) => Some(NodeValue::Text(raw.clone())),
            NodeValue::HtmlBlock(raw) => Some(NodeValue::Text(raw.literal.clone())),
            NodeValue::Link(link) | NodeValue::Image(link) => {
                if is_dangerous_url(&link.url) {
                    tracing::debug!("dropping unsafe link destination");
                    link.url.clear();
                }
                None
            }
            _ => None,
        };
        if let Some(value) = replacement {
            ast.value = value;
        }
    }
}

fn code_block_html(info: &str, literal: &str, style: &MarkdownStyle) -> String {
    let language = info.split_whitespace().next().unwrap_or_default();
    let code_open = if language.is_empty() {
        "<code>".to_string()
    } else {
        format!("<code class=\"language-{}\">", escape_html(language))
    };
    format!(
        "<div class=\"{}\"><div class=\"{}\"></div><pre>{}{}</code></pre></div>\n",
        style.code_block_class,
        style.code_block_accent_class,
        code_open,
        escape_html(literal)
    )
}

fn is_dangerous_url(url: &str) -> bool {
    // Browsers ignore whitespace and control characters inside a scheme.
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect::<String>()
        .to_ascii_lowercase();
    if SAFE_DATA_IMAGES
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
    {
        return false;
    }
    DANGEROUS_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

fn escape_html(text: &str) -> String {
    let mut escaped = Vec::with_capacity(text.len());
    if comrak::html::escape(&mut escaped, text.as_bytes()).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&escaped).into_owned()
}
