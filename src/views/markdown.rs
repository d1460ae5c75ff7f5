use crate::markdown::render_markdown;
use dioxus::prelude::*;

/// Assistant message body rendered from markdown.
#[component]
pub fn MarkdownMessage(content: String) -> Element {
    let content_html = render_markdown(&content);
    rsx! {
        div { class: "prose-chat", dangerous_inner_html: "{content_html}" }
    }
}
