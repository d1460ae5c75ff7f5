use crate::api::{ChatBackend, TwinApi};
use crate::config::TwinConfig;
use crate::conversation::{
    Conversation, PendingSend, SUGGESTIONS, format_message_time, refocus_pause, warm_up,
};
use crate::types::{Message, Role};
use crate::views::MarkdownMessage;
use dioxus::events::Key;
use dioxus::prelude::*;

const INPUT_ID: &str = "twin-input";
const MESSAGES_END_ID: &str = "twin-messages-end";
const WARMING_UP_TITLE: &str = "Please wait few seconds, chat warming up";

/// Spawn the network half of a send that passed the gate.
fn dispatch(api: TwinApi, mut conversation: Signal<Conversation>, pending: Option<PendingSend>) {
    let Some(pending) = pending else {
        return;
    };
    spawn(async move {
        let result = api.chat(&pending.request).await;
        conversation.with_mut(|c| c.complete_send(result));
        refocus_pause().await;
        focus_input();
    });
}

fn focus_input() {
    let script = format!("document.getElementById('{INPUT_ID}')?.focus();");
    let _ = document::eval(&script);
}

fn scroll_to_bottom() {
    let script = format!(
        "document.getElementById('{MESSAGES_END_ID}')?.scrollIntoView({{ behavior: 'smooth' }});"
    );
    let _ = document::eval(&script);
}

fn use_warmup(api: TwinApi, mut conversation: Signal<Conversation>) {
    use_hook(move || {
        spawn(async move {
            warm_up(&api).await;
            conversation.with_mut(|c| c.finish_warmup());
        });
    });
}

fn use_auto_scroll(conversation: Signal<Conversation>) {
    let message_count = use_memo(move || conversation.read().messages().len());
    use_effect(move || {
        message_count();
        scroll_to_bottom();
    });
}

#[component]
pub fn TwinView(config: TwinConfig) -> Element {
    let persona_name = config.persona_name.clone();
    let api = use_hook(|| TwinApi::new(config));
    let mut conversation = use_signal(Conversation::new);

    use_warmup(api.clone(), conversation);
    use_auto_scroll(conversation);

    let on_keydown = {
        let api = api.clone();
        move |ev: KeyboardEvent| {
            if ev.key() != Key::Enter {
                return;
            }
            let shift = ev.modifiers().shift();
            let (consumed, pending) = conversation.with_mut(|c| c.submit_on_enter(shift));
            if consumed {
                ev.prevent_default();
            }
            dispatch(api.clone(), conversation, pending);
        }
    };

    let on_send_click = {
        let api = api.clone();
        move |_: MouseEvent| {
            let pending = conversation.with_mut(|c| c.submit_input());
            dispatch(api.clone(), conversation, pending);
        }
    };

    let snapshot = conversation();
    let placeholder = if snapshot.warmup_done() {
        "Ask me anything..."
    } else {
        "Warming up, please wait..."
    };
    let send_title = if snapshot.warmup_done() {
        ""
    } else {
        WARMING_UP_TITLE
    };

    rsx! {
        div { class: "twin",
            TwinHeader { persona_name: persona_name.clone() }

            div { class: "messages",
                if snapshot.messages().is_empty() {
                    EmptyState {
                        persona_name: persona_name.clone(),
                        conversation,
                        api: api.clone(),
                    }
                }
                for message in snapshot.messages().iter() {
                    MessageBubble { key: "{message.id}", message: message.clone() }
                }
                if snapshot.is_loading() {
                    TypingIndicator {}
                }
                div { id: MESSAGES_END_ID }
            }

            div { class: "input-bar",
                div { class: "input-wrapper",
                    input {
                        id: INPUT_ID,
                        r#type: "text",
                        value: "{snapshot.input()}",
                        placeholder: placeholder,
                        disabled: snapshot.is_loading(),
                        autofocus: true,
                        oninput: move |ev| conversation.with_mut(|c| c.set_input(ev.value())),
                        onkeydown: on_keydown,
                    }
                    button {
                        class: "send-btn",
                        r#type: "button",
                        title: send_title,
                        disabled: !snapshot.can_submit_input(),
                        onclick: on_send_click,
                        "\u{27A4}"
                    }
                }
            }
        }
    }
}

#[component]
fn TwinHeader(persona_name: String) -> Element {
    rsx! {
        div { class: "twin-header glass-surface",
            div { class: "twin-header-avatar",
                BotAvatar { large: true }
                div { class: "status-dot" }
            }
            div {
                h2 { class: "twin-header-name", "{persona_name}" }
                p { class: "twin-header-subtitle", "AI Digital Twin \u{2022} Career Conversation" }
            }
        }
    }
}

#[component]
fn EmptyState(persona_name: String, conversation: Signal<Conversation>, api: TwinApi) -> Element {
    let chips_enabled = conversation.read().accepts_suggestions();
    rsx! {
        div { class: "empty-state",
            div { class: "empty-state-icon animate-float",
                div { class: "glow-ring" }
                div { class: "empty-state-badge", "\u{2728}" }
            }
            div { class: "empty-state-text",
                p { class: "empty-state-title", "Hello! I'm {persona_name}'s Digital Twin" }
                p { class: "empty-state-hint", "Ask me anything about my career, projects, or tech stack" }
            }
            div { class: "suggestions",
                for suggestion in SUGGESTIONS {
                    SuggestionChip {
                        key: "{suggestion}",
                        text: suggestion,
                        enabled: chips_enabled,
                        conversation,
                        api: api.clone(),
                    }
                }
            }
        }
    }
}

#[component]
fn SuggestionChip(
    text: &'static str,
    enabled: bool,
    conversation: Signal<Conversation>,
    api: TwinApi,
) -> Element {
    let mut conversation = conversation;
    rsx! {
        button {
            class: "suggestion-chip",
            r#type: "button",
            disabled: !enabled,
            onclick: move |_| {
                let pending = conversation.with_mut(|c| c.begin_send(text));
                dispatch(api.clone(), conversation, pending);
            },
            "{text}"
        }
    }
}

#[component]
fn MessageBubble(message: Message) -> Element {
    let role = message.role.as_str();
    let is_assistant = matches!(message.role, Role::Assistant);
    let time_label = format_message_time(message.timestamp).unwrap_or_default();
    rsx! {
        div { class: "message-row {role} animate-fade-in-up",
            if is_assistant {
                BotAvatar { large: false }
            }
            div { class: "bubble message-{role}",
                if is_assistant {
                    MarkdownMessage { content: message.content.clone() }
                } else {
                    p { class: "bubble-text", "{message.content}" }
                }
                p { class: "bubble-time", "{time_label}" }
            }
            if !is_assistant {
                div { class: "avatar avatar-user", "\u{1F464}" }
            }
        }
    }
}

#[component]
fn TypingIndicator() -> Element {
    rsx! {
        div { class: "message-row assistant animate-fade-in-up",
            BotAvatar { large: false }
            div { class: "bubble message-assistant",
                div { class: "typing",
                    span { class: "typing-dot" }
                    span { class: "typing-dot" }
                    span { class: "typing-dot" }
                }
            }
        }
    }
}

#[component]
fn BotAvatar(large: bool) -> Element {
    let class = if large {
        "avatar avatar-bot avatar-large"
    } else {
        "avatar avatar-bot"
    };
    rsx! {
        div { class: class, "\u{1F916}" }
    }
}
