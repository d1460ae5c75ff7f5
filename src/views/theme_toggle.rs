use crate::types::ThemePreference;
use crate::ui::ThemeHandle;
use dioxus::prelude::*;

fn option_icon(option: ThemePreference) -> &'static str {
    match option {
        ThemePreference::Light => "\u{2600}",
        ThemePreference::Dark => "\u{263E}",
        ThemePreference::System => "\u{1F5A5}",
    }
}

#[component]
pub fn ThemeToggle(theme: ThemeHandle) -> Element {
    let current = theme.preference();
    rsx! {
        div { class: "theme-toggle",
            for option in ThemePreference::ALL {
                ThemeOption {
                    key: "{option}",
                    theme: theme.clone(),
                    option,
                    active: option == current,
                }
            }
        }
    }
}

#[component]
fn ThemeOption(theme: ThemeHandle, option: ThemePreference, active: bool) -> Element {
    let class = if active {
        "theme-option active"
    } else {
        "theme-option"
    };
    rsx! {
        button {
            class: class,
            r#type: "button",
            title: option.label(),
            onclick: move |_| theme.set_theme(option),
            span { class: "theme-option-icon", "{option_icon(option)}" }
            span { class: "theme-option-label", "{option.label()}" }
        }
    }
}
