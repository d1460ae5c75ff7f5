//! Twin - a chat client for a remote "digital twin" persona.
//!
//! The core (`api`, `conversation`, `theme`, `markdown`, `storage`) is plain
//! Rust and testable on its own; `ui` and `views` are the Dioxus shell and
//! are compiled with the `web`, `desktop` or `mobile` feature.

pub mod api;
pub mod config;
pub mod conversation;
pub mod logging;
pub mod markdown;
pub mod storage;
pub mod theme;
pub mod types;

#[cfg(feature = "dioxus")]
pub mod ui;
#[cfg(feature = "dioxus")]
pub mod views;
