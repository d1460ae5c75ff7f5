pub mod chat;
pub mod markdown;
pub mod theme_toggle;

pub use chat::TwinView;
pub use markdown::MarkdownMessage;
pub use theme_toggle::ThemeToggle;
