pub mod app;
pub mod chat;
pub mod client;
pub mod config;
pub mod handler;
pub mod logging;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use chat::{ChatMessage, ChatRole, Transcript};
pub use client::{SearchClient, SearchError, SearchOutcome, SEARCH_ENDPOINT};
pub use config::{Config, Theme};
