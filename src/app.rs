use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use crate::chat::{ChatMessage, Transcript};
use crate::client::{SearchClient, SearchOutcome};
use crate::config::{Config, Theme};

/// Where the chat pane ended up after a render pass, used to drive scrolling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatLayout {
    /// Wrapped line count of the whole conversation
    pub total_lines: u16,
    /// Line on which the most recent message starts
    pub last_message_line: u16,
    /// Visible rows inside the chat pane
    pub viewport_height: u16,
}

pub struct App {
    pub should_quit: bool,

    // Session state
    pub draft: String,
    pub draft_cursor: usize, // cursor position in draft, in chars
    pub pending: bool,
    transcript: Transcript,
    in_flight: Vec<JoinHandle<SearchOutcome>>,

    // Chat view state
    pub chat_scroll: u16,
    chat_layout: ChatLayout,
    seen_messages: usize,

    // Animation state
    pub animation_frame: usize,

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub button_area: Option<Rect>,

    pub theme: Theme,
    client: SearchClient,
}

impl App {
    pub fn new(client: SearchClient, theme: Theme) -> Self {
        Self {
            should_quit: false,

            draft: String::new(),
            draft_cursor: 0,
            pending: false,
            transcript: Transcript::new(),
            in_flight: Vec::new(),

            chat_scroll: 0,
            chat_layout: ChatLayout::default(),
            seen_messages: 0,

            animation_frame: 0,

            chat_area: None,
            button_area: None,

            theme,
            client,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(SearchClient::new(config.endpoint()), config.theme())
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether the search button is enabled
    pub fn can_submit(&self) -> bool {
        !self.pending && !self.draft.trim().is_empty()
    }

    /// Submit the current draft if the button is enabled
    pub fn submit_draft(&mut self) -> bool {
        if !self.can_submit() {
            return false;
        }
        let query = self.draft.clone();
        self.submit(query);
        true
    }

    /// Append the user's message and start the request in the background.
    ///
    /// Does not check [`App::can_submit`]; overlapping calls each get their
    /// own request and their answers are appended as they finish.
    pub fn submit(&mut self, query: String) {
        tracing::info!(chars = query.chars().count(), "submitting search");

        self.transcript.push(ChatMessage::user(query.clone()));
        self.pending = true;

        let client = self.client.clone();
        self.in_flight.push(tokio::spawn(client.dispatch(query)));
    }

    /// Number of requests that have not been folded into the transcript yet
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Collect any finished requests without waiting on the rest
    pub async fn poll_search(&mut self) {
        let mut i = 0;
        while i < self.in_flight.len() {
            if self.in_flight[i].is_finished() {
                let handle = self.in_flight.remove(i);
                self.join(handle).await;
            } else {
                i += 1;
            }
        }
    }

    /// Wait for every outstanding request to finish
    pub async fn settle(&mut self) {
        while !self.in_flight.is_empty() {
            let handle = self.in_flight.remove(0);
            self.join(handle).await;
        }
    }

    async fn join(&mut self, handle: JoinHandle<SearchOutcome>) {
        let outcome = handle.await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "search task did not complete");
            SearchOutcome::Failed
        });
        self.complete_search(outcome);
    }

    /// Fold a finished request into the session
    pub fn complete_search(&mut self, outcome: SearchOutcome) {
        self.transcript.push(outcome.into_message());
        self.pending = false;
        self.draft.clear();
        self.draft_cursor = 0;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.pending {
            self.animation_frame = self.animation_frame.wrapping_add(1);
        }
    }

    /// Post-render hook: record the chat layout and, when the transcript has
    /// grown since the last render, bring the newest message into view.
    pub fn on_chat_rendered(&mut self, layout: ChatLayout) {
        self.chat_layout = layout;

        if self.transcript.len() > self.seen_messages {
            self.seen_messages = self.transcript.len();
            self.chat_scroll = layout.last_message_line;
        }

        self.chat_scroll = self.chat_scroll.min(self.max_scroll());
    }

    pub fn chat_layout(&self) -> ChatLayout {
        self.chat_layout
    }

    fn max_scroll(&self) -> u16 {
        self.chat_layout
            .total_lines
            .saturating_sub(self.chat_layout.viewport_height)
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
    }

    pub fn page_height(&self) -> u16 {
        self.chat_layout.viewport_height.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatRole;

    // Nothing listens here; requests fail fast if they are ever awaited.
    fn test_app() -> App {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        App::new(SearchClient::with_client(client, "http://127.0.0.1:9/search"), Theme::default())
    }

    #[test]
    fn test_submit_disabled_for_blank_draft() {
        let mut app = test_app();
        assert!(!app.can_submit());

        app.draft = "   \t ".to_string();
        assert!(!app.can_submit());

        app.draft = " rust ".to_string();
        assert!(app.can_submit());
    }

    #[test]
    fn test_submit_disabled_while_pending() {
        let mut app = test_app();
        app.draft = "rust".to_string();
        app.pending = true;
        assert!(!app.can_submit());
    }

    #[test]
    fn test_complete_search_resets_session() {
        let mut app = test_app();
        app.draft = "leftover".to_string();
        app.draft_cursor = 4;
        app.pending = true;

        app.complete_search(SearchOutcome::Failed);

        assert!(!app.pending);
        assert!(app.draft.is_empty());
        assert_eq!(app.draft_cursor, 0);
        assert_eq!(app.transcript().last(), Some(&ChatMessage::failure()));
    }

    #[tokio::test]
    async fn test_submit_appends_user_message_first() {
        let mut app = test_app();
        app.draft = "  what is rust  ".to_string();

        assert!(app.submit_draft());

        assert_eq!(app.transcript().len(), 1);
        assert_eq!(app.transcript().last(), Some(&ChatMessage::user("  what is rust  ")));
        assert!(app.pending);
        assert!(!app.can_submit());
        assert_eq!(app.in_flight(), 1);

        app.settle().await;
        assert!(!app.pending);
        assert_eq!(app.transcript().last().map(ChatMessage::role), Some(ChatRole::Bot));
    }

    #[tokio::test]
    async fn test_submit_draft_refuses_when_disabled() {
        let mut app = test_app();
        assert!(!app.submit_draft());
        assert!(app.transcript().is_empty());
        assert_eq!(app.in_flight(), 0);
    }

    #[test]
    fn test_scroll_follows_new_message() {
        let mut app = test_app();
        app.complete_search(SearchOutcome::Answer(vec!["a".into()]));

        app.on_chat_rendered(ChatLayout { total_lines: 50, last_message_line: 30, viewport_height: 10 });
        assert_eq!(app.chat_scroll, 30);

        // Manual scrolling sticks until the next message arrives
        app.scroll_up(25);
        app.on_chat_rendered(ChatLayout { total_lines: 50, last_message_line: 30, viewport_height: 10 });
        assert_eq!(app.chat_scroll, 5);

        app.complete_search(SearchOutcome::Answer(vec!["b".into()]));
        app.on_chat_rendered(ChatLayout { total_lines: 60, last_message_line: 55, viewport_height: 10 });
        assert_eq!(app.chat_scroll, 50);
    }

    #[test]
    fn test_scroll_down_is_clamped() {
        let mut app = test_app();
        app.on_chat_rendered(ChatLayout { total_lines: 12, last_message_line: 0, viewport_height: 10 });
        app.scroll_down(100);
        assert_eq!(app.chat_scroll, 2);
        app.scroll_up(100);
        assert_eq!(app.chat_scroll, 0);
    }

    #[test]
    fn test_tick_only_animates_while_pending() {
        let mut app = test_app();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);
        app.pending = true;
        app.tick_animation();
        assert_eq!(app.animation_frame, 1);
    }
}
