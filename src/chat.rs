//! Conversation types
//!
//! Chat messages and the append-only transcript that holds them, plus the
//! paragraph rules used to turn a raw response body into bot content and
//! bot content into renderable blocks. Nothing here knows about the
//! terminal or the network.

/// Text shown in place of an answer when a search fails for any reason.
pub const FAILURE_MESSAGE: &str = "Sorry, there was an error processing your request.";

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Bot,
}

/// A single entry in the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    /// The query exactly as the user typed it
    User(String),
    /// Paragraphs of the service's answer, in order
    Bot(Vec<String>),
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        ChatMessage::User(text.into())
    }

    pub fn bot(paragraphs: Vec<String>) -> Self {
        ChatMessage::Bot(paragraphs)
    }

    /// The canned answer used for every failed request
    pub fn failure() -> Self {
        ChatMessage::Bot(vec![FAILURE_MESSAGE.to_string()])
    }

    pub fn role(&self) -> ChatRole {
        match self {
            ChatMessage::User(_) => ChatRole::User,
            ChatMessage::Bot(_) => ChatRole::Bot,
        }
    }
}

/// Append-only, ordered list of messages.
///
/// Entries cannot be edited, removed or reordered once pushed; readers only
/// get shared access.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn as_slice(&self) -> &[ChatMessage] {
        &self.messages
    }
}

/// Unicode white space plus U+FEFF (byte-order mark)
fn is_trimmable(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn trim(text: &str) -> &str {
    text.trim_matches(is_trimmable)
}

/// Split a response body into paragraphs.
///
/// Segments are separated by `\n`; any segment that is blank after trimming
/// is dropped. Kept segments are stored as received.
pub fn split_paragraphs(body: &str) -> Vec<String> {
    body.split('\n')
        .filter(|segment| !trim(segment).is_empty())
        .map(str::to_string)
        .collect()
}

/// How a single bot paragraph is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphKind<'a> {
    /// One-item bulleted list; the marker and surrounding whitespace are gone
    Bullet(&'a str),
    Plain(&'a str),
}

/// Classify a paragraph by its first character.
///
/// Each paragraph is judged on its own; consecutive bullets are not merged
/// into a list.
pub fn classify_paragraph(paragraph: &str) -> ParagraphKind<'_> {
    match paragraph.strip_prefix(['-', '*']) {
        Some(rest) => ParagraphKind::Bullet(trim(rest)),
        None => ParagraphKind::Plain(paragraph),
    }
}
