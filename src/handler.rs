use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::App;
use crate::tui::AppEvent;

/// Lines moved per mouse wheel notch
const WHEEL_STEP: u16 = 3;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => {
            app.submit_draft();
        }

        // Chat scrolling
        KeyCode::PageUp => app.scroll_up(app.page_height()),
        KeyCode::PageDown => app.scroll_down(app.page_height()),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),

        // Draft editing
        KeyCode::Backspace => {
            if app.draft_cursor > 0 {
                app.draft_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.draft, app.draft_cursor);
                app.draft.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.draft.chars().count();
            if app.draft_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.draft, app.draft_cursor);
                app.draft.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.draft_cursor = app.draft_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.draft.chars().count();
            app.draft_cursor = (app.draft_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.draft_cursor = 0;
        }
        KeyCode::End => {
            app.draft_cursor = app.draft.chars().count();
        }
        // Chords with Ctrl or Alt are not text
        KeyCode::Char(c) if key.modifiers == KeyModifiers::NONE || key.modifiers == KeyModifiers::SHIFT => {
            let byte_pos = char_to_byte_index(&app.draft, app.draft_cursor);
            app.draft.insert(byte_pos, c);
            app.draft_cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let on_button = app.button_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown if in_chat => app.scroll_down(WHEEL_STEP),
        MouseEventKind::ScrollUp if in_chat => app.scroll_up(WHEEL_STEP),
        MouseEventKind::Down(MouseButton::Left) if on_button => {
            app.submit_draft();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SearchClient;
    use crate::config::Theme;
    use crate::chat::ChatMessage;

    fn test_app() -> App {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        App::new(SearchClient::with_client(client, "http://127.0.0.1:9/search"), Theme::default())
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c)));
        }
    }

    fn click(column: u16, row: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_typing_edits_draft() {
        let mut app = test_app();
        type_str(&mut app, "héllo");
        assert_eq!(app.draft, "héllo");
        assert_eq!(app.draft_cursor, 5);

        handle_event(&mut app, key(KeyCode::Left));
        handle_event(&mut app, key(KeyCode::Left));
        handle_event(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.draft, "hélo");
        assert_eq!(app.draft_cursor, 2);

        handle_event(&mut app, key(KeyCode::Home));
        handle_event(&mut app, key(KeyCode::Delete));
        assert_eq!(app.draft, "élo");

        handle_event(&mut app, key(KeyCode::End));
        type_str(&mut app, "!");
        assert_eq!(app.draft, "élo!");
    }

    #[test]
    fn test_modified_chars_are_not_typed() {
        let mut app = test_app();
        handle_event(&mut app, AppEvent::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL)));
        handle_event(&mut app, AppEvent::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT)));
        assert!(app.draft.is_empty());
        assert_eq!(app.draft_cursor, 0);
        assert!(!app.should_quit);

        handle_event(&mut app, AppEvent::Key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)));
        assert_eq!(app.draft, "A");
        assert_eq!(app.draft_cursor, 1);
    }

    #[test]
    fn test_enter_with_blank_draft_does_nothing() {
        let mut app = test_app();
        type_str(&mut app, "   ");
        handle_event(&mut app, key(KeyCode::Enter));
        assert!(app.transcript().is_empty());
        assert!(!app.pending);
    }

    #[tokio::test]
    async fn test_enter_submits_once() {
        let mut app = test_app();
        type_str(&mut app, "rust");
        handle_event(&mut app, key(KeyCode::Enter));
        handle_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.transcript().len(), 1);
        assert_eq!(app.transcript().last(), Some(&ChatMessage::user("rust")));
        assert_eq!(app.in_flight(), 1);

        app.settle().await;
        assert!(app.draft.is_empty());
    }

    #[tokio::test]
    async fn test_click_on_button_submits() {
        let mut app = test_app();
        app.button_area = Some(Rect::new(60, 20, 20, 3));
        type_str(&mut app, "query");

        handle_event(&mut app, click(5, 5));
        assert!(app.transcript().is_empty());

        handle_event(&mut app, click(65, 21));
        assert_eq!(app.transcript().len(), 1);

        app.settle().await;
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        handle_event(&mut app, AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(app.should_quit);
        assert!(app.draft.is_empty());

        let mut app = test_app();
        handle_event(&mut app, key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_point_in_rect_edges() {
        let rect = Rect::new(10, 10, 5, 2);
        assert!(point_in_rect(10, 10, rect));
        assert!(point_in_rect(14, 11, rect));
        assert!(!point_in_rect(15, 11, rect));
        assert!(!point_in_rect(10, 12, rect));
    }
}
