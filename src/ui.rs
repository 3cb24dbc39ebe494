use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use crate::app::{App, ChatLayout};
use crate::chat::{classify_paragraph, ChatMessage, ParagraphKind};
use crate::config::Theme;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const DISCLAIMER: &str = "GTSearch is prone to errors and may present inaccurate information. \
It is wise to verify its responses for accuracy, especially when dealing with crucial information.";

/// Below this width the search button takes a bigger share of the input row
const NARROW_WIDTH: u16 = 60;

const BULLET: &str = "• ";
const BULLET_INDENT: &str = "  ";

/// Pre-wrapped chat lines plus where the newest message begins
pub struct ChatView {
    pub lines: Vec<Line<'static>>,
    pub last_message_line: u16,
}

/// Greedy word wrap by display width. Words wider than `width` are split.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if current_width > 0 && current_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }

        if word_width > width {
            if current_width > 0 {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            for c in word.chars() {
                let char_width = c.width().unwrap_or(0);
                if current_width > 0 && current_width + char_width > width {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push(c);
                current_width += char_width;
            }
            continue;
        }

        if current_width > 0 {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += word_width;
    }

    if current_width > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Rows of a bot bubble: each paragraph is either plain text or a one-item
/// bulleted list.
fn bot_rows(paragraphs: &[String], text_width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    for paragraph in paragraphs {
        match classify_paragraph(paragraph) {
            ParagraphKind::Bullet(item) => {
                let wrapped = wrap_text(item, text_width.saturating_sub(BULLET.width()));
                for (i, line) in wrapped.into_iter().enumerate() {
                    let prefix = if i == 0 { BULLET } else { BULLET_INDENT };
                    rows.push(format!("{prefix}{line}"));
                }
            }
            ParagraphKind::Plain(text) => rows.extend(wrap_text(text, text_width)),
        }
    }
    rows
}

/// Pad every row to the widest one so the background reads as a block
fn bubble(rows: Vec<String>, style: Style) -> Vec<Span<'static>> {
    let width = rows.iter().map(|r| r.width()).max().unwrap_or(0);
    rows.into_iter()
        .map(|row| {
            let pad = " ".repeat(width - row.width());
            Span::styled(format!(" {row}{pad} "), style)
        })
        .collect()
}

/// Build the chat pane contents for a given inner width.
pub fn chat_view(
    messages: &[ChatMessage],
    pending: bool,
    animation_frame: usize,
    theme: &Theme,
    width: u16,
) -> ChatView {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut last_message_line = 0;

    // Bubbles use at most 80% of the pane, minus padding and margin
    let bubble_width = (width as usize * 4 / 5).max(6);
    let text_width = bubble_width - 3;

    let user_style = Style::default().bg(theme.secondary).fg(Color::Black);
    let bot_style = Style::default().bg(theme.bot_bubble).fg(theme.text_primary);
    let user_label = Style::default().fg(theme.secondary).add_modifier(Modifier::BOLD);
    let bot_label = Style::default().fg(theme.primary).add_modifier(Modifier::BOLD);

    if messages.is_empty() && !pending {
        lines.push(
            Line::from(Span::styled(
                "Ask GTSearch anything...",
                Style::default().fg(theme.text_secondary).add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center),
        );
        return ChatView { lines, last_message_line };
    }

    for message in messages {
        last_message_line = u16::try_from(lines.len()).unwrap_or(u16::MAX);

        match message {
            ChatMessage::User(text) => {
                lines.push(Line::from(vec![Span::styled("You", user_label), Span::raw(" ")]).alignment(Alignment::Right));
                for span in bubble(wrap_text(text, text_width), user_style) {
                    lines.push(Line::from(vec![span, Span::raw(" ")]).alignment(Alignment::Right));
                }
            }
            ChatMessage::Bot(paragraphs) => {
                lines.push(Line::from(vec![Span::raw(" "), Span::styled("GTSearch", bot_label)]));
                for span in bubble(bot_rows(paragraphs, text_width), bot_style) {
                    lines.push(Line::from(vec![Span::raw(" "), span]));
                }
            }
        }
        lines.push(Line::default());
    }

    if pending {
        let spinner = SPINNER[animation_frame % SPINNER.len()];
        lines.push(Line::from(vec![Span::raw(" "), Span::styled("GTSearch", bot_label)]));
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled(format!(" {spinner} Searching... "), bot_style.add_modifier(Modifier::ITALIC)),
        ]));
    }

    ChatView { lines, last_message_line }
}

/// Slice of the draft that fits in `width` columns with the cursor visible,
/// and the cursor's column within that slice. `cursor` counts chars.
fn input_viewport(draft: &str, cursor: usize, width: usize) -> (String, u16) {
    let chars: Vec<char> = draft.chars().collect();
    let cursor = cursor.min(chars.len());
    let char_width = |c: &char| c.width().unwrap_or(0);

    // Scroll from the left until the cursor cell itself still fits
    let mut start = 0;
    while start < cursor && chars[start..cursor].iter().map(char_width).sum::<usize>() >= width {
        start += 1;
    }

    let mut visible = String::new();
    let mut used = 0;
    for c in &chars[start..] {
        let w = char_width(c);
        if used + w > width {
            break;
        }
        visible.push(*c);
        used += w;
    }

    let cursor_x = chars[start..cursor].iter().map(char_width).sum::<usize>();
    (visible, u16::try_from(cursor_x).unwrap_or(u16::MAX))
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input row, disclaimer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(2),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_disclaimer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" GTSearch ", Style::default().fg(Color::White).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ])
    .alignment(Alignment::Center);

    let header = Paragraph::new(title).style(Style::default().bg(app.theme.primary));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.primary))
        .title_bottom(
            Line::from(" Enter search · PgUp/PgDn scroll · Esc quit ").alignment(Alignment::Right),
        );
    let inner = block.inner(area);
    app.chat_area = Some(area);

    // Leave the rightmost column for the scrollbar
    let view = chat_view(
        app.transcript().as_slice(),
        app.pending,
        app.animation_frame,
        &app.theme,
        inner.width.saturating_sub(1),
    );
    let total_lines = u16::try_from(view.lines.len()).unwrap_or(u16::MAX);

    app.on_chat_rendered(ChatLayout {
        total_lines,
        last_message_line: view.last_message_line,
        viewport_height: inner.height,
    });

    let chat = Paragraph::new(Text::from(view.lines))
        .block(block)
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);

    if total_lines > inner.height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(total_lines.saturating_sub(inner.height) as usize)
            .position(app.chat_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let (input_pct, button_pct) = if area.width < NARROW_WIDTH { (67, 33) } else { (75, 25) };
    let [field_area, button_area] = Layout::horizontal([
        Constraint::Percentage(input_pct),
        Constraint::Percentage(button_pct),
    ])
    .areas(area);

    app.button_area = Some(button_area);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.primary))
        .title(" Type your search query here... ");

    // Inner width = total width - 2 (for borders)
    let inner_width = field_area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = input_viewport(&app.draft, app.draft_cursor, inner_width);

    let input = Paragraph::new(visible_text).block(input_block);
    frame.render_widget(input, field_area);

    frame.set_cursor_position((field_area.x + cursor_x + 1, field_area.y + 1));

    let enabled = app.can_submit();
    let (button_style, border_color) = if enabled {
        (
            Style::default().bg(app.theme.primary).fg(Color::White).add_modifier(Modifier::BOLD),
            app.theme.primary,
        )
    } else {
        (Style::default().fg(Color::DarkGray), Color::DarkGray)
    };

    let label = if app.pending { "Searching" } else { "Search" };
    let button = Paragraph::new(Line::from(Span::styled(format!(" {label} "), button_style)))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        );
    frame.render_widget(button, button_area);
}

fn render_disclaimer(app: &App, frame: &mut Frame, area: Rect) {
    let disclaimer = Paragraph::new(DISCLAIMER)
        .style(Style::default().fg(app.theme.text_secondary))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(disclaimer, area);
}
