//! Terminal presentation of the widget
//!
//! Renders a [`ChatState`] snapshot and maps key presses to intents. Owns no
//! state of its own.

use crate::state_machine::{ChatState, Message, MessageStatus, Role};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

const TITLE: &str = "Asistente virtual";
const PANEL_WIDTH: u16 = 64;
const PANEL_HEIGHT: u16 = 26;
const HINT: &str = "Sin claves internas: la integración usa únicamente el endpoint público del agente.";

/// What a key press asks the widget to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    TogglePanel,
    ClosePanel,
    EditDraft(String),
    Submit,
    Quit,
    Ignore,
}

/// Maps a key press to an intent given the current snapshot
pub fn handle_key(state: &ChatState, key: KeyEvent) -> Intent {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return Intent::Quit,
        KeyCode::Char('o') if ctrl => return Intent::TogglePanel,
        _ => {}
    }

    if !state.is_open {
        return Intent::Ignore;
    }
    if key.code == KeyCode::Esc {
        return Intent::ClosePanel;
    }
    // Input is disabled while an exchange is in flight
    if state.is_sending {
        return Intent::Ignore;
    }

    match key.code {
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            Intent::EditDraft(format!("{}\n", state.draft))
        }
        KeyCode::Enter if state.draft.trim().is_empty() => Intent::Ignore,
        KeyCode::Enter => Intent::Submit,
        KeyCode::Backspace => {
            let mut draft = state.draft.clone();
            draft.pop();
            Intent::EditDraft(draft)
        }
        KeyCode::Char(c) if !ctrl => Intent::EditDraft(format!("{}{c}", state.draft)),
        _ => Intent::Ignore,
    }
}

/// Draws the bubble, or the full panel when open
pub fn render(frame: &mut Frame, state: &ChatState) {
    let area = frame.area();
    if state.is_open {
        render_panel(frame, anchored(area, PANEL_WIDTH, PANEL_HEIGHT), state);
    } else {
        render_bubble(frame, anchored(area, 8, 3));
    }
}

/// Rect of at most `width`x`height` in the bottom-right corner of `area`
fn anchored(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + area.width - width,
        y: area.y + area.height - height,
        width,
        height,
    }
}

fn render_bubble(frame: &mut Frame, area: Rect) {
    let bubble = Paragraph::new(" 💬 ")
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(Clear, area);
    frame.render_widget(bubble, area);
}

fn render_panel(frame: &mut Frame, area: Rect, state: &ChatState) {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {TITLE} "),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(" Esc: cerrar ").right_aligned());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let error_height = u16::from(!state.last_error.is_empty());
    let [header, body, error, input, hint] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(error_height),
        Constraint::Length(3),
        Constraint::Length(2),
    ])
    .areas(inner);

    frame.render_widget(Paragraph::new(header_line(state)), header);
    render_messages(frame, body, &state.messages);

    if error_height > 0 {
        frame.render_widget(
            Paragraph::new(state.last_error.as_str()).style(Style::default().fg(Color::Red)),
            error,
        );
    }

    let send_label = if state.is_sending {
        "Enviando…"
    } else {
        "Enter: Enviar"
    };
    let draft = if state.draft.is_empty() {
        Paragraph::new("Escribe tu mensaje...").style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(state.draft.as_str()).wrap(Wrap { trim: false })
    };
    frame.render_widget(
        draft.block(
            Block::default()
                .borders(Borders::ALL)
                .title_bottom(Line::from(format!(" {send_label} ")).right_aligned()),
        ),
        input,
    );

    frame.render_widget(
        Paragraph::new(HINT)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true }),
        hint,
    );
}

fn header_line(state: &ChatState) -> Line<'static> {
    let mut spans = vec![Span::styled(
        if state.mode.is_stateless() {
            "Modo sin estado"
        } else {
            "Sesión activa para tu conversación"
        },
        Style::default().fg(Color::Gray),
    )];
    if !state.mode.is_stateless() && !state.session_id.is_empty() {
        spans.push(Span::styled(
            format!("  ID: {}", state.session_id),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let (avatar, color) = match message.role {
        Role::Agent => ("Agente", Color::Cyan),
        Role::User => ("Tú", Color::Green),
    };
    let text_style = match message.status {
        MessageStatus::Error => Style::default().fg(Color::Red),
        MessageStatus::Fallback => Style::default().fg(Color::Yellow),
        MessageStatus::Typing => Style::default().fg(Color::DarkGray),
        MessageStatus::None => Style::default(),
    };

    let mut lines = vec![Line::from(Span::styled(
        avatar,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))];
    if message.is_typing() {
        lines.push(Line::from(Span::styled("  • • •", text_style)));
    } else {
        lines.extend(
            message
                .text
                .lines()
                .map(|l| Line::from(Span::styled(format!("  {l}"), text_style))),
        );
    }
    lines.push(Line::default());
    lines
}

fn render_messages(frame: &mut Frame, area: Rect, messages: &[Message]) {
    let lines: Vec<Line> = messages.iter().flat_map(message_lines).collect();
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });

    // Keep the newest entry in view. Word wrapping can take more rows than
    // width alone suggests, so ask the paragraph for its wrapped height.
    let overflow = paragraph
        .line_count(area.width)
        .saturating_sub(usize::from(area.height));
    let scroll = u16::try_from(overflow).unwrap_or(u16::MAX);

    frame.render_widget(paragraph.scroll((scroll, 0)), area);
}
