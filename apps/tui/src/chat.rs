//! Chat screen: transcript, input line and model selector.

use std::cell::Cell;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tecnobot_core::Session;
use tecnobot_core::persona::BOT_NAME;
use tecnobot_shared::{Completion, Result};

use crate::widgets::{model_list, transcript};

/// Width of the model selector column.
const SIDEBAR_WIDTH: u16 = 30;
/// Rows moved by PageUp/PageDown.
const PAGE: u16 = 10;

/// What the event loop should do after a key press.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ChatAction {
    None,
    Submit(String),
    ToggleHelp,
    Quit,
}

pub(crate) struct ChatScreen {
    session: Session,
    input: String,
    /// Rows scrolled up from the bottom of the transcript.
    scroll_back: u16,
    /// Largest useful `scroll_back`, as of the last draw.
    max_scroll: Cell<u16>,
    status: String,
    busy: bool,
}

impl ChatScreen {
    pub(crate) fn new(session: Session) -> Self {
        let status = format!("Modelo: {} · ? ayuda · Ctrl-C salir", session.model());
        Self {
            session,
            input: String::new(),
            scroll_back: 0,
            max_scroll: Cell::new(0),
            status,
            busy: false,
        }
    }

    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub(crate) fn status(&self) -> &str {
        &self.status
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy
    }

    /// Mark a request as in flight. Drawn before the blocking call.
    pub(crate) fn begin_wait(&mut self) {
        self.busy = true;
        self.status = format!("{BOT_NAME} está pensando...");
    }

    /// Record the outcome of a dispatch. The transcript was already updated by the session.
    pub(crate) fn finish_wait(&mut self, result: &Result<Completion>) {
        self.busy = false;
        self.scroll_back = 0;
        self.status = match result {
            Ok(c) => match (c.prompt_tokens, c.completion_tokens) {
                (Some(p), Some(r)) => format!("Modelo: {} · tokens {p}+{r}", c.model),
                _ => format!("Modelo: {}", c.model),
            },
            Err(e) if e.is_dispatch() => {
                format!("Ocurrió un error al contactar la API de Groq: {e}")
            }
            Err(e) => e.to_string(),
        };
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> ChatAction {
        if self.busy {
            return ChatAction::None;
        }
        // AltGr arrives as CONTROL | ALT and produces plain characters.
        let ctrl = modifiers.contains(KeyModifiers::CONTROL)
            && !modifiers.contains(KeyModifiers::ALT);
        match code {
            KeyCode::Char('c') if ctrl => ChatAction::Quit,
            KeyCode::Esc => ChatAction::Quit,
            KeyCode::F(2) => {
                self.cycle_model(true);
                ChatAction::None
            }
            KeyCode::Char('n') if ctrl => {
                self.cycle_model(true);
                ChatAction::None
            }
            KeyCode::Char('p') if ctrl => {
                self.cycle_model(false);
                ChatAction::None
            }
            KeyCode::Char('?') if self.input.is_empty() => ChatAction::ToggleHelp,
            KeyCode::Enter => {
                if self.input.trim().is_empty() {
                    return ChatAction::None;
                }
                self.scroll_back = 0;
                ChatAction::Submit(std::mem::take(&mut self.input))
            }
            KeyCode::Backspace => {
                self.input.pop();
                ChatAction::None
            }
            KeyCode::Up => {
                self.scroll_up(1);
                ChatAction::None
            }
            KeyCode::Down => {
                self.scroll_back = self.scroll_back.saturating_sub(1);
                ChatAction::None
            }
            KeyCode::PageUp => {
                self.scroll_up(PAGE);
                ChatAction::None
            }
            KeyCode::PageDown => {
                self.scroll_back = self.scroll_back.saturating_sub(PAGE);
                ChatAction::None
            }
            KeyCode::Char(c) if !ctrl => {
                self.input.push(c);
                ChatAction::None
            }
            _ => ChatAction::None,
        }
    }

    fn scroll_up(&mut self, rows: u16) {
        self.scroll_back = self
            .scroll_back
            .saturating_add(rows)
            .min(self.max_scroll.get());
    }

    fn cycle_model(&mut self, forward: bool) {
        let current = self.session.model();
        let model = if forward { current.next() } else { current.prev() };
        self.session.set_model(model);
        self.status = format!("Modelo cambiado a {model}");
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(SIDEBAR_WIDTH)])
            .split(area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // Transcript
                Constraint::Length(3), // Input
            ])
            .split(columns[0]);

        // Transcript, pinned to the bottom unless scrolled back
        let body = transcript(self.session.transcript().messages());
        let inner_width = rows[0].width.saturating_sub(2);
        let inner_height = rows[0].height.saturating_sub(2);
        let total = u16::try_from(body.line_count(inner_width)).unwrap_or(u16::MAX);
        let max_offset = total.saturating_sub(inner_height);
        self.max_scroll.set(max_offset);
        let offset = max_offset.saturating_sub(self.scroll_back.min(max_offset));

        let body = body
            .block(Block::default().borders(Borders::ALL).title(" Conversación "))
            .scroll((offset, 0));
        f.render_widget(body, rows[0]);

        // Input line
        let (title, border) = if self.busy {
            (" Esperando respuesta... ", Style::default().fg(Color::DarkGray))
        } else {
            (" Tu pregunta (Enter para enviar) ", Style::default().fg(Color::Yellow))
        };
        let input = Paragraph::new(self.input.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border),
        );
        f.render_widget(input, rows[1]);
        if !self.busy {
            let cursor_x = rows[1].x + 1 + u16::try_from(self.input.chars().count()).unwrap_or(0);
            f.set_cursor_position((cursor_x.min(rows[1].right().saturating_sub(2)), rows[1].y + 1));
        }

        f.render_widget(model_list(self.session.model()), columns[1]);
    }
}
