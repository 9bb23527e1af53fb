//! Terminal setup, event loop and top-level layout.

use std::io;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tecnobot_core::Assistant;
use tecnobot_shared::{CompletionProvider, ModelSelection};
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::chat::{ChatAction, ChatScreen};
use crate::widgets::status_bar;

/// Application state.
pub(crate) struct App {
    pub chat: ChatScreen,
    pub should_quit: bool,
    pub show_help: bool,
}

impl App {
    pub(crate) fn new(chat: ChatScreen) -> Self {
        Self {
            chat,
            should_quit: false,
            show_help: false,
        }
    }
}

/// Entry point: sets up terminal, runs event loop, restores terminal.
pub(crate) fn run<P: CompletionProvider>(
    assistant: &Assistant<P>,
    model: ModelSelection,
    runtime: &Runtime,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, assistant, model, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<P: CompletionProvider>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    assistant: &Assistant<P>,
    model: ModelSelection,
    runtime: &Runtime,
) -> Result<()> {
    let session = assistant.new_session(model);
    info!(session = %session.id(), %model, "tui session started");
    let mut app = App::new(ChatScreen::new(session));

    loop {
        terminal.draw(|f| draw(f, &app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if app.show_help {
                    app.show_help = false;
                    continue;
                }
                match app.chat.handle_key(key.code, key.modifiers) {
                    ChatAction::None => {}
                    ChatAction::ToggleHelp => app.show_help = true,
                    ChatAction::Quit => app.should_quit = true,
                    ChatAction::Submit(text) => {
                        app.chat.begin_wait();
                        terminal.draw(|f| draw(f, &app))?;
                        let result =
                            runtime.block_on(assistant.dispatch(app.chat.session_mut(), &text));
                        if let Err(e) = &result {
                            warn!(error = %e, "turn failed");
                        }
                        app.chat.finish_wait(&result);
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let header = Paragraph::new("🎓 Chatbot del Instituto 13 de Julio")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title(" TecnoBot "));
    f.render_widget(header, chunks[0]);

    app.chat.draw(f, chunks[1]);

    f.render_widget(status_bar(app.chat.status(), app.chat.is_busy()), chunks[2]);

    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 50, f.area());

    let help_text = vec![
        Line::from("Atajos").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  Enter          Enviar la pregunta"),
        Line::from("  F2 / Ctrl-N    Siguiente modelo"),
        Line::from("  Ctrl-P         Modelo anterior"),
        Line::from("  ↑/↓ PgUp/PgDn  Desplazar la conversación"),
        Line::from("  ?              Mostrar esta ayuda (con la entrada vacía)"),
        Line::from("  Esc / Ctrl-C   Salir"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Ayuda: cualquier tecla para cerrar ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(60, 50, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 20);
        assert_eq!(inner.y, 10);
    }
}
