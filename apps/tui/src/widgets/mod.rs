//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use tecnobot_core::persona::BOT_NAME;
use tecnobot_shared::{Message, ModelSelection, Role};

/// Bottom status bar. Highlighted while a response is pending.
pub(crate) fn status_bar(msg: &str, busy: bool) -> Paragraph<'_> {
    let bg = if busy { Color::Blue } else { Color::DarkGray };
    Paragraph::new(format!(" {msg}")).style(Style::default().bg(bg).fg(Color::White))
}

/// Transcript rendered as styled lines: a speaker header, the content, a gap.
pub(crate) fn transcript_lines(messages: &[Message]) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    for msg in messages {
        let (label, color) = match msg.role {
            Role::User => ("🧑‍💻 Tú".to_string(), Color::Green),
            Role::Assistant => (format!("🤖 {BOT_NAME}"), Color::Cyan),
            Role::System => ("⚙ Sistema".to_string(), Color::DarkGray),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.extend(msg.content.lines().map(Line::from));
        lines.push(Line::from(""));
    }
    lines
}

/// Word-wrapped transcript body, without a block. Its `line_count` is the
/// number of rows ratatui will actually render.
pub(crate) fn transcript(messages: &[Message]) -> Paragraph<'_> {
    Paragraph::new(transcript_lines(messages)).wrap(Wrap { trim: false })
}

/// Sidebar list of models with the active one highlighted.
pub(crate) fn model_list(current: ModelSelection) -> List<'static> {
    let items: Vec<ListItem> = ModelSelection::ALL
        .iter()
        .map(|m| {
            let (marker, style) = if *m == current {
                (
                    "▶ ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )
            } else {
                ("  ", Style::default())
            };
            ListItem::new(vec![
                Line::from(Span::styled(format!("{marker}{}", m.as_str()), style)),
                Line::from(Span::styled(
                    format!("    {}", m.hint()),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Modelo (F2) "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_lines_layout() {
        let msgs = vec![Message::assistant("¡Hola!"), Message::user("línea 1\nlínea 2")];
        let lines = transcript_lines(&msgs);
        // header + 1 content + gap, header + 2 content + gap
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn transcript_rows_follow_word_wrap() {
        // One word per row at width 12, where a character count would give 3.
        let msgs = vec![Message::assistant("abcdef abcdef abcdef abcdef")];
        let rows = transcript(&msgs).line_count(12);
        assert!(rows >= 6, "header + 4 wrapped rows + gap, got {rows}");
    }
}
