use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::ui::Keybinding;

const LOGO: &str = "◆ podium";

/// Bottom bar: who is on stage, what has focus, and the keys that apply.
pub struct StatusBar {
    speaker: String,
}

impl StatusBar {
    pub fn new(speaker: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        focus: &str,
        keybindings: &[Keybinding],
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface2()));

        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(32),
                Constraint::Min(20),
                Constraint::Length(10),
            ])
            .split(inner_area);

        let status = Line::from(vec![
            Span::styled(
                truncate_str(&self.speaker, 20),
                Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" · ", Style::default().fg(theme.surface2())),
            Span::styled(focus.to_string(), Style::default().fg(theme.subtext0())),
        ]);
        frame.render_widget(Paragraph::new(status), chunks[0]);

        frame.render_widget(
            Paragraph::new(hint_line(keybindings, chunks[1].width as usize, theme)),
            chunks[1],
        );

        frame.render_widget(
            Paragraph::new(Span::styled(
                LOGO,
                Style::default().fg(theme.pink()).add_modifier(Modifier::BOLD),
            )),
            chunks[2],
        );
    }
}

/// Lay hints out left to right, dropping the ones that do not fit.
fn hint_line<'a>(keybindings: &[Keybinding], max_width: usize, theme: &Theme) -> Line<'a> {
    let mut spans = Vec::new();
    let mut used = 0;

    for kb in keybindings {
        let width = kb.key.chars().count() + kb.description.chars().count() + 4;
        if used + width > max_width {
            break;
        }
        used += width;
        spans.push(Span::styled(kb.key.clone(), Style::default().fg(theme.peach())));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            kb.description.clone(),
            Style::default().fg(theme.subtext0()),
        ));
        spans.push(Span::raw("   "));
    }

    Line::from(spans)
}

/// Truncate a string to fit within a given width, adding "..." if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width > 3 {
        let head: String = s.chars().take(max_width - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("podium", 10), "podium");
        assert_eq!(truncate_str("Emerging Tech Convergence", 10), "Emergin...");
        assert_eq!(truncate_str("héllo wörld", 8), "héllo...");
        assert_eq!(truncate_str("abcdef", 2), "ab");
    }

    #[test]
    fn test_hint_line_drops_overflowing_hints() {
        let theme = Theme::default();
        let hints = vec![
            Keybinding::new("b", "Book a talk"),
            Keybinding::new("q", "Quit"),
        ];
        let line = hint_line(&hints, 18, &theme);
        // Only the first hint (1 + 11 + 4 = 16 columns) fits.
        assert_eq!(line.spans.len(), 4);
    }
}
