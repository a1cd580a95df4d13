use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use throbber_widgets_tui::WhichUse::Spin;
use throbber_widgets_tui::{BRAILLE_SIX, Throbber, ThrobberState};

use crate::Theme;
use crate::ui::Component;

/// Busy indicator with a caption, advanced once per app tick.
pub struct Spinner {
    state: ThrobberState,
    caption: &'static str,
}

impl Spinner {
    pub fn new(caption: &'static str) -> Self {
        Self {
            state: ThrobberState::default(),
            caption,
        }
    }

    /// Glyph, one space, then the caption.
    fn width(&self) -> u16 {
        u16::try_from(self.caption.chars().count() + 2).unwrap_or(u16::MAX)
    }
}

impl Component for Spinner {
    type Output = ();

    fn handle_tick(&mut self) {
        self.state.calc_next();
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let throbber = Throbber::default()
            .label(self.caption)
            .throbber_set(BRAILLE_SIX)
            .use_type(Spin)
            .throbber_style(Style::default().fg(theme.lavender()))
            .style(Style::default().fg(theme.subtext1()));
        let area = area.centered(Constraint::Length(self.width()), Constraint::Length(1));
        frame.render_stateful_widget(throbber, area, &mut self.state);
    }
}
