mod spinner;

use ratatui::layout::Rect;
use ratatui::widgets::Paragraph;

pub use spinner::Spinner;

/// Furthest scroll offset that still fills `area`, counted in wrapped rows.
pub fn max_scroll(paragraph: &Paragraph, area: Rect) -> u16 {
    let rows = paragraph.line_count(area.width);
    u16::try_from(rows.saturating_sub(usize::from(area.height))).unwrap_or(u16::MAX)
}
