//! The portfolio page that sits under every modal.

use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Margin, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, ListItem, Paragraph, Wrap};

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver, NavAction};
use crate::content::Content;
use crate::modal::ProjectPayload;
use crate::ui::{
    Component, EventResult, Keybinding, List, ListEvent, ListRow, Result, Screen, max_scroll,
};

const SCROLL_STEP: u16 = 5;

pub enum PageEvent {
    OpenProject(ProjectPayload),
}

impl ListRow for ProjectPayload {
    fn render_row(&self, theme: &Theme) -> ListItem<'static> {
        ListItem::new(vec![
            Line::from(vec![
                Span::raw(format!("{} ", self.icon)),
                Span::styled(
                    self.title.clone(),
                    Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                format!("   {}", self.description),
                Style::default().fg(theme.text()),
            )),
        ])
    }
}

pub struct PortfolioPage {
    content: Arc<Content>,
    projects: List<ProjectPayload>,
    scroll: u16,
    today: NaiveDate,
    resolver: Arc<KeyResolver>,
}

impl PortfolioPage {
    pub fn new(content: Arc<Content>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            projects: List::new(content.projects.clone(), resolver.clone())
                .with_title("Applied Work and Impact"),
            content,
            scroll: 0,
            today: Local::now().date_naive(),
            resolver,
        }
    }

    #[must_use]
    pub const fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn render_hero(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let speaker = &self.content.speaker;
        let mut chips = vec![Span::styled("Topics: ", Style::default().fg(theme.subtext0()))];
        for chip in &speaker.chips {
            chips.push(Span::styled(
                format!(" {chip} "),
                Style::default().fg(theme.base()).bg(theme.pink()),
            ));
            chips.push(Span::raw(" "));
        }

        let lines = vec![
            Line::from(Span::styled(
                speaker.headline.as_str(),
                Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                speaker.tagline.as_str(),
                Style::default().fg(theme.text()),
            )),
            Line::from(chips),
        ];

        let block = Block::default()
            .title(format!(" {} ", speaker.name))
            .title_style(Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface2()));
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }
}

impl Screen for PortfolioPage {
    type Output = PageEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_nav(&key, NavAction::PageDown) {
            self.scroll = self.scroll.saturating_add(SCROLL_STEP);
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_nav(&key, NavAction::PageUp) {
            self.scroll = self.scroll.saturating_sub(SCROLL_STEP);
            return Ok(EventResult::Consumed);
        }

        Ok(match self.projects.handle_key(key)? {
            EventResult::Event(ListEvent::Activated(project)) => {
                PageEvent::OpenProject(project).into()
            }
            EventResult::Event(ListEvent::Changed(_)) | EventResult::Consumed => {
                EventResult::Consumed
            }
            EventResult::Ignored => EventResult::Ignored,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [hero, body] =
            Layout::vertical([Constraint::Length(6), Constraint::Min(0)]).areas(area);
        self.render_hero(frame, hero, theme);

        let [details, projects] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(body);

        let text_area = details.inner(Margin::new(2, 1));
        let paragraph = Paragraph::new(body_lines(&self.content, self.today, theme))
            .wrap(Wrap { trim: true });
        self.scroll = self.scroll.min(max_scroll(&paragraph, text_area));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface2()));
        frame.render_widget(block, details);
        frame.render_widget(paragraph.scroll((self.scroll, 0)), text_area);

        self.projects.render(frame, projects, theme);
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_nav(NavAction::Select), "Open project"),
            Keybinding::new(self.resolver.display_global(GlobalAction::Inquire), "Invite to speak"),
            Keybinding::new(
                format!(
                    "{}/{}",
                    self.resolver.display_nav(NavAction::PageUp),
                    self.resolver.display_nav(NavAction::PageDown)
                ),
                "Scroll",
            ),
            Keybinding::new(self.resolver.display_global(GlobalAction::Quit), "Quit"),
        ]
    }
}

fn heading(text: &'static str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD),
    ))
}

/// About, talks, events and testimonials, top to bottom.
fn body_lines(content: &Content, today: NaiveDate, theme: &Theme) -> Vec<Line<'static>> {
    let text = Style::default().fg(theme.text());
    let muted = Style::default().fg(theme.overlay1());
    let speaker = &content.speaker;
    let mut lines = Vec::new();

    lines.push(heading("About", theme));
    lines.push(Line::from(Span::styled(speaker.bio.clone(), text)));
    if !speaker.highlights.is_empty() {
        lines.push(Line::from(Span::styled(speaker.highlights.join("   "), muted)));
    }

    if !content.topics.is_empty() {
        lines.push(Line::default());
        lines.push(heading("Talks & Formats", theme));
        for topic in &content.topics {
            lines.push(Line::from(vec![
                Span::raw(format!("{} ", topic.icon)),
                Span::styled(
                    topic.title.clone(),
                    Style::default().fg(theme.pink()).add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(Span::styled(topic.blurb.clone(), text)));
            if !topic.formats.is_empty() {
                lines.push(Line::from(Span::styled(topic.formats.join(" · "), muted)));
            }
        }
        for format in &content.formats {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{}: ", format.title),
                    Style::default().fg(theme.mauve()),
                ),
                Span::styled(format.desc.clone(), text),
            ]));
        }
    }

    if !content.events.is_empty() {
        lines.push(Line::default());
        lines.push(heading("Talks", theme));
        for event in &content.events {
            let tag = if event.is_upcoming(today) {
                Span::styled(" upcoming ", Style::default().fg(theme.base()).bg(theme.green()))
            } else {
                Span::styled(" past ", Style::default().fg(theme.base()).bg(theme.overlay0()))
            };
            lines.push(Line::from(vec![
                tag,
                Span::raw(" "),
                Span::styled(event.title.clone(), Style::default().fg(theme.mauve())),
            ]));
            lines.push(Line::from(Span::styled(
                format!("{} • {}", event.date, event.location),
                muted,
            )));
            if let Some(link) = &event.link {
                lines.push(Line::from(Span::styled(
                    format!("Details → {link}"),
                    Style::default().fg(theme.pink()),
                )));
            }
        }
    }

    if !content.testimonials.is_empty() {
        lines.push(Line::default());
        lines.push(heading("Testimonials", theme));
        for testimonial in &content.testimonials {
            lines.push(Line::from(Span::styled(
                format!("“{}”", testimonial.quote),
                text.add_modifier(Modifier::ITALIC),
            )));
            lines.push(Line::from(Span::styled(format!("— {}", testimonial.by), muted)));
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("© {} {}", today.year(), speaker.name),
        muted,
    )));
    lines
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    fn page(today: NaiveDate) -> PortfolioPage {
        let content = Arc::new(Content::builtin().unwrap());
        PortfolioPage::new(content, Arc::new(KeyResolver::default())).with_today(today)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn flatten(lines: &[Line]) -> String {
        lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect()
    }

    #[test]
    fn test_enter_opens_selected_project() {
        let mut page = page(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        page.handle_key(key(KeyCode::Down)).unwrap();
        match page.handle_key(key(KeyCode::Enter)).unwrap() {
            EventResult::Event(PageEvent::OpenProject(project)) => {
                assert_eq!(project.title, "Web3 + Trust");
            }
            _ => panic!("expected a project to open"),
        }
    }

    #[test]
    fn test_events_are_tagged_by_date() {
        let content = Content::builtin().unwrap();
        let theme = Theme::default();

        let before = flatten(&body_lines(&content, NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(), &theme));
        assert!(before.contains(" upcoming "));

        let after = flatten(&body_lines(&content, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), &theme));
        assert!(after.contains(" past "));
        assert!(!after.contains(" upcoming "));
        assert!(after.contains("© 2026 Artea Wright"));
    }

    #[test]
    fn test_page_keys_scroll_the_body() {
        let mut page = page(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        page.handle_key(key(KeyCode::PageDown)).unwrap();
        assert_eq!(page.scroll, SCROLL_STEP);
        page.handle_key(key(KeyCode::PageUp)).unwrap();
        page.handle_key(key(KeyCode::PageUp)).unwrap();
        assert_eq!(page.scroll, 0);
    }

    #[test]
    fn test_scrolling_reaches_footer_on_narrow_terminal() {
        let mut page = page(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        let mut terminal = Terminal::new(TestBackend::new(50, 24)).unwrap();
        let theme = Theme::default();

        for _ in 0..40 {
            page.handle_key(key(KeyCode::PageDown)).unwrap();
        }
        terminal
            .draw(|frame| page.render(frame, frame.area(), &theme))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        let screen: Vec<String> = buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect();
        assert!(screen.iter().any(|row| row.contains("© 2026 Artea Wright")));
    }

    #[test]
    fn test_unbound_keys_fall_through() {
        let mut page = page(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(!page.handle_key(key(KeyCode::Char('b'))).unwrap().is_consumed());
    }
}
