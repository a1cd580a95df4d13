//! Project detail modal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossterm::event::{KeyEvent, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Margin, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};
use serde::{Deserialize, Serialize};

use crate::Theme;
use crate::commands::{Command, CopyToClipboardCmd, OpenLinkCmd};
use crate::config::{KeyResolver, NavAction, ProjectAction};
use crate::modal::{Hit, ModalController, ModalHandle, render_backdrop};
use crate::ui::{EventResult, Keybinding, Modal, Result, max_scroll};

const MAX_PANEL_WIDTH: u16 = 90;
const BANNER_HEIGHT: u16 = 5;
const PAGE_STEP: u16 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Research {
    pub overview: Option<String>,
    pub methodology: Option<String>,
    pub findings: Vec<String>,
    pub impact: Option<String>,
    pub technologies: Vec<String>,
    pub links: Vec<ResearchLink>,
}

/// Everything shown for one project. Handed over on open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPayload {
    pub title: String,
    pub icon: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub research: Option<Research>,
}

impl ProjectPayload {
    pub fn links(&self) -> &[ResearchLink] {
        self.research.as_ref().map_or(&[], |r| r.links.as_slice())
    }
}

/// What fills the banner strip above the details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    /// A local image that exists on disk.
    Image(PathBuf),
    /// Plain fill, used when the image cannot be loaded.
    Fallback,
}

impl Banner {
    /// Locate `image` below `asset_root`. Site-absolute paths are taken
    /// relative to the root; remote images are never fetched.
    pub fn resolve(image: &str, asset_root: &Path) -> Self {
        if image.starts_with("http://") || image.starts_with("https://") {
            return Self::Fallback;
        }
        let path = asset_root.join(image.trim_start_matches('/'));
        if path.is_file() {
            Self::Image(path)
        } else {
            tracing::warn!(image, path = %path.display(), "Project image not found");
            Self::Fallback
        }
    }
}

pub enum ProjectOutput {
    Run(Box<dyn Command>),
}

pub struct ProjectModal {
    controller: ModalController<ProjectPayload>,
    banner: Option<Banner>,
    scroll: u16,
    max_scroll: u16,
    selected_link: usize,
    asset_root: PathBuf,
    resolver: Arc<KeyResolver>,
}

impl ProjectModal {
    pub fn new(asset_root: impl Into<PathBuf>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            controller: ModalController::new(),
            banner: None,
            scroll: 0,
            max_scroll: 0,
            selected_link: 0,
            asset_root: asset_root.into(),
            resolver,
        }
    }

    #[must_use]
    pub fn with_on_close(mut self, notifier: impl FnMut() + Send + 'static) -> Self {
        self.controller = self.controller.with_on_close(notifier);
        self
    }

    pub const fn project(&self) -> Option<&ProjectPayload> {
        self.controller.payload()
    }

    fn selected_link(&self) -> Option<&ResearchLink> {
        self.project()?.links().get(self.selected_link)
    }

    fn scroll_by(&mut self, delta: i32) {
        let max = self.max_scroll;
        let next = i32::from(self.scroll).saturating_add(delta).clamp(0, i32::from(max));
        self.scroll = u16::try_from(next).unwrap_or(max);
    }
}

impl ModalHandle for ProjectModal {
    type Payload = ProjectPayload;

    fn open(&mut self, payload: ProjectPayload) {
        tracing::debug!(project = %payload.title, "Project opened");
        self.banner = payload
            .image
            .as_deref()
            .map(|image| Banner::resolve(image, &self.asset_root));
        self.scroll = 0;
        self.max_scroll = 0;
        self.selected_link = 0;
        self.controller.show(Some(payload));
    }

    fn close(&mut self) {
        self.banner = None;
        self.scroll = 0;
        self.max_scroll = 0;
        self.selected_link = 0;
        self.controller.hide();
    }

    fn is_open(&self) -> bool {
        self.controller.is_open()
    }
}

impl Modal for ProjectModal {
    type Output = ProjectOutput;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if !self.is_open() {
            return Ok(EventResult::Ignored);
        }
        let resolver = self.resolver.clone();

        if resolver.matches_project(&key, ProjectAction::Close) {
            self.close();
        } else if resolver.matches_project(&key, ProjectAction::OpenLink) {
            if let Some(link) = self.selected_link() {
                let cmd = OpenLinkCmd::new(&link.url, &link.label);
                return Ok(ProjectOutput::Run(Box::new(cmd)).into());
            }
        } else if resolver.matches_project(&key, ProjectAction::CopyLink) {
            if let Some(link) = self.selected_link() {
                let cmd = CopyToClipboardCmd::new(&link.url, format!("link to {}", link.label));
                return Ok(ProjectOutput::Run(Box::new(cmd)).into());
            }
        } else if resolver.matches_project(&key, ProjectAction::NextLink) {
            let count = self.project().map_or(0, |p| p.links().len());
            if count > 0 {
                self.selected_link = (self.selected_link + 1) % count;
            }
        } else if resolver.matches_nav(&key, NavAction::Down) {
            self.scroll_by(1);
        } else if resolver.matches_nav(&key, NavAction::Up) {
            self.scroll_by(-1);
        } else if resolver.matches_nav(&key, NavAction::PageDown) {
            self.scroll_by(i32::from(PAGE_STEP));
        } else if resolver.matches_nav(&key, NavAction::PageUp) {
            self.scroll_by(-i32::from(PAGE_STEP));
        } else if resolver.matches_nav(&key, NavAction::Home) {
            self.scroll = 0;
        } else if resolver.matches_nav(&key, NavAction::End) {
            self.scroll = self.max_scroll;
        }

        Ok(EventResult::Consumed)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<EventResult<Self::Output>> {
        if !self.is_open() {
            return Ok(EventResult::Ignored);
        }
        match mouse.kind {
            MouseEventKind::ScrollDown => self.scroll_by(1),
            MouseEventKind::ScrollUp => self.scroll_by(-1),
            _ => {
                if self.controller.hit(&mouse) == Hit::Backdrop {
                    self.close();
                }
            }
        }
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(project) = self.controller.payload() else {
            return;
        };

        render_backdrop(frame, area);
        let width = MAX_PANEL_WIDTH.min(area.width.saturating_sub(4));
        let panel = area.centered(Constraint::Length(width), Constraint::Percentage(85));
        frame.render_widget(Clear, panel);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface2()))
            .style(Style::default().bg(theme.base()).fg(theme.text()));
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let banner_height = if self.banner.is_some() { BANNER_HEIGHT } else { 0 };
        let [banner_area, body_area] =
            Layout::vertical([Constraint::Length(banner_height), Constraint::Min(0)]).areas(inner);

        if let Some(banner) = &self.banner {
            render_banner(frame, banner_area, banner, &project.title, theme);
        }

        let text_area = body_area.inner(Margin::new(2, 1));
        let paragraph = Paragraph::new(detail_lines(project, self.selected_link, theme))
            .wrap(Wrap { trim: false });
        self.max_scroll = max_scroll(&paragraph, text_area);
        self.scroll = self.scroll.min(self.max_scroll);
        frame.render_widget(paragraph.scroll((self.scroll, 0)), text_area);

        self.controller.set_panel(panel);
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let mut hints = vec![Keybinding::new(
            self.resolver.display_project(ProjectAction::Close),
            "Close",
        )];
        if self.project().is_some_and(|p| !p.links().is_empty()) {
            hints.push(Keybinding::new(
                self.resolver.display_project(ProjectAction::OpenLink),
                "Open link",
            ));
            hints.push(Keybinding::new(
                self.resolver.display_project(ProjectAction::CopyLink),
                "Copy link",
            ));
            hints.push(Keybinding::new(
                self.resolver.display_project(ProjectAction::NextLink),
                "Next link",
            ));
        }
        hints.push(Keybinding::new(
            format!(
                "{}/{}",
                self.resolver.display_nav(NavAction::Up),
                self.resolver.display_nav(NavAction::Down)
            ),
            "Scroll",
        ));
        hints
    }
}

fn render_banner(frame: &mut Frame, area: Rect, banner: &Banner, title: &str, theme: &Theme) {
    match banner {
        Banner::Image(path) => {
            let name = path
                .file_name()
                .map_or_else(|| title.to_string(), |n| n.to_string_lossy().into_owned());
            let caption = Paragraph::new(vec![
                Line::default(),
                Line::from(Span::styled(
                    format!("▣ {name}"),
                    Style::default().fg(theme.subtext1()),
                )),
            ])
            .alignment(Alignment::Center)
            .style(Style::default().bg(theme.surface0()));
            frame.render_widget(caption, area);
        }
        Banner::Fallback => {
            frame.render_widget(
                Block::default().style(Style::default().bg(theme.banner_fallback())),
                area,
            );
        }
    }
}

fn heading(text: &'static str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD),
    ))
}

/// Body of the modal. Sections without content are left out entirely.
pub fn detail_lines(project: &ProjectPayload, selected_link: usize, theme: &Theme) -> Vec<Line<'static>> {
    let body = Style::default().fg(theme.text());
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{}  ", project.icon), Style::default().fg(theme.mauve())),
            Span::styled(
                project.title.clone(),
                Style::default().fg(theme.mauve()).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(project.description.clone(), body)),
    ];

    let Some(research) = &project.research else {
        return lines;
    };

    let prose = |title: &'static str, text: &Option<String>, lines: &mut Vec<Line<'static>>| {
        if let Some(text) = text.as_deref().filter(|t| !t.trim().is_empty()) {
            lines.push(Line::default());
            lines.push(heading(title, theme));
            lines.push(Line::from(Span::styled(text.to_string(), body)));
        }
    };
    prose("Overview", &research.overview, &mut lines);
    prose("Methodology", &research.methodology, &mut lines);

    if !research.findings.is_empty() {
        lines.push(Line::default());
        lines.push(heading("Key Findings", theme));
        for finding in &research.findings {
            lines.push(Line::from(vec![
                Span::styled("• ", Style::default().fg(theme.pink())),
                Span::styled(finding.clone(), body),
            ]));
        }
    }

    prose("Impact", &research.impact, &mut lines);

    if !research.technologies.is_empty() {
        lines.push(Line::default());
        lines.push(heading("Technologies", theme));
        let mut tags = Vec::with_capacity(research.technologies.len() * 2);
        for tech in &research.technologies {
            tags.push(Span::styled(
                format!(" {tech} "),
                Style::default().fg(theme.mauve()).bg(theme.surface0()),
            ));
            tags.push(Span::raw(" "));
        }
        lines.push(Line::from(tags));
    }

    if !research.links.is_empty() {
        lines.push(Line::default());
        lines.push(heading("Resources", theme));
        for (index, link) in research.links.iter().enumerate() {
            let style = if index == selected_link {
                Style::default()
                    .fg(theme.pink())
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(theme.pink())
            };
            lines.push(Line::from(vec![
                Span::styled(format!("↗ {}", link.label), style),
                Span::styled(format!("  {}", link.url), Style::default().fg(theme.overlay1())),
            ]));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::modal::tests::press;

    fn payload(research: Option<Research>) -> ProjectPayload {
        ProjectPayload {
            title: "Emerging Tech Convergence".to_string(),
            icon: "🧠".to_string(),
            description: "Where AI meets immersive media.".to_string(),
            image: Some("/images/convergence.jpg".to_string()),
            research,
        }
    }

    fn research() -> Research {
        Research {
            overview: Some("A study of converging platforms.".to_string()),
            findings: vec!["Adoption doubles yearly".to_string()],
            links: vec![
                ResearchLink {
                    label: "Paper".to_string(),
                    url: "https://example.org/paper".to_string(),
                },
                ResearchLink {
                    label: "Slides".to_string(),
                    url: "https://example.org/slides".to_string(),
                },
            ],
            ..Research::default()
        }
    }

    fn modal() -> ProjectModal {
        ProjectModal::new("/nonexistent", Arc::new(KeyResolver::default()))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn text_of(lines: &[Line]) -> String {
        lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect::<Vec<_>>()
            .join("|")
    }

    #[test]
    fn test_open_stores_payload_and_close_clears_it() {
        let closes = Arc::new(AtomicUsize::new(0));
        let counter = closes.clone();
        let mut modal = modal().with_on_close(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(modal.project().is_none());

        modal.open(payload(None));
        assert!(modal.is_open());
        assert_eq!(modal.project().map(|p| p.title.as_str()), Some("Emerging Tech Convergence"));
        assert_eq!(modal.banner, Some(Banner::Fallback));

        modal.close();
        assert!(!modal.is_open());
        assert!(modal.project().is_none());
        assert!(modal.banner.is_none());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_banner_resolution() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/roots.jpg"), b"jpg").unwrap();

        assert_eq!(
            Banner::resolve("/images/roots.jpg", dir.path()),
            Banner::Image(dir.path().join("images/roots.jpg"))
        );
        assert_eq!(Banner::resolve("/images/missing.jpg", dir.path()), Banner::Fallback);
        assert_eq!(
            Banner::resolve("https://example.org/roots.jpg", dir.path()),
            Banner::Fallback
        );
    }

    #[test]
    fn test_detail_lines_skip_empty_sections() {
        let theme = Theme::default();
        let bare = text_of(&detail_lines(&payload(None), 0, &theme));
        assert!(bare.contains("Emerging Tech Convergence"));
        assert!(!bare.contains("Overview"));

        let rich = text_of(&detail_lines(&payload(Some(research())), 0, &theme));
        assert!(rich.contains("Overview"));
        assert!(rich.contains("Key Findings"));
        assert!(rich.contains("Resources"));
        assert!(!rich.contains("Methodology"));
        assert!(!rich.contains("Technologies"));
    }

    #[test]
    fn test_links_produce_commands() {
        let mut modal = modal();
        modal.open(payload(Some(research())));

        let result = modal.handle_key(key(KeyCode::Char('o'))).unwrap();
        assert!(matches!(result, EventResult::Event(ProjectOutput::Run(_))));

        modal.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(modal.selected_link().map(|l| l.label.as_str()), Some("Slides"));
        modal.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(modal.selected_link().map(|l| l.label.as_str()), Some("Paper"));

        let result = modal.handle_key(key(KeyCode::Char('y'))).unwrap();
        assert!(matches!(result, EventResult::Event(ProjectOutput::Run(_))));
    }

    #[test]
    fn test_open_link_without_links_is_consumed() {
        let mut modal = modal();
        modal.open(payload(None));
        let result = modal.handle_key(key(KeyCode::Char('o'))).unwrap();
        assert!(matches!(result, EventResult::Consumed));
    }

    #[test]
    fn test_escape_closes() {
        let mut modal = modal();
        modal.open(payload(None));
        modal.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(!modal.is_open());
        assert!(!modal.handle_key(key(KeyCode::Esc)).unwrap().is_consumed());
    }

    #[test]
    fn test_backdrop_closes_but_content_does_not() {
        let closes = Arc::new(AtomicUsize::new(0));
        let counter = closes.clone();
        let mut modal = modal().with_on_close(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        modal.open(payload(Some(research())));

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|frame| modal.render(frame, frame.area(), &theme))
            .unwrap();

        let panel = modal.controller.panel().unwrap();
        modal.handle_mouse(press(panel.x + 3, panel.y + 3)).unwrap();
        assert!(modal.is_open());

        modal.handle_mouse(press(0, 0)).unwrap();
        assert!(!modal.is_open());
        assert!(modal.project().is_none());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut modal = modal();
        modal.open(payload(Some(research())));
        modal.handle_key(key(KeyCode::Up)).unwrap();
        assert_eq!(modal.scroll, 0);

        modal.max_scroll = 2;
        modal.handle_key(key(KeyCode::PageDown)).unwrap();
        assert_eq!(modal.scroll, 2);
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_end_reaches_last_link_on_narrow_terminal() {
        let content = crate::content::Content::builtin().unwrap();
        let project = content
            .projects
            .iter()
            .find(|p| p.title == "AI + Data")
            .cloned()
            .unwrap();
        let last_link = project.links().last().unwrap().label.clone();

        let mut modal = modal();
        modal.open(project);
        let mut terminal = Terminal::new(TestBackend::new(50, 24)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|frame| modal.render(frame, frame.area(), &theme))
            .unwrap();
        assert!(!screen_text(&terminal).contains(&last_link));

        modal.handle_key(key(KeyCode::End)).unwrap();
        assert!(modal.scroll > 0);
        terminal
            .draw(|frame| modal.render(frame, frame.area(), &theme))
            .unwrap();
        assert!(screen_text(&terminal).contains(&last_link));

        modal.handle_key(key(KeyCode::Down)).unwrap();
        assert_eq!(modal.scroll, modal.max_scroll);
    }
}
