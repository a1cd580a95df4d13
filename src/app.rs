use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::Theme;
use crate::commands::Command;
use crate::config::{AppConfig, GlobalAction, KeyResolver};
use crate::content::Content;
use crate::modal::{FormModal, FormOutput, ModalHandle, ProjectModal, ProjectOutput, SubmissionStatus};
use crate::page::{PageEvent, PortfolioPage};
use crate::submit::SubmitHandler;
use crate::tui::{Event, Tui};
use crate::ui::{
    Component, ErrorDialog, ErrorDialogEvent, EventResultExt, Keybinding, Modal, Result, Screen,
    StatusBar, Toast, ToastManager, ToastType,
};

const TICK: Duration = Duration::from_millis(100);
const FRAME: Duration = Duration::from_millis(33);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Inquiry,
    Project,
}

/// Application-level messages for state transitions and feedback.
#[derive(Debug, Clone)]
pub enum AppMessage {
    // === Lifecycle ===
    /// Render the UI
    Render,
    /// Terminal resized
    Resize(u16, u16),
    /// Suspend the application (Ctrl+Z)
    Suspend,
    /// Quit the application
    Quit,

    // === Feedback ===
    /// Show a short-lived notification
    ShowToast {
        message: String,
        toast_type: ToastType,
    },
    /// Display an error to the user
    DisplayError(String),
    /// A spawned command finished
    CommandCompleted { name: String, success: bool },
    /// A modal was closed, whatever the cause
    ModalClosed(ModalKind),
}

pub struct App {
    page: PortfolioPage,
    inquiry: FormModal,
    project: ProjectModal,
    error_dialog: Option<ErrorDialog>,
    toasts: ToastManager,
    status_bar: StatusBar,
    theme: Theme,
    resolver: Arc<KeyResolver>,
    should_quit: bool,
    should_suspend: bool,
    app_tx: UnboundedSender<AppMessage>,
    app_rx: UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(
        content: Content,
        asset_root: PathBuf,
        config: &AppConfig,
        handler: Arc<dyn SubmitHandler>,
        resolver: Arc<KeyResolver>,
        theme: Theme,
    ) -> Result<Self> {
        let (app_tx, app_rx) = mpsc::unbounded_channel();
        let content = Arc::new(content);

        let inquiry_tx = app_tx.clone();
        let inquiry = FormModal::new(content.inquiry.clone(), handler, resolver.clone())?
            .with_success_delay(config.form.success_delay())
            .with_on_close(move || {
                let _ = inquiry_tx.send(AppMessage::ModalClosed(ModalKind::Inquiry));
            });

        let project_tx = app_tx.clone();
        let project = ProjectModal::new(asset_root, resolver.clone()).with_on_close(move || {
            let _ = project_tx.send(AppMessage::ModalClosed(ModalKind::Project));
        });

        Ok(Self {
            page: PortfolioPage::new(content.clone(), resolver.clone()),
            inquiry,
            project,
            error_dialog: None,
            toasts: ToastManager::new(),
            status_bar: StatusBar::new(content.speaker.name.clone()),
            theme,
            resolver,
            should_quit: false,
            should_suspend: false,
            app_tx,
            app_rx,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(TICK, FRAME)?;
        tui.enter()?;

        loop {
            if let Some(event) = tui.next_event().await {
                self.handle_event(event)?;
            }
            self.handle_messages(&mut tui)?;
            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.resume()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Quit => self.app_tx.send(AppMessage::Quit)?,
            Event::Render => self.app_tx.send(AppMessage::Render)?,
            Event::Resize(width, height) => self.app_tx.send(AppMessage::Resize(width, height))?,
            Event::Tick => {
                self.inquiry.handle_tick();
                self.toasts.handle_tick();
            }
            Event::Key(key) => self.handle_key(key)?,
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Paste(text) => self.handle_paste(&text),
        }
        // Submission results and timers land on the form's own channel.
        self.inquiry.update();
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if let Some(dialog) = &mut self.error_dialog {
            if let (_, Some(ErrorDialogEvent::Dismissed)) = dialog.handle_key(key).process() {
                self.error_dialog = None;
            }
            return Ok(());
        }

        if self.inquiry.is_open() {
            if let (_, Some(FormOutput::Run(cmd))) = self.inquiry.handle_key(key).process() {
                self.spawn(cmd);
            }
            return Ok(());
        }

        if self.project.is_open() {
            if let (_, Some(ProjectOutput::Run(cmd))) = self.project.handle_key(key).process() {
                self.spawn(cmd);
            }
            return Ok(());
        }

        let (consumed, event) = self.page.handle_key(key).process();
        if let Some(PageEvent::OpenProject(project)) = event {
            self.project.open(project);
        }
        if consumed {
            return Ok(());
        }

        if self.resolver.matches_global(&key, GlobalAction::Quit) {
            self.app_tx.send(AppMessage::Quit)?;
        } else if self.resolver.matches_global(&key, GlobalAction::Inquire) {
            self.inquiry.open(());
        } else if key.code == KeyCode::Char('z') && key.modifiers == KeyModifiers::CONTROL {
            self.app_tx.send(AppMessage::Suspend)?;
        }
        Ok(())
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.error_dialog.is_some() {
            return;
        }
        if self.inquiry.is_open() {
            if let (_, Some(FormOutput::Run(cmd))) = self.inquiry.handle_mouse(mouse).process() {
                self.spawn(cmd);
            }
        } else if self.project.is_open() {
            if let (_, Some(ProjectOutput::Run(cmd))) = self.project.handle_mouse(mouse).process() {
                self.spawn(cmd);
            }
        }
    }

    fn handle_paste(&mut self, text: &str) {
        if self.error_dialog.is_none() && self.inquiry.is_open() {
            let _ = self.inquiry.handle_paste(text).process();
        }
    }

    fn handle_messages(&mut self, tui: &mut Tui) -> Result<()> {
        while let Ok(message) = self.app_rx.try_recv() {
            if !matches!(message, AppMessage::Render) {
                tracing::debug!(?message, "Handling message");
            }

            match message {
                AppMessage::Render => {
                    tui.draw(|frame| self.draw(frame))?;
                }
                AppMessage::Resize(width, height) => {
                    tui.resize(width, height)?;
                    tui.draw(|frame| self.draw(frame))?;
                }
                message => self.apply(message),
            }
        }
        Ok(())
    }

    /// State changes that do not touch the terminal.
    fn apply(&mut self, message: AppMessage) {
        match message {
            AppMessage::Quit => self.should_quit = true,
            AppMessage::Suspend => self.should_suspend = true,
            AppMessage::ShowToast {
                message,
                toast_type,
            } => self.toasts.show(Toast::new(message, toast_type)),
            AppMessage::DisplayError(message) => {
                self.error_dialog = Some(ErrorDialog::new(message, self.resolver.clone()));
            }
            AppMessage::CommandCompleted { name, success } => {
                tracing::debug!(command = %name, success, "Command completed");
            }
            AppMessage::ModalClosed(kind) => {
                tracing::debug!(?kind, "Modal closed");
            }
            AppMessage::Render | AppMessage::Resize(..) => {}
        }
    }

    /// Run a command in the background. Failures end up in the error dialog.
    fn spawn(&self, cmd: Box<dyn Command>) {
        let name = cmd.name();
        let app_tx = self.app_tx.clone();
        tracing::debug!(command = %name, "Spawning command");

        tokio::spawn(async move {
            let result = cmd.execute(app_tx.clone()).await;
            let success = result.is_ok();
            if let Err(error) = result {
                tracing::error!(command = %name, error = %format!("{error:#}"), "Command failed");
                let _ = app_tx.send(AppMessage::DisplayError(error.to_string()));
            }
            let _ = app_tx.send(AppMessage::CommandCompleted { name, success });
        });
    }

    fn focus(&self) -> (String, Vec<Keybinding>) {
        if self.error_dialog.is_some() {
            return ("Error".to_string(), vec![Keybinding::new("Enter", "Dismiss")]);
        }
        if self.inquiry.is_open() {
            let title = &self.inquiry.definition().title;
            let label = match self.inquiry.status() {
                SubmissionStatus::Idle => title.clone(),
                SubmissionStatus::Submitting => format!("{title} (sending)"),
                SubmissionStatus::Success => format!("{title} (sent)"),
            };
            return (label, self.inquiry.keybindings());
        }
        if let Some(project) = self.project.project() {
            return (project.title.clone(), self.project.keybindings());
        }
        ("Portfolio".to_string(), self.page.keybindings())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(
            Block::default().style(Style::default().bg(self.theme.base()).fg(self.theme.text())),
            area,
        );

        let [main, status] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);
        self.page.render(frame, main, &self.theme);

        let (focus, keybindings) = self.focus();
        self.status_bar
            .render(frame, status, &self.theme, &focus, &keybindings);

        self.project.render(frame, area, &self.theme);
        self.inquiry.render(frame, area, &self.theme);
        if let Some(dialog) = &mut self.error_dialog {
            dialog.render(frame, area, &self.theme);
        }
        self.toasts.render(frame, main, &self.theme);
    }
}
