//! Modal lifecycle shared by every overlay.
//!
//! A modal is owned by its parent, which drives it through [`ModalHandle`].
//! [`ModalController`] holds the state every variant has in common:
//! visibility, the payload handed to `open`, the close notification and the
//! panel rectangle used to tell backdrop presses from content presses.
//!
//! Each `open` and each `close` starts a new session. Asynchronous work
//! started in one session carries its session number back, so a result that
//! arrives after the modal was closed (or closed and reopened) is dropped
//! instead of leaking into the next session.

pub mod form;
pub mod project;

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};

pub use form::{FormModal, FormOutput, SubmissionStatus};
pub use project::{ProjectModal, ProjectOutput, ProjectPayload};

/// Imperative handle a parent uses to show and hide a modal.
pub trait ModalHandle {
    /// Data handed over when opening. `()` for modals without a payload.
    type Payload;

    /// Make the modal visible, starting from a clean state.
    fn open(&mut self, payload: Self::Payload);

    /// Hide the modal, drop all transient state and notify the parent.
    fn close(&mut self);

    fn is_open(&self) -> bool;
}

/// Called after every close, whatever caused it.
pub type CloseNotifier = Box<dyn FnMut() + Send>;

/// Where a pointer press landed relative to an open modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// Outside the content panel.
    Backdrop,
    /// Inside the content panel.
    Content,
    /// Not a primary press, the modal is closed, or it has not been laid out yet.
    Miss,
}

pub struct ModalController<P> {
    visible: bool,
    payload: Option<P>,
    session: u64,
    panel: Option<Rect>,
    on_close: Option<CloseNotifier>,
}

impl<P> Default for ModalController<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ModalController<P> {
    pub const fn new() -> Self {
        Self {
            visible: false,
            payload: None,
            session: 0,
            panel: None,
            on_close: None,
        }
    }

    #[must_use]
    pub fn with_on_close(mut self, notifier: impl FnMut() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(notifier));
        self
    }

    pub const fn is_open(&self) -> bool {
        self.visible
    }

    pub const fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub const fn session(&self) -> u64 {
        self.session
    }

    #[cfg(test)]
    pub const fn panel(&self) -> Option<Rect> {
        self.panel
    }

    pub fn show(&mut self, payload: Option<P>) {
        self.visible = true;
        self.payload = payload;
        self.panel = None;
        self.session = self.session.wrapping_add(1);
    }

    /// Hide and hand back the payload. The close notification always fires.
    pub fn hide(&mut self) -> Option<P> {
        self.visible = false;
        self.panel = None;
        self.session = self.session.wrapping_add(1);
        let payload = self.payload.take();
        if let Some(notify) = self.on_close.as_mut() {
            notify();
        }
        payload
    }

    /// Record where the content panel was drawn this frame.
    pub const fn set_panel(&mut self, panel: Rect) {
        self.panel = Some(panel);
    }

    pub fn hit(&self, mouse: &MouseEvent) -> Hit {
        if !self.visible || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Hit::Miss;
        }
        match self.panel {
            Some(panel) if panel.contains(Position::new(mouse.column, mouse.row)) => Hit::Content,
            Some(_) => Hit::Backdrop,
            None => Hit::Miss,
        }
    }
}

/// Dim everything already drawn under the modal.
pub fn render_backdrop(frame: &mut Frame, area: Rect) {
    frame
        .buffer_mut()
        .set_style(area, Style::default().add_modifier(Modifier::DIM));
}
