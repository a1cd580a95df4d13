pub mod components;
pub mod widgets;

mod error_dialog;
mod status_bar;
mod toast;

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::Frame;
use ratatui::layout::Rect;

pub use color_eyre::Result;

use crate::Theme;

// Re-export components
pub use components::{List, ListEvent, ListRow};

// Re-export widgets
pub use widgets::{Spinner, max_scroll};

// Re-export app-level UI
pub use error_dialog::{ErrorDialog, ErrorDialogEvent};
pub use status_bar::StatusBar;
pub use toast::{Toast, ToastManager, ToastType};

/// Result of handling an input event.
///
/// This enum represents the three possible outcomes of handling an input event:
/// - `Ignored` - The handler didn't recognize or handle this input
/// - `Consumed` - The input was handled but produced no message, the input will not be propagated further
/// - `Event(E)` - The input was handled and produced a message, the input will not be propagated further
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult<E> {
    /// Input was not handled, parent should process it.
    Ignored,
    /// Input was consumed but produced no event.
    Consumed,
    /// Input was consumed and produced an event.
    Event(E),
}

impl<E> EventResult<E> {
    /// Returns true if the input was consumed (either with or without an event).
    pub const fn is_consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

impl<E> From<E> for EventResult<E> {
    fn from(event: E) -> Self {
        Self::Event(event)
    }
}

/// Extension trait for processing `Result<EventResult<T>>` from component handlers.
pub trait EventResultExt<T> {
    /// Process the result into a tuple of (`was_consumed`, `optional_message`).
    ///
    /// Handler errors are logged and count as consumed input.
    fn process(self) -> (bool, Option<T>);
}

impl<T> EventResultExt<T> for Result<EventResult<T>> {
    fn process(self) -> (bool, Option<T>) {
        match self {
            Ok(EventResult::Event(msg)) => (true, Some(msg)),
            Ok(EventResult::Consumed) => (true, None),
            Ok(EventResult::Ignored) => (false, None),
            Err(error) => {
                tracing::error!(error = %format!("{error:#}"), "Input handler failed");
                (true, None)
            }
        }
    }
}

/// A key hint shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybinding {
    pub key: String,
    pub description: String,
}

impl Keybinding {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}

/// Interactive UI building block.
///
/// Components are reusable widgets that handle input events and emit
/// generic outputs. They know nothing about business logic.
pub trait Component {
    /// The output type produced by this component.
    type Output;

    /// Handle a key event.
    ///
    /// Returns `Ok(EventResult::...)` where:
    /// - `Ignored` - key was not handled, parent should process it
    /// - `Consumed` - key was handled but produced no output
    /// - `Event(output)` - key was handled and produced an output
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        _ = key;
        Ok(EventResult::Ignored)
    }

    /// Called on each tick for animations and time-based updates.
    fn handle_tick(&mut self) {}

    /// Render the component to the frame.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
}

/// Ephemeral overlay that blocks the screen below.
///
/// Modals capture all input while open. Pointer presses outside their
/// content panel land on the backdrop.
pub trait Modal {
    /// The message type produced by this modal.
    type Output;

    /// Handle a key event.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>>;

    /// Handle a mouse event.
    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<EventResult<Self::Output>>;

    /// Handle pasted text.
    fn handle_paste(&mut self, text: &str) -> Result<EventResult<Self::Output>> {
        _ = text;
        Ok(EventResult::Consumed)
    }

    /// Called on each tick for animations.
    fn handle_tick(&mut self) {}

    /// Render the modal over `area`. Renders nothing while closed.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Key hints for the status bar.
    fn keybindings(&self) -> Vec<Keybinding> {
        vec![]
    }
}

/// Full-page view that orchestrates components.
///
/// Screens connect UI interactions to the page's intents by translating
/// component events into their own messages.
pub trait Screen {
    /// The message type produced by this screen.
    type Output;

    /// Handle a key event.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>>;

    /// Render the screen to the frame.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Returns the keybindings for this screen.
    fn keybindings(&self) -> Vec<Keybinding> {
        vec![]
    }
}
