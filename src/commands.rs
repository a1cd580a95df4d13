//! Async commands pattern for side effects.
//!
//! Commands represent async operations that run outside the main event loop.
//! Modals and the page return commands, and the App spawns them, reporting
//! failures through the error dialog.

mod clipboard;
mod open_link;
mod submit;

use crate::app::AppMessage;
use async_trait::async_trait;
pub use clipboard::CopyToClipboardCmd;
use color_eyre::Result;
pub use open_link::OpenLinkCmd;
pub use submit::SubmitFormCmd;
use tokio::sync::mpsc::UnboundedSender;

/// Async commands that perform side effects.
///
/// Commands are spawned by the App. They report back either to the App via
/// `app_tx` or to the component that issued them through its own channel.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name used in logs.
    fn name(&self) -> String;

    /// Execute the command.
    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()>;
}
