use arboard::Clipboard;
use async_trait::async_trait;

use crate::app::AppMessage;
use crate::commands::Command;
use crate::ui::ToastType;

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use tokio::sync::mpsc::UnboundedSender;

/// Puts a link on the system clipboard and confirms with a toast.
pub struct CopyToClipboardCmd {
    text: String,
    label: String,
}

impl CopyToClipboardCmd {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

#[async_trait]
impl Command for CopyToClipboardCmd {
    fn name(&self) -> String {
        format!("Copying {}", self.label)
    }

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let mut clipboard = Clipboard::new().wrap_err("Clipboard is not available")?;
        clipboard
            .set_text(self.text)
            .wrap_err_with(|| format!("Failed to copy {}", self.label))?;
        app_tx.send(AppMessage::ShowToast {
            message: format!("Copied {}", self.label),
            toast_type: ToastType::Success,
        })?;
        Ok(())
    }
}
