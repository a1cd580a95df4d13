use async_trait::async_trait;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use tokio::sync::mpsc::UnboundedSender;
use url::Url;

use crate::app::AppMessage;
use crate::commands::Command;
use crate::ui::ToastType;

fn is_external(link: &str) -> bool {
    Url::parse(link).is_ok_and(|url| matches!(url.scheme(), "http" | "https" | "mailto"))
}

/// Opens an external link with the system handler.
pub struct OpenLinkCmd {
    url: String,
    label: String,
}

impl OpenLinkCmd {
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
        }
    }
}

#[async_trait]
impl Command for OpenLinkCmd {
    fn name(&self) -> String {
        format!("Opening {}", self.url)
    }

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        if !is_external(&self.url) {
            bail!("'{}' for {} is not an external link", self.url, self.label);
        }
        let url = self.url.clone();
        tokio::task::spawn_blocking(move || open::that(&url))
            .await?
            .wrap_err_with(|| format!("Failed to open {}", self.url))?;
        app_tx.send(AppMessage::ShowToast {
            message: format!("Opened {}", self.label),
            toast_type: ToastType::Info,
        })?;
        Ok(())
    }
}
