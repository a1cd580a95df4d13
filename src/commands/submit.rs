use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::AppMessage;
use crate::commands::Command;
use crate::modal::form::{FormMsg, FormValues};
use crate::submit::SubmitHandler;

/// Runs a form's submit handler and reports the outcome to that form.
///
/// A failed submission is not a failed command: the form decides what a
/// rejection means, so the result always goes back over `form_tx`.
pub struct SubmitFormCmd {
    handler: Arc<dyn SubmitHandler>,
    values: FormValues,
    session: u64,
    form_tx: UnboundedSender<FormMsg>,
}

impl SubmitFormCmd {
    pub fn new(
        handler: Arc<dyn SubmitHandler>,
        values: FormValues,
        session: u64,
        form_tx: UnboundedSender<FormMsg>,
    ) -> Self {
        Self {
            handler,
            values,
            session,
            form_tx,
        }
    }
}

#[async_trait]
impl Command for SubmitFormCmd {
    fn name(&self) -> String {
        format!("Submitting {} field(s)", self.values.len())
    }

    async fn execute(self: Box<Self>, _app_tx: UnboundedSender<AppMessage>) -> Result<()> {
        let result = self.handler.submit(self.values).await;
        // The form may already be gone; nobody is left to tell.
        let _ = self.form_tx.send(FormMsg::SubmitFinished {
            session: self.session,
            result,
        });
        Ok(())
    }
}
