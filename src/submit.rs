//! Where submitted inquiries go.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::modal::form::FormValues;

/// Receives a snapshot of the form values once validation has passed.
///
/// Resolving moves the form to its success state. An error puts the form back
/// to idle with the values untouched.
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    async fn submit(&self, values: FormValues) -> Result<()>;
}

/// Writes each inquiry to the diagnostic log and nothing else.
pub struct LogSubmitHandler {
    form: String,
}

impl LogSubmitHandler {
    pub fn new(form: impl Into<String>) -> Self {
        Self { form: form.into() }
    }
}

#[async_trait]
impl SubmitHandler for LogSubmitHandler {
    async fn submit(&self, values: FormValues) -> Result<()> {
        let payload = serde_json::to_string(&values)?;
        tracing::info!(form = %self.form, values = %payload, "Inquiry submitted");
        Ok(())
    }
}

#[derive(Serialize)]
struct OutboxEntry<'a> {
    received_at: DateTime<Utc>,
    form: &'a str,
    values: &'a FormValues,
}

/// Appends each inquiry as one JSON line to a file.
pub struct OutboxSubmitHandler {
    form: String,
    path: PathBuf,
}

impl OutboxSubmitHandler {
    pub fn new(form: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            form: form.into(),
            path: path.into(),
        }
    }
}

#[async_trait]
impl SubmitHandler for OutboxSubmitHandler {
    async fn submit(&self, values: FormValues) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }

        let entry = OutboxEntry {
            received_at: Utc::now(),
            form: &self.form,
            values: &values,
        };
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .wrap_err_with(|| format!("Failed to open outbox {}", self.path.display()))?;
        file.write_all(&line).await?;
        file.flush().await?;

        tracing::info!(form = %self.form, outbox = %self.path.display(), "Inquiry stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::form::{FieldSpec, InputKind};

    fn values(email: &str) -> FormValues {
        let mut values = FormValues::new(&[
            FieldSpec::new("name", "Name", InputKind::Text),
            FieldSpec::new("email", "Email", InputKind::Email),
        ]);
        values.set("email", email).unwrap();
        values
    }

    #[tokio::test]
    async fn test_outbox_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("outbox.jsonl");
        let handler = OutboxSubmitHandler::new("Book a talk", &path);

        handler.submit(values("a@b.com")).await.unwrap();
        handler.submit(values("c@d.org")).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["form"], "Book a talk");
        assert_eq!(lines[0]["values"], serde_json::json!({ "email": "a@b.com" }));
        assert_eq!(lines[1]["values"]["email"], "c@d.org");
        assert!(lines[1]["received_at"].is_string());
    }

    #[tokio::test]
    async fn test_outbox_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let handler = OutboxSubmitHandler::new("Book a talk", dir.path());
        assert!(handler.submit(values("a@b.com")).await.is_err());
    }

    #[tokio::test]
    async fn test_log_handler_accepts_everything() {
        let handler = LogSubmitHandler::new("Book a talk");
        assert!(handler.submit(values("a@b.com")).await.is_ok());
    }
}
