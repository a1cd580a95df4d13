//! Portfolio content: the speaker, talks, projects, events and the inquiry form.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use serde::{Deserialize, Serialize};

use crate::modal::ProjectPayload;
use crate::modal::form::FormDefinition;

const BUILTIN: &str = include_str!("../assets/content.toml");
const EVENT_DATE_FORMAT: &str = "%b %d, %Y";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Speaker {
    pub name: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub chips: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub icon: String,
    pub title: String,
    pub blurb: String,
    #[serde(default)]
    pub formats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Format {
    pub title: String,
    pub desc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    /// Written like "Nov 22, 2025".
    pub date: String,
    pub location: String,
    #[serde(default)]
    pub link: Option<String>,
}

impl Event {
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), EVENT_DATE_FORMAT).ok()
    }

    /// Events on `today` still count as upcoming. Undated events are assumed upcoming.
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.date().is_none_or(|date| date >= today)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    pub quote: String,
    pub by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub speaker: Speaker,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub formats: Vec<Format>,
    #[serde(default)]
    pub projects: Vec<ProjectPayload>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
    pub inquiry: FormDefinition,
}

impl Content {
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN).wrap_err("Built-in content is invalid")
    }

    pub fn parse(source: &str) -> Result<Self> {
        let content: Self = toml::from_str(source)?;
        content.validate()?;
        Ok(content)
    }

    fn validate(&self) -> Result<()> {
        if self.speaker.name.trim().is_empty() {
            bail!("Speaker name must not be empty");
        }
        self.inquiry.validate()?;
        for event in &self.events {
            if event.date().is_none() {
                tracing::warn!(event = %event.title, date = %event.date, "Unrecognised event date");
            }
        }
        Ok(())
    }
}

/// Content plus the directory that image paths are resolved against.
pub struct LoadedContent {
    pub content: Content,
    pub asset_root: PathBuf,
}

/// Load content from `path`, or the built-in content when no path is given.
pub fn load(path: Option<&Path>) -> Result<LoadedContent> {
    let Some(path) = path else {
        tracing::debug!("Using built-in content");
        return Ok(LoadedContent {
            content: Content::builtin()?,
            asset_root: PathBuf::from("."),
        });
    };

    let source = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read content from {}", path.display()))?;
    let content = Content::parse(&source)
        .wrap_err_with(|| format!("Failed to parse content from {}", path.display()))?;
    tracing::debug!(path = %path.display(), projects = content.projects.len(), "Loaded content");

    Ok(LoadedContent {
        content,
        asset_root: path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::form::InputKind;

    #[test]
    fn test_builtin_content_is_valid() {
        let content = Content::builtin().unwrap();
        assert_eq!(content.speaker.name, "Artea Wright");
        assert_eq!(content.projects.len(), 2);
        assert_eq!(content.inquiry.button_text, "✉️ Send Inquiry");

        let kinds: Vec<_> = content.inquiry.fields.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            [InputKind::Text, InputKind::Email, InputKind::Text, InputKind::Multiline]
        );
        assert!(content.inquiry.fields[0].required);
        assert!(!content.inquiry.fields[3].required);
    }

    #[test]
    fn test_event_dates() {
        let event = Event {
            title: "R.O.O.T.S".to_string(),
            date: "Nov 22, 2025".to_string(),
            location: "Charlotte, NC".to_string(),
            link: None,
        };
        let date = NaiveDate::from_ymd_opt(2025, 11, 22).unwrap();
        assert_eq!(event.date(), Some(date));
        assert!(event.is_upcoming(date));
        assert!(event.is_upcoming(NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()));
        assert!(!event.is_upcoming(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));

        let undated = Event {
            date: "TBA".to_string(),
            ..event
        };
        assert!(undated.is_upcoming(date));
    }

    #[test]
    fn test_load_resolves_assets_next_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.toml");
        std::fs::write(&path, BUILTIN).unwrap();

        let loaded = load(Some(&path)).unwrap();
        assert_eq!(loaded.asset_root, dir.path());
        assert_eq!(loaded.content.testimonials.len(), 3);
    }

    #[test]
    fn test_duplicate_field_names_are_rejected() {
        let source = r#"
            [speaker]
            name = "Someone"

            [inquiry]
            title = "Contact"

            [[inquiry.fields]]
            name = "email"
            label = "Email"

            [[inquiry.fields]]
            name = "email"
            label = "Email again"
        "#;
        assert!(Content::parse(source).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load(Some(Path::new("/definitely/not/here.toml"))).is_err());
    }
}
