use std::collections::HashSet;

use color_eyre::Result;
use color_eyre::eyre::bail;
use serde::{Deserialize, Serialize};
use url::Url;

/// What sort of input a field takes. Decides rendering and format checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Email,
    #[serde(alias = "textarea")]
    Multiline,
    #[serde(alias = "tel")]
    Phone,
    Url,
}

impl InputKind {
    pub const fn is_multiline(self) -> bool {
        matches!(self, Self::Multiline)
    }

    /// Rows the input occupies, borders included.
    pub const fn height(self) -> u16 {
        if self.is_multiline() { 6 } else { 3 }
    }
}

/// Why a value cannot be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    Missing,
    Malformed,
}

/// Static description of one form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default, rename = "type")]
    pub kind: InputKind,
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            placeholder: String::new(),
            kind,
            required: false,
        }
    }

    #[must_use]
    #[cfg(test)]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Structural check run before a submission may start.
    ///
    /// Whitespace-only counts as empty. Format checks only apply to
    /// non-empty values, so optional fields may stay blank.
    pub fn check(&self, value: &str) -> Result<(), Violation> {
        let value = value.trim();
        if value.is_empty() {
            return if self.required {
                Err(Violation::Missing)
            } else {
                Ok(())
            };
        }

        let well_formed = match self.kind {
            InputKind::Email => is_email(value),
            InputKind::Url => is_url(value),
            InputKind::Text | InputKind::Multiline | InputKind::Phone => true,
        };
        if well_formed { Ok(()) } else { Err(Violation::Malformed) }
    }

    pub const fn hint(&self, violation: Violation) -> &'static str {
        match (violation, self.kind) {
            (Violation::Missing, _) => "Please fill out this field",
            (Violation::Malformed, InputKind::Email) => "Please enter an email address",
            (Violation::Malformed, InputKind::Url) => "Please enter a URL",
            (Violation::Malformed, _) => "Please match the requested format",
        }
    }
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn is_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| url.host_str().is_some() || url.cannot_be_a_base())
}

fn default_button_text() -> String {
    "Submit".to_string()
}

/// Everything a form modal needs to know about its form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default = "default_button_text")]
    pub button_text: String,
    /// Render order.
    pub fields: Vec<FieldSpec>,
}

impl FormDefinition {
    pub fn new(title: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            button_text: default_button_text(),
            fields,
        }
    }

    /// Field names must be present and unique; they key the form values.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                bail!("Form '{}' has a field without a name", self.title);
            }
            if !seen.insert(field.name.as_str()) {
                bail!("Form '{}' declares field '{}' twice", self.title, field.name);
            }
        }
        Ok(())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}
