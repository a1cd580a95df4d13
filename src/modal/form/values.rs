use std::collections::BTreeMap;
use std::sync::Arc;

use color_eyre::Result;
use color_eyre::eyre::bail;
use serde::{Serialize, Serializer};

use super::field::FieldSpec;

/// Current text of each edited field, keyed by field name.
///
/// Only names declared by the form can be stored. Fields that were never
/// touched have no entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    declared: Arc<[String]>,
    values: BTreeMap<String, String>,
}

impl FormValues {
    pub fn new(fields: &[FieldSpec]) -> Self {
        Self {
            declared: fields.iter().map(|f| f.name.clone()).collect(),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// The field's text, empty when untouched.
    pub fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        if !self.declared.iter().any(|declared| declared == name) {
            bail!("Unknown form field '{name}'");
        }
        self.values.insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl Serialize for FormValues {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.values.serialize(serializer)
    }
}
