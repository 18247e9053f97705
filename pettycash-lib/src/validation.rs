use serde::Serialize;
use std::collections::BTreeMap;

/// Messages for each request field that failed validation.
#[derive(Serialize, Clone, PartialEq, Eq, Debug, Default)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> ValidationErrors {
        ValidationErrors::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// `Ok(value)` when nothing was reported.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Summary line such as `The amount must be at least 0.01. (and 2 more errors)`.
    pub fn message(&self) -> String {
        let Some(first) = self.fields.values().flatten().next() else {
            return "The given data was invalid.".to_owned();
        };
        match self.len() - 1 {
            0 => first.clone(),
            1 => format!("{} (and 1 more error)", first),
            n => format!("{} (and {} more errors)", first, n),
        }
    }
}
