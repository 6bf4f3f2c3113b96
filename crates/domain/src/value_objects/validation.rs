use std::{collections::BTreeMap, str::FromStr};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::value_objects::money::to_minor;

/// Per-field messages for a rejected form, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Keeps the first message reported for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Parses a non-negative peso amount into minor units, recording a field error otherwise.
pub fn parse_amount(field: &str, raw: &str, errors: &mut FieldErrors) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add(field, "amount is required");
        return None;
    }

    let amount = match Decimal::from_str(raw) {
        Ok(amount) => amount,
        Err(_) => {
            errors.add(field, "amount must be a number");
            return None;
        }
    };

    if amount.is_sign_negative() && !amount.is_zero() {
        errors.add(field, "amount cannot be negative");
        return None;
    }

    match to_minor(amount) {
        Some(amount_minor) => Some(amount_minor),
        None => {
            errors.add(field, "amount is out of range");
            None
        }
    }
}

/// Trims optional free text; blank becomes `None`. Over-long text is a field error.
pub fn optional_text(
    field: &str,
    raw: Option<&str>,
    max_len: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = raw.map(str::trim).filter(|value| !value.is_empty())?;
    if value.chars().count() > max_len {
        errors.add(field, format!("must be at most {max_len} characters"));
        return None;
    }
    Some(value.to_string())
}

/// Required free text, trimmed.
pub fn required_text(
    field: &str,
    raw: &str,
    max_len: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, "is required");
        return None;
    }
    if value.chars().count() > max_len {
        errors.add(field, format!("must be at most {max_len} characters"));
        return None;
    }
    Some(value.to_string())
}
