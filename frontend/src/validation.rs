//! Required/email checks over a declared list of form fields.
//!
//! The rules are pure; [`validate_fields`] applies them through a
//! [`FormView`] so the same code annotates the live DOM and the test fakes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::forms::{FormStatus, FormView};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const FIX_FIELDS_MESSAGE: &str = "Please fix the highlighted fields.";

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Plain,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub id: String,
    pub required: bool,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn required(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            required: true,
            kind: FieldKind::Plain,
        }
    }

    pub fn email(mut self) -> Self {
        self.kind = FieldKind::Email;
        self
    }

    #[cfg(test)]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    InvalidEmail,
}

impl FieldError {
    pub fn message(self) -> &'static str {
        match self {
            FieldError::Required => REQUIRED_MESSAGE,
            FieldError::InvalidEmail => EMAIL_MESSAGE,
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Strips the same characters as `String.prototype.trim`, which also
/// treats a byte-order mark as whitespace.
fn trim_input(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

/// Applies the rules to one raw input value. Surrounding whitespace is
/// ignored.
pub fn check(descriptor: &FieldDescriptor, raw: &str) -> Option<FieldError> {
    let value = trim_input(raw);
    if descriptor.required && value.is_empty() {
        return Some(FieldError::Required);
    }
    if descriptor.kind == FieldKind::Email && !value.is_empty() && !is_valid_email(value) {
        return Some(FieldError::InvalidEmail);
    }
    None
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// One entry per field that was found, in declaration order.
    pub fields: Vec<(String, Option<FieldError>)>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|(_, error)| error.is_none())
    }
}

/// Validates `fields` inside `view`, marks each field, and renders the
/// aggregate status. Fields missing from the form are skipped.
pub fn validate_fields<V: FormView + ?Sized>(
    view: &mut V,
    fields: &[FieldDescriptor],
) -> ValidationReport {
    view.set_status(&FormStatus::Cleared);

    let mut report = ValidationReport::default();
    for descriptor in fields {
        let Some(value) = view.field_value(&descriptor.id) else {
            continue;
        };
        let error = check(descriptor, &value);
        view.mark_field(&descriptor.id, error.map(FieldError::message));
        report.fields.push((descriptor.id.clone(), error));
    }

    if !report.is_valid() {
        view.set_status(&FormStatus::Error(FIX_FIELDS_MESSAGE.to_string()));
    }
    report
}
