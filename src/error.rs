use std::fmt;

use thiserror::Error;

/// Rejected filter input. Unknown values are refused up front rather than
/// silently matching nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterParseError {
    #[error("unknown department `{0}`")]
    UnknownDepartment(String),
    #[error("unknown status `{0}` (expected active, inactive or on-leave)")]
    UnknownStatus(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldErrorKind {
    #[error("is required")]
    Missing,
    #[error("is not a valid email address")]
    MalformedEmail,
    #[error("is not a known department")]
    UnknownDepartment,
    #[error("is not a known status")]
    UnknownStatus,
    #[error("is not a valid date (expected YYYY-MM-DD)")]
    MalformedDate,
    #[error("is not a teacher field")]
    UnknownField,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {kind}")]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
}

/// Every field-level failure from one form submission, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &str, kind: FieldErrorKind) {
        self.errors.push(FieldError {
            field: field.to_string(),
            kind,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "validation failed: {}", messages.join("; "))
    }
}
