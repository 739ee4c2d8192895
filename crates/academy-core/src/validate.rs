//! Input Validation
//!
//! Pure predicates over raw form input. No side effects, no I/O.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CheckoutError;
use crate::model::RegistrationIntent;

/// Minimum topic length after trimming
pub const MIN_TOPIC_LEN: usize = 3;

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Form field identifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Email,
    Topic,
}

impl Field {
    pub const ALL: [Self; 2] = [Self::Email, Self::Topic];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Topic => "topic",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level annotation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl FieldError {
    const fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl From<FieldError> for CheckoutError {
    fn from(err: FieldError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message.into(),
        }
    }
}

/// `local@domain.tld` with no embedded whitespace
pub fn validate_email(s: &str) -> bool {
    EMAIL_SHAPE.is_match(s)
}

/// At least three characters once trimmed
pub fn validate_topic(s: &str) -> bool {
    s.trim().chars().count() >= MIN_TOPIC_LEN
}

/// Check one field, returning the annotation to show if it fails.
///
/// Empty input is reported as missing rather than malformed.
pub fn check_field(field: Field, raw: &str) -> Option<FieldError> {
    let value = raw.trim();
    match field {
        Field::Email if value.is_empty() => Some(FieldError::new(field, "Email is required")),
        Field::Email if !validate_email(value) => {
            Some(FieldError::new(field, "Please enter a valid email address"))
        }
        Field::Topic if value.is_empty() => Some(FieldError::new(field, "Topic is required")),
        Field::Topic if !validate_topic(value) => Some(FieldError::new(
            field,
            "Topic must be at least 3 characters long",
        )),
        _ => None,
    }
}

/// Validate the whole form and build the intent from trimmed values
pub fn validate_form(email: &str, topic: &str) -> Result<RegistrationIntent, Vec<FieldError>> {
    let errors: Vec<FieldError> = [(Field::Email, email), (Field::Topic, topic)]
        .into_iter()
        .filter_map(|(field, raw)| check_field(field, raw))
        .collect();

    if errors.is_empty() {
        Ok(RegistrationIntent::new(email.trim(), topic.trim()))
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(validate_email("a@b.c"));
        assert!(validate_email("learner@academy.example.com"));

        for bad in ["", "ab.c", "a@bc", "a@b.", "a@.c", "@b.c", "a b@c.d", "a@b c.d", "a@@b.c"] {
            assert!(!validate_email(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_topic_length() {
        assert!(validate_topic("abc"));
        assert!(validate_topic("  rust  "));
        assert!(!validate_topic("ab"));
        assert!(!validate_topic("   ab   "));
        assert!(!validate_topic(""));
    }

    #[test]
    fn test_validate_form_trims() {
        let intent = validate_form("  a@b.c ", " Quantum computing ").unwrap();
        assert_eq!(intent.email, "a@b.c");
        assert_eq!(intent.topic, "Quantum computing");
    }

    #[test]
    fn test_validate_form_reports_each_field() {
        let errors = validate_form("", "ab").unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::new(Field::Email, "Email is required"),
                FieldError::new(Field::Topic, "Topic must be at least 3 characters long"),
            ]
        );

        let errors = validate_form("not-an-email", "").unwrap_err();
        assert_eq!(errors[0].message, "Please enter a valid email address");
        assert_eq!(errors[1].message, "Topic is required");
    }
}
