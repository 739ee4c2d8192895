//! Error Types

use thiserror::Error;

use crate::model::PaymentStatus;
use crate::validate::Field;

/// Result type alias for checkout operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Fallback text when the backend fails without a structured message
pub const DEFAULT_APPLICATION_ERROR: &str = "An error occurred";

/// Text shown for any transport-level failure
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Checkout error taxonomy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Field-scoped input problem, recovered locally
    #[error("Invalid {field}: {message}")]
    Validation { field: Field, message: String },

    /// Transport failure: timeout, refused connection, malformed response
    #[error("Network error: {0}")]
    Network(String),

    /// Backend-reported failure
    #[error("{0}")]
    Application(String),

    /// Return URL is missing identifiers needed to resume
    #[error("Malformed payment return: {0}")]
    MalformedReturn(String),

    /// Attempted to move a payment session backwards or sideways
    #[error("Payment session cannot move from {from} to {to}")]
    InvalidTransition { from: PaymentStatus, to: PaymentStatus },

    /// Browser refused a navigation or history update
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CheckoutError {
    /// Build an application error, falling back to the generic text
    pub fn application(message: Option<String>) -> Self {
        match message {
            Some(m) if !m.trim().is_empty() => Self::Application(m),
            _ => Self::Application(DEFAULT_APPLICATION_ERROR.into()),
        }
    }

    /// Whether the user may sensibly retry. Nothing is retried automatically.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Text surfaced in the error panel
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. } | Self::Application(message) => message.clone(),
            Self::Network(_) => NETWORK_ERROR_MESSAGE.into(),
            Self::Navigation(_) => "Could not open the payment page. Please try again.".into(),
            _ => "An unexpected error occurred. Please try again.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_fallback() {
        assert_eq!(
            CheckoutError::application(None),
            CheckoutError::Application(DEFAULT_APPLICATION_ERROR.into())
        );
        assert_eq!(
            CheckoutError::application(Some("  ".into())).user_message(),
            DEFAULT_APPLICATION_ERROR
        );
        assert_eq!(
            CheckoutError::application(Some("Topic rejected".into())).user_message(),
            "Topic rejected"
        );
    }

    #[test]
    fn test_network_is_generic() {
        let err = CheckoutError::Network("connection refused".into());
        assert!(err.is_retryable());
        assert_eq!(err.user_message(), NETWORK_ERROR_MESSAGE);
    }
}
