//! Domain Model
//!
//! Registration intents, payment sessions and the deployment-wide checkout mode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CheckoutError, Result};

/// Validated email/topic pair, consumed once per submission attempt.
///
/// Serializes to the `{email, topic}` body every backend operation expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationIntent {
    pub email: String,
    pub topic: String,
}

impl RegistrationIntent {
    pub(crate) fn new(email: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            topic: topic.into(),
        }
    }
}

/// Which checkout path a deployment uses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckoutMode {
    /// Register without payment
    #[default]
    DirectRegister,

    /// Create a payment and send the browser to the provider
    RedirectCheckout,

    /// Configure an embedded widget the user triggers separately
    HostedWidgetCheckout,
}

impl CheckoutMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DirectRegister => "direct-register",
            Self::RedirectCheckout => "redirect-checkout",
            Self::HostedWidgetCheckout => "hosted-widget",
        }
    }
}

impl std::fmt::Display for CheckoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CheckoutMode {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "direct" | "direct-register" => Ok(Self::DirectRegister),
            "redirect" | "redirect-checkout" => Ok(Self::RedirectCheckout),
            "hosted" | "hosted-widget" | "hosted-widget-checkout" => Ok(Self::HostedWidgetCheckout),
            other => Err(CheckoutError::Config(format!("unknown checkout mode '{other}'"))),
        }
    }
}

/// Lifecycle of a provider payment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Created,
    AwaitingReturn,
    Verified,
    Cancelled,
    Failed,
}

impl PaymentStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Cancelled | Self::Failed)
    }

    const fn stage(self) -> u8 {
        match self {
            Self::Created => 0,
            Self::AwaitingReturn => 1,
            Self::Verified | Self::Cancelled | Self::Failed => 2,
        }
    }

    /// Only the single next stage is reachable
    pub const fn can_advance_to(self, next: Self) -> bool {
        next.stage() == self.stage() + 1
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::AwaitingReturn => "awaiting_return",
            Self::Verified => "verified",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A payment created with the provider.
///
/// Identifiers are opaque provider strings round-tripped through the browser URL.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Provider payment id; unknown if the provider never disclosed it
    pub provider_payment_id: Option<String>,

    /// Provider payer id, only known after the return redirect
    pub payer_id: Option<String>,

    status: PaymentStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl PaymentSession {
    /// Session for a payment the backend just created
    pub fn created(provider_payment_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            provider_payment_id,
            payer_id: None,
            status: PaymentStatus::Created,
            created_at: now,
            updated_at: now,
        }
    }

    /// Session rebuilt from a return redirect; nothing survives the navigation
    pub fn resumed(provider_payment_id: impl Into<String>, payer_id: impl Into<String>) -> Self {
        let mut session = Self::created(Some(provider_payment_id.into()));
        session.payer_id = Some(payer_id.into());
        session.status = PaymentStatus::AwaitingReturn;
        session
    }

    pub const fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Move forward one stage
    pub fn advance(&mut self, next: PaymentStatus) -> Result<()> {
        if !self.status.can_advance_to(next) {
            return Err(CheckoutError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}
