//! Backend Seam
//!
//! The coordinator talks to the registration/payment backend exclusively
//! through [`BackendApi`]. Every operation is one round trip that resolves to
//! `Ok(payload)` or a [`CheckoutError`] of kind `Network` or `Application`.
//!
//! Futures are `?Send`: the coordinator runs on a single cooperative thread
//! (the browser event loop, or a current-thread runtime natively).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::RegistrationIntent;

/// Acknowledgement of a free registration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitAck {
    pub message: String,
}

/// A redirect payment created with the provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCreated {
    /// Where the browser must go to approve the payment
    pub approval_url: String,

    /// Provider payment id, when the backend or approval URL discloses it
    pub payment_id: Option<String>,
}

/// Outcome of verifying a returned payment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub verified: bool,
    pub message: String,
}

/// Outcome of configuring the hosted payment widget
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedConfiguration {
    pub ready: bool,
    pub message: Option<String>,
}

/// Registration/payment backend operations
#[async_trait(?Send)]
pub trait BackendApi {
    /// `POST /submit`. Callers treat this as best-effort.
    async fn register_direct(&self, intent: RegistrationIntent) -> Result<SubmitAck>;

    /// `POST /create-payment`
    async fn create_payment(&self, intent: RegistrationIntent) -> Result<PaymentCreated>;

    /// `POST /verify-payment`. Idempotent: repeating a successful verification
    /// yields the same outcome.
    async fn verify_payment(&self, payment_id: &str, payer_id: &str) -> Result<Verification>;

    /// `POST /configure-hosted-payment`. The most recent call wins.
    async fn configure_hosted_payment(
        &self,
        intent: RegistrationIntent,
    ) -> Result<HostedConfiguration>;

    /// `GET /` liveness probe
    async fn health_check(&self) -> Result<bool>;
}

/// Opportunistic load-time probe. Logged, never surfaced.
pub async fn probe_backend(backend: &dyn BackendApi) -> bool {
    match backend.health_check().await {
        Ok(true) => {
            tracing::info!("Backend is running");
            true
        }
        Ok(false) => {
            tracing::warn!("Backend health check failed");
            false
        }
        Err(e) => {
            tracing::warn!(error = %e, "Backend not available");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckoutError;
    use crate::testing::ScriptedBackend;

    #[tokio::test]
    async fn test_probe_swallows_failures() {
        let backend = ScriptedBackend::new();
        backend.push_health(Ok(true));
        backend.push_health(Ok(false));
        backend.push_health(Err(CheckoutError::Network("refused".into())));

        assert!(probe_backend(&backend).await);
        assert!(!probe_backend(&backend).await);
        assert!(!probe_backend(&backend).await);
    }
}
