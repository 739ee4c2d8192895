//! HTTP Backend
//!
//! Implementation of `BackendApi` over the academy REST contract.
//!
//! Error mapping:
//! - transport failure, timeout, unreadable success body → `Network`
//! - non-2xx or `success: false` with `message`/`detail` → `Application(message)`
//! - non-2xx without a structured message → `Application("An error occurred")`

use std::cell::RefCell;
use std::collections::HashMap;

use academy_core::{
    error::{CheckoutError, Result},
    navigation::{first_param, PAYMENT_ID_ALIASES},
    BackendApi, CheckoutConfig, HostedConfiguration, PaymentCreated, RegistrationIntent,
    SubmitAck, Verification,
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Fallback acknowledgement when `/submit` returns no message
const SUBMIT_ACCEPTED: &str = "Submission received";

/// Fallback verification text
const VERIFY_FALLBACK: &str = "Payment could not be verified";

#[derive(Serialize)]
struct VerifyRequest<'a> {
    payment_id: &'a str,
    payer_id: &'a str,
}

/// Academy backend over HTTP
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    /// Successful verifications, keyed by (payment id, payer id)
    verified: RefCell<HashMap<(String, String), Verification>>,
}

impl HttpBackend {
    /// Create a client for `base_url` with default settings
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let config = CheckoutConfig {
            api_base_url: base_url.into(),
            ..CheckoutConfig::default()
        };
        Self::from_config(&config)
    }

    /// Create from configuration
    pub fn from_config(config: &CheckoutConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.request_timeout_secs)?,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            verified: RefCell::new(HashMap::new()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST a JSON body and return the decoded success body
    async fn post(&self, path: &str, body: &impl Serialize) -> Result<Value> {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| network(path, &e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| network(path, &e))?;
        let data: Option<Value> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            tracing::warn!(%status, path, "Backend rejected request");
            return Err(CheckoutError::application(
                data.as_ref().and_then(structured_message),
            ));
        }

        data.ok_or_else(|| CheckoutError::Network(format!("malformed response from {path}")))
    }

    fn cached_verification(&self, key: &(String, String)) -> Option<Verification> {
        self.verified.borrow().get(key).cloned()
    }
}

#[async_trait(?Send)]
impl BackendApi for HttpBackend {
    async fn register_direct(&self, intent: RegistrationIntent) -> Result<SubmitAck> {
        let data = self.post("submit", &intent).await?;
        reject_unsuccessful(&data)?;

        Ok(SubmitAck {
            message: structured_message(&data).unwrap_or_else(|| SUBMIT_ACCEPTED.into()),
        })
    }

    async fn create_payment(&self, intent: RegistrationIntent) -> Result<PaymentCreated> {
        let data = self.post("create-payment", &intent).await?;
        reject_unsuccessful(&data)?;

        let approval_url = data["approval_url"]
            .as_str()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| CheckoutError::Network("create-payment returned no approval_url".into()))?
            .to_string();

        let payment_id = data["payment_id"]
            .as_str()
            .map(str::to_string)
            .or_else(|| payment_id_from_approval_url(&approval_url));

        tracing::debug!(payment_id = ?payment_id, "Payment created");
        Ok(PaymentCreated {
            approval_url,
            payment_id,
        })
    }

    async fn verify_payment(&self, payment_id: &str, payer_id: &str) -> Result<Verification> {
        let key = (payment_id.to_string(), payer_id.to_string());
        if let Some(previous) = self.cached_verification(&key) {
            tracing::debug!(payment_id, "Payment already verified");
            return Ok(previous);
        }

        let data = self
            .post("verify-payment", &VerifyRequest { payment_id, payer_id })
            .await?;

        // Confirmed payments keep an empty message when the backend sends none
        let verified = data["success"].as_bool().unwrap_or(false);
        let message = structured_message(&data);
        let verification = Verification {
            verified,
            message: if verified {
                message.unwrap_or_default()
            } else {
                message.unwrap_or_else(|| VERIFY_FALLBACK.into())
            },
        };

        if verification.verified {
            self.verified.borrow_mut().insert(key, verification.clone());
        }

        Ok(verification)
    }

    async fn configure_hosted_payment(
        &self,
        intent: RegistrationIntent,
    ) -> Result<HostedConfiguration> {
        let data = self.post("configure-hosted-payment", &intent).await?;

        Ok(HostedConfiguration {
            ready: data["success"].as_bool().unwrap_or(false),
            message: structured_message(&data),
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.endpoint("/"))
            .send()
            .await
            .map_err(|e| network("/", &e))?;

        Ok(response.status().is_success())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| CheckoutError::Config(e.to_string()))
}

// The browser fetch API owns timeouts on wasm32.
#[cfg(target_arch = "wasm32")]
fn build_client(_timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .build()
        .map_err(|e| CheckoutError::Config(e.to_string()))
}

fn network(path: &str, err: &reqwest::Error) -> CheckoutError {
    tracing::warn!(path, error = %err, "Backend unreachable");
    CheckoutError::Network(err.to_string())
}

/// `message`, or a FastAPI-style string `detail`
fn structured_message(data: &Value) -> Option<String> {
    data["message"]
        .as_str()
        .or_else(|| data["detail"].as_str())
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

/// A 2xx body can still carry `success: false`
fn reject_unsuccessful(data: &Value) -> Result<()> {
    if data["success"].as_bool() == Some(false) {
        return Err(CheckoutError::application(structured_message(data)));
    }
    Ok(())
}

fn payment_id_from_approval_url(approval_url: &str) -> Option<String> {
    let url = Url::parse(approval_url).ok()?;
    first_param(&url, &PAYMENT_ID_ALIASES)
}
