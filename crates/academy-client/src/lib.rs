//! # academy-client
//!
//! HTTP implementation of the academy backend contract.
//!
//! ## Endpoints
//!
//! - `POST /submit` direct registration
//! - `POST /create-payment` redirect checkout, returns `approval_url`
//! - `POST /verify-payment` `{payment_id, payer_id}`
//! - `POST /configure-hosted-payment` hosted widget checkout
//! - `GET /` health check
//!
//! ## Usage
//!
//! ```rust,ignore
//! use academy_client::HttpBackend;
//!
//! let backend = Rc::new(HttpBackend::from_config(&config)?);
//! let coordinator = CheckoutCoordinator::new(&config, backend, navigator, presenter);
//! coordinator.on_page_load().await;
//! ```

pub mod http;

pub use http::HttpBackend;

// Re-export core types for convenience
pub use academy_core::{BackendApi, CheckoutConfig, CheckoutError, Result};
