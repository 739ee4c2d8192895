//! # academy-core
//!
//! Checkout-state coordinator for the Bhai Jaan Academy sign-up page.
//!
//! ## Architecture
//!
//! ```text
//! input ─▶ validate ─▶ CheckoutSelector ─▶ BackendApi ─▶ UI update | leave page
//!                                                            │
//! next page load ─▶ ReturnReconciler ─▶ BackendApi ──────────┴─▶ UiStateDriver ─▶ Presenter
//! ```
//!
//! Three seams keep the coordinator free of browser and HTTP details:
//! [`BackendApi`] (registration/payment backend), [`Navigator`] (page location)
//! and [`Presenter`] (DOM or terminal rendering). Everything runs on one
//! cooperative thread, so shared pieces are `Rc` and futures are `?Send`.

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod navigation;
pub mod reconcile;
pub mod selector;
pub mod ui;
pub mod validate;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use backend::{
    probe_backend, BackendApi, HostedConfiguration, PaymentCreated, SubmitAck, Verification,
};
pub use config::CheckoutConfig;
pub use coordinator::CheckoutCoordinator;
pub use error::{CheckoutError, Result};
pub use model::{CheckoutMode, PaymentSession, PaymentStatus, RegistrationIntent};
pub use navigation::{Navigator, ReturnParams, ReturnStatus};
pub use reconcile::{ReconcileOutcome, ReturnReconciler};
pub use selector::{CheckoutSelector, SelectorState, SubmitOutcome};
pub use ui::{Hint, Panel, Presenter, UiState, UiStateDriver};
pub use validate::{validate_email, validate_form, validate_topic, Field, FieldError};
