//! Return Reconciler
//!
//! Runs once per page load, before any user interaction. Decodes the
//! provider's return redirect and resumes the suspended checkout:
//!
//! | status    | payment id | payer id | action                                   |
//! |-----------|------------|----------|------------------------------------------|
//! | `success` | present    | present  | verify, then Success (locked) or Error   |
//! | `cancel`  | any        | any      | Error with the cancellation message      |
//! | `success` | missing    | any      | log a malformed return, do nothing       |
//! | absent    | any        | any      | nothing                                  |
//!
//! Handled returns are stripped from the visible URL so a refresh does not
//! verify again.

use std::rc::Rc;

use url::Url;

use crate::backend::BackendApi;
use crate::error::CheckoutError;
use crate::model::{PaymentSession, PaymentStatus};
use crate::navigation::{strip_return_params, Navigator, ReturnParams, ReturnStatus};
use crate::selector::settle;
use crate::ui::{Hint, UiState, UiStateDriver};

pub const CANCELLED_MESSAGE: &str =
    "Payment was cancelled. You can try again whenever you're ready.";

pub const VERIFIED_MESSAGE: &str =
    "Payment successful! Your learning plan is on its way to your inbox.";

pub const VERIFICATION_FAILED_MESSAGE: &str =
    "We could not verify your payment. Please contact support if you were charged.";

/// What the reconciler found on this page load
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Ordinary page load
    NoReturn,
    /// `payment=success` without both identifiers
    Malformed,
    Cancelled,
    Verified,
    /// Verification failed; carries the message shown
    Rejected(String),
}

pub struct ReturnReconciler {
    backend: Rc<dyn BackendApi>,
    navigator: Rc<dyn Navigator>,
    ui: Rc<UiStateDriver>,
}

impl ReturnReconciler {
    pub fn new(
        backend: Rc<dyn BackendApi>,
        navigator: Rc<dyn Navigator>,
        ui: Rc<UiStateDriver>,
    ) -> Self {
        Self {
            backend,
            navigator,
            ui,
        }
    }

    pub async fn reconcile(&self) -> ReconcileOutcome {
        let url = match self.current_url() {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot read page location");
                return ReconcileOutcome::NoReturn;
            }
        };

        let params = ReturnParams::from_url(&url);
        let outcome = match params.status {
            None => return ReconcileOutcome::NoReturn,
            Some(ReturnStatus::Cancel) => {
                tracing::info!(payment_id = ?params.payment_id, "Payment cancelled by user");
                self.ui.transition(UiState::Error(CANCELLED_MESSAGE.into()));
                ReconcileOutcome::Cancelled
            }
            Some(ReturnStatus::Success) => match (params.payment_id, params.payer_id) {
                (Some(payment_id), Some(payer_id)) => self.verify(payment_id, payer_id).await,
                (payment_id, payer_id) => {
                    let err = CheckoutError::MalformedReturn(format!(
                        "payment id present: {}, payer id present: {}",
                        payment_id.is_some(),
                        payer_id.is_some()
                    ));
                    tracing::warn!(error = %err, "Not resuming checkout");
                    return ReconcileOutcome::Malformed;
                }
            },
        };

        self.strip(&url);
        outcome
    }

    async fn verify(&self, payment_id: String, payer_id: String) -> ReconcileOutcome {
        let mut session = PaymentSession::resumed(&payment_id, &payer_id);
        tracing::info!(payment_id = %payment_id, "Verifying returned payment");

        self.ui.show_hint(Some(Hint::Processing));
        self.ui.set_in_flight(true);
        self.ui.transition(UiState::AwaitingPaymentReturn);

        let result = self.backend.verify_payment(&payment_id, &payer_id).await;
        self.ui.show_hint(None);

        let outcome = match result {
            Ok(verification) if verification.verified => {
                settle(&mut session, PaymentStatus::Verified);
                self.ui.lock_submission();
                self.ui.set_in_flight(false);
                self.ui.transition(UiState::Success(non_empty_or(
                    verification.message,
                    VERIFIED_MESSAGE,
                )));
                ReconcileOutcome::Verified
            }
            Ok(verification) => {
                settle(&mut session, PaymentStatus::Failed);
                self.reject(non_empty_or(verification.message, VERIFICATION_FAILED_MESSAGE))
            }
            Err(e) => {
                settle(&mut session, PaymentStatus::Failed);
                tracing::warn!(error = %e, payment_id = %payment_id, "Verification request failed");
                self.reject(e.user_message())
            }
        };

        tracing::info!(
            payment_id = %payment_id,
            status = %session.status(),
            "Payment return reconciled"
        );
        outcome
    }

    fn reject(&self, message: String) -> ReconcileOutcome {
        self.ui.set_in_flight(false);
        self.ui.transition(UiState::Error(message.clone()));
        ReconcileOutcome::Rejected(message)
    }

    fn current_url(&self) -> Result<Url, CheckoutError> {
        let href = self.navigator.current_href()?;
        Url::parse(&href).map_err(|e| CheckoutError::MalformedReturn(e.to_string()))
    }

    fn strip(&self, url: &Url) {
        let cleaned = strip_return_params(url);
        if let Err(e) = self.navigator.replace_url(cleaned.as_str()) {
            tracing::warn!(error = %e, "Could not clear payment parameters from the URL");
        }
    }
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Verification;
    use crate::testing::{BackendCall, RecordingNavigator, RecordingPresenter, ScriptedBackend};

    struct Harness {
        backend: Rc<ScriptedBackend>,
        navigator: Rc<RecordingNavigator>,
        presenter: Rc<RecordingPresenter>,
        ui: Rc<UiStateDriver>,
        reconciler: ReturnReconciler,
    }

    fn harness(href: &str) -> Harness {
        let backend = Rc::new(ScriptedBackend::new());
        let navigator = Rc::new(RecordingNavigator::at(href));
        let presenter = Rc::new(RecordingPresenter::default());
        let ui = Rc::new(UiStateDriver::new(presenter.clone()));
        let reconciler = ReturnReconciler::new(backend.clone(), navigator.clone(), ui.clone());
        Harness {
            backend,
            navigator,
            presenter,
            ui,
            reconciler,
        }
    }

    fn verification(verified: bool, message: &str) -> Verification {
        Verification {
            verified,
            message: message.into(),
        }
    }

    #[tokio::test]
    async fn test_verified_return() {
        let h = harness("https://bhaijaanacademy.com/?payment=success&token=p1&PayerID=u1");
        h.backend.push_verify(Ok(verification(true, "Payment verified successfully")));

        let outcome = h.reconciler.reconcile().await;

        assert_eq!(outcome, ReconcileOutcome::Verified);
        assert_eq!(h.ui.state(), UiState::Success("Payment verified successfully".into()));
        assert_eq!(
            h.backend.calls(),
            vec![BackendCall::VerifyPayment {
                payment_id: "p1".into(),
                payer_id: "u1".into()
            }]
        );
        assert_eq!(h.navigator.href(), "https://bhaijaanacademy.com/");
        assert!(h.ui.is_locked());
        assert!(!h.presenter.submit_enabled());
        assert_eq!(h.ui.hint(), None);
    }

    #[tokio::test]
    async fn test_processing_hint_while_verifying() {
        let h = harness("https://a.test/?payment=success&paymentId=p1&payerId=u1");
        let reply = h.backend.gate_verify();

        let reconcile = h.reconciler.reconcile();
        let observe = async {
            assert_eq!(h.ui.hint(), Some(Hint::Processing));
            assert_eq!(h.ui.state(), UiState::AwaitingPaymentReturn);
            assert!(!h.presenter.submit_enabled());
            reply.send(Ok(verification(true, ""))).unwrap();
        };
        let (outcome, ()) = futures::join!(reconcile, observe);

        assert_eq!(outcome, ReconcileOutcome::Verified);
        assert_eq!(h.ui.state(), UiState::Success(VERIFIED_MESSAGE.into()));
    }

    #[tokio::test]
    async fn test_unverified_and_failed_returns() {
        let h = harness("https://a.test/?payment=success&token=p1&PayerID=u1");
        h.backend.push_verify(Ok(verification(false, "Payment execution failed")));
        assert_eq!(
            h.reconciler.reconcile().await,
            ReconcileOutcome::Rejected("Payment execution failed".into())
        );
        assert!(h.presenter.submit_enabled());

        let h = harness("https://a.test/?payment=success&token=p1&PayerID=u1");
        h.backend.push_verify(Err(CheckoutError::Network("timeout".into())));
        let outcome = h.reconciler.reconcile().await;
        assert_eq!(
            outcome,
            ReconcileOutcome::Rejected(CheckoutError::Network(String::new()).user_message())
        );
        assert!(matches!(h.ui.state(), UiState::Error(_)));
        assert_eq!(h.navigator.href(), "https://a.test/");
        assert!(!h.ui.is_locked());
    }

    #[tokio::test]
    async fn test_cancel_ignores_identifiers() {
        for href in [
            "https://a.test/?payment=cancel",
            "https://a.test/?payment=cancel&token=p1&PayerID=u1",
        ] {
            let h = harness(href);
            assert_eq!(h.reconciler.reconcile().await, ReconcileOutcome::Cancelled);
            assert_eq!(h.ui.state(), UiState::Error(CANCELLED_MESSAGE.into()));
            assert!(h.backend.calls().is_empty());
            assert_eq!(h.navigator.replaced(), vec!["https://a.test/".to_string()]);
        }
    }

    #[tokio::test]
    async fn test_malformed_and_plain_loads_do_nothing() {
        for (href, expected) in [
            ("https://a.test/?payment=success&token=p1", ReconcileOutcome::Malformed),
            ("https://a.test/?payment=success&PayerID=u1", ReconcileOutcome::Malformed),
            ("https://a.test/", ReconcileOutcome::NoReturn),
            ("https://a.test/?token=p1&PayerID=u1", ReconcileOutcome::NoReturn),
        ] {
            let h = harness(href);
            assert_eq!(h.reconciler.reconcile().await, expected);
            assert_eq!(h.ui.state(), UiState::Idle);
            assert!(h.backend.calls().is_empty());
            assert!(h.navigator.replaced().is_empty());
            assert!(h.presenter.calls().is_empty());
        }
    }
}
