//! Checkout Strategy Selector
//!
//! Decides, per submission, which checkout path runs:
//!
//! ```text
//!                         ┌──────────────────────────┐
//!   submit ──▶ validate ─▶│ DirectRegister           │─▶ optimistic Success, POST /submit (logged)
//!                         │ RedirectCheckout         │─▶ POST /create-payment ─▶ leave page
//!                         │ HostedWidgetCheckout     │─▶ POST /configure-hosted-payment (latest wins)
//!                         └──────────────────────────┘
//! ```
//!
//! The mode is fixed per deployment, but every path sits behind the same
//! `submit` entry point so swapping it is a configuration change.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::backend::BackendApi;
use crate::error::CheckoutError;
use crate::model::{CheckoutMode, PaymentSession, PaymentStatus, RegistrationIntent};
use crate::navigation::Navigator;
use crate::ui::{Hint, UiState, UiStateDriver};
use crate::validate::{check_field, validate_email, validate_form, validate_topic, Field, FieldError};

/// Shown as soon as a free registration is submitted
pub const OPTIMISTIC_SUCCESS_MESSAGE: &str =
    "Thank you! Your personalised learning plan is being prepared and will arrive in your inbox shortly.";

/// Shown when the hosted widget cannot be prepared and the backend gave no reason
pub const HOSTED_NOT_READY_MESSAGE: &str =
    "Payment could not be prepared. Please check your details and try again.";

/// Selector lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorState {
    CollectingInput,
    Submitting,
    /// The browser is on its way to the provider
    AwaitingExternalAction,
}

/// What a call to [`CheckoutSelector::submit`] did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; fields were annotated and nothing was sent
    Invalid(Vec<FieldError>),
    /// A submission is outstanding or the page is locked after payment
    Busy,
    /// Optimistic success shown; the backend outcome was only logged
    Registered,
    /// The browser was sent to the provider approval page
    Redirected { approval_url: String },
    /// Hosted widget configuration was requested
    Configured,
    /// The backend or the browser refused; an error panel is showing
    Failed(CheckoutError),
}

pub struct CheckoutSelector {
    mode: CheckoutMode,
    backend: Rc<dyn BackendApi>,
    navigator: Rc<dyn Navigator>,
    ui: Rc<UiStateDriver>,
    state: Cell<SelectorState>,
    /// Bumped on every hosted-mode input snapshot
    snapshot_seq: Cell<u64>,
    session: RefCell<Option<PaymentSession>>,
}

impl CheckoutSelector {
    pub fn new(
        mode: CheckoutMode,
        backend: Rc<dyn BackendApi>,
        navigator: Rc<dyn Navigator>,
        ui: Rc<UiStateDriver>,
    ) -> Self {
        Self {
            mode,
            backend,
            navigator,
            ui,
            state: Cell::new(SelectorState::CollectingInput),
            snapshot_seq: Cell::new(0),
            session: RefCell::new(None),
        }
    }

    pub const fn mode(&self) -> CheckoutMode {
        self.mode
    }

    pub fn state(&self) -> SelectorState {
        self.state.get()
    }

    /// Payment created during this page load, if any
    pub fn payment_session(&self) -> Option<PaymentSession> {
        self.session.borrow().clone()
    }

    /// Handle a form submission
    pub async fn submit(&self, email: &str, topic: &str) -> SubmitOutcome {
        if self.state.get() != SelectorState::CollectingInput || self.ui.is_locked() {
            tracing::debug!(state = ?self.state.get(), "Ignoring submit while busy");
            return SubmitOutcome::Busy;
        }
        if self.mode != CheckoutMode::HostedWidgetCheckout && !self.ui.submit_enabled() {
            tracing::debug!(state = ?self.ui.state(), "Ignoring submit while the page is busy");
            return SubmitOutcome::Busy;
        }

        self.ui.clear_all_fields();
        let intent = match validate_form(email, topic) {
            Ok(intent) => intent,
            Err(errors) => {
                for error in &errors {
                    self.ui.annotate(error);
                }
                return SubmitOutcome::Invalid(errors);
            }
        };

        tracing::info!(mode = %self.mode, topic = %intent.topic, "Submitting registration");

        match self.mode {
            CheckoutMode::DirectRegister => self.register_direct(intent).await,
            CheckoutMode::RedirectCheckout => self.redirect_checkout(intent).await,
            CheckoutMode::HostedWidgetCheckout => {
                let seq = self.next_snapshot();
                self.configure_hosted(seq, intent).await;
                SubmitOutcome::Configured
            }
        }
    }

    /// Hosted mode: reconfigure the widget for the latest input.
    ///
    /// Callers debounce. Responses for anything but the newest snapshot are dropped.
    pub async fn input_changed(&self, email: &str, topic: &str) {
        if self.mode != CheckoutMode::HostedWidgetCheckout {
            return;
        }

        let seq = self.next_snapshot();
        let (email, topic) = (email.trim(), topic.trim());
        if !(validate_email(email) && validate_topic(topic)) {
            if self.ui.hint().is_some() {
                self.ui.show_hint(None);
            }
            return;
        }

        let intent = RegistrationIntent::new(email, topic);
        self.configure_hosted(seq, intent).await;
    }

    /// Clear this field's annotation on edit
    pub fn field_edited(&self, field: Field) {
        self.ui.clear_field(field);
    }

    /// Annotate a non-empty invalid field as soon as it loses focus
    pub fn field_blurred(&self, field: Field, value: &str) {
        match check_field(field, value) {
            Some(error) if !value.trim().is_empty() => self.ui.annotate(&error),
            _ => self.ui.clear_field(field),
        }
    }

    async fn register_direct(&self, intent: RegistrationIntent) -> SubmitOutcome {
        self.state.set(SelectorState::Submitting);
        self.ui.set_in_flight(true);
        self.ui.transition(UiState::Success(OPTIMISTIC_SUCCESS_MESSAGE.into()));
        self.ui.reset_form();

        match self.backend.register_direct(intent).await {
            Ok(ack) => tracing::info!(message = %ack.message, "Registration accepted"),
            Err(e) => tracing::warn!(error = %e, "Registration failed after optimistic success"),
        }

        self.ui.set_in_flight(false);
        self.state.set(SelectorState::CollectingInput);
        SubmitOutcome::Registered
    }

    async fn redirect_checkout(&self, intent: RegistrationIntent) -> SubmitOutcome {
        self.state.set(SelectorState::Submitting);
        self.ui.set_in_flight(true);
        self.ui.transition(UiState::Submitting);

        let created = match self.backend.create_payment(intent).await {
            Ok(created) => created,
            Err(e) => {
                tracing::warn!(error = %e, "Payment creation failed");
                return self.fail(e);
            }
        };

        let mut session = PaymentSession::created(created.payment_id.clone());
        settle(&mut session, PaymentStatus::AwaitingReturn);
        self.state.set(SelectorState::AwaitingExternalAction);
        tracing::info!(
            payment_id = ?created.payment_id,
            "Payment created, leaving for provider approval"
        );

        let navigated = self.navigator.assign(&created.approval_url);
        if let Err(e) = navigated {
            settle(&mut session, PaymentStatus::Failed);
            self.session.replace(Some(session));
            tracing::error!(error = %e, "Could not open approval page");
            return self.fail(e);
        }

        self.session.replace(Some(session));
        SubmitOutcome::Redirected {
            approval_url: created.approval_url,
        }
    }

    async fn configure_hosted(&self, seq: u64, intent: RegistrationIntent) {
        self.ui.show_hint(Some(Hint::Configuring));

        let result = self.backend.configure_hosted_payment(intent).await;

        let latest = self.snapshot_seq.get();
        if seq != latest {
            tracing::debug!(seq, latest, "Discarding stale hosted configuration");
            return;
        }

        let hint = match result {
            Ok(config) if config.ready => Hint::Ready,
            Ok(config) => Hint::Error(
                config
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| HOSTED_NOT_READY_MESSAGE.into()),
            ),
            Err(e) => {
                tracing::warn!(error = %e, "Hosted configuration failed");
                Hint::Error(e.user_message())
            }
        };
        self.ui.show_hint(Some(hint));
    }

    fn next_snapshot(&self) -> u64 {
        let seq = self.snapshot_seq.get() + 1;
        self.snapshot_seq.set(seq);
        seq
    }

    fn fail(&self, error: CheckoutError) -> SubmitOutcome {
        self.state.set(SelectorState::CollectingInput);
        self.ui.set_in_flight(false);
        self.ui.transition(UiState::Error(error.user_message()));
        SubmitOutcome::Failed(error)
    }
}

/// Advance a session, logging the impossible backwards case
pub(crate) fn settle(session: &mut PaymentSession, next: PaymentStatus) {
    if let Err(e) = session.advance(next) {
        tracing::error!(error = %e, "Payment session transition rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HostedConfiguration, PaymentCreated, SubmitAck};
    use crate::testing::{BackendCall, PresenterCall, RecordingNavigator, RecordingPresenter, ScriptedBackend};

    struct Harness {
        backend: Rc<ScriptedBackend>,
        navigator: Rc<RecordingNavigator>,
        presenter: Rc<RecordingPresenter>,
        ui: Rc<UiStateDriver>,
        selector: CheckoutSelector,
    }

    fn harness(mode: CheckoutMode) -> Harness {
        let backend = Rc::new(ScriptedBackend::new());
        let navigator = Rc::new(RecordingNavigator::at("https://bhaijaanacademy.com/"));
        let presenter = Rc::new(RecordingPresenter::default());
        let ui = Rc::new(UiStateDriver::new(presenter.clone()));
        let selector = CheckoutSelector::new(mode, backend.clone(), navigator.clone(), ui.clone());
        Harness {
            backend,
            navigator,
            presenter,
            ui,
            selector,
        }
    }

    fn hosted(ready: bool, message: Option<&str>) -> HostedConfiguration {
        HostedConfiguration {
            ready,
            message: message.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_backend() {
        let h = harness(CheckoutMode::RedirectCheckout);

        let outcome = h.selector.submit("learner", "ab").await;

        assert!(matches!(outcome, SubmitOutcome::Invalid(ref e) if e.len() == 2));
        assert!(h.backend.calls().is_empty());
        assert_eq!(h.ui.field_error(Field::Email).as_deref(), Some("Please enter a valid email address"));
        assert_eq!(h.ui.state(), UiState::Idle);
    }

    #[tokio::test]
    async fn test_direct_register_is_optimistic() {
        let h = harness(CheckoutMode::DirectRegister);
        h.backend.push_register(Ok(SubmitAck {
            message: "Welcome email sent".into(),
        }));

        let outcome = h.selector.submit(" a@b.c ", "Rust").await;

        assert_eq!(outcome, SubmitOutcome::Registered);
        assert_eq!(h.ui.state(), UiState::Success(OPTIMISTIC_SUCCESS_MESSAGE.into()));
        assert!(h.presenter.calls().contains(&PresenterCall::ResetForm));
        assert_eq!(
            h.backend.calls(),
            vec![BackendCall::RegisterDirect(validate_form("a@b.c", "Rust").unwrap())]
        );
        assert_eq!(h.selector.state(), SelectorState::CollectingInput);
        assert!(h.presenter.submit_enabled());
    }

    #[tokio::test]
    async fn test_direct_register_failure_keeps_success() {
        let h = harness(CheckoutMode::DirectRegister);
        let reply = h.backend.gate_register();

        let submit = h.selector.submit("a@b.c", "Rust");
        let resolve = async {
            assert_eq!(h.ui.state(), UiState::Success(OPTIMISTIC_SUCCESS_MESSAGE.into()));
            assert!(!h.presenter.submit_enabled());
            assert_eq!(h.selector.submit("c@d.e", "Go lang").await, SubmitOutcome::Busy);
            reply
                .send(Err(CheckoutError::Network("connection reset".into())))
                .unwrap();
        };
        let (outcome, ()) = futures::join!(submit, resolve);

        assert_eq!(outcome, SubmitOutcome::Registered);
        assert_eq!(h.ui.state(), UiState::Success(OPTIMISTIC_SUCCESS_MESSAGE.into()));
        assert_eq!(h.presenter.panels().len(), 1);
        assert_eq!(h.backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_redirect_navigates_once_without_further_emission() {
        let h = harness(CheckoutMode::RedirectCheckout);
        h.backend.push_create(Ok(PaymentCreated {
            approval_url: "https://pay/x".into(),
            payment_id: Some("p1".into()),
        }));

        let outcome = h.selector.submit("a@b.c", "Rust").await;

        assert_eq!(
            outcome,
            SubmitOutcome::Redirected {
                approval_url: "https://pay/x".into()
            }
        );
        assert_eq!(h.navigator.assigned(), vec!["https://pay/x".to_string()]);
        assert_eq!(h.presenter.panels(), vec![PresenterCall::Panel("pending".into())]);
        let calls = h.presenter.calls();
        assert!(matches!(calls.last(), Some(PresenterCall::SubmitEnabled(false))));
        assert_eq!(h.selector.state(), SelectorState::AwaitingExternalAction);

        let session = h.selector.payment_session().unwrap();
        assert_eq!(session.status(), PaymentStatus::AwaitingReturn);
        assert_eq!(session.provider_payment_id.as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn test_redirect_failure_recovers() {
        let h = harness(CheckoutMode::RedirectCheckout);
        h.backend.push_create(Err(CheckoutError::Application(
            "You already have a plan for this topic.".into(),
        )));

        let outcome = h.selector.submit("a@b.c", "Rust").await;

        assert!(matches!(outcome, SubmitOutcome::Failed(CheckoutError::Application(_))));
        assert_eq!(
            h.ui.state(),
            UiState::Error("You already have a plan for this topic.".into())
        );
        assert!(h.navigator.assigned().is_empty());
        assert_eq!(h.selector.state(), SelectorState::CollectingInput);
        assert!(h.presenter.submit_enabled());
    }

    #[tokio::test]
    async fn test_redirect_navigation_refused() {
        let h = harness(CheckoutMode::RedirectCheckout);
        h.navigator.refuse_navigation();
        h.backend.push_create(Ok(PaymentCreated {
            approval_url: "https://pay/x".into(),
            payment_id: None,
        }));

        let outcome = h.selector.submit("a@b.c", "Rust").await;

        assert!(matches!(outcome, SubmitOutcome::Failed(CheckoutError::Navigation(_))));
        assert!(matches!(h.ui.state(), UiState::Error(_)));
        assert_eq!(h.selector.payment_session().unwrap().status(), PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn test_hosted_latest_snapshot_wins() {
        let h = harness(CheckoutMode::HostedWidgetCheckout);
        let reply_a = h.backend.gate_configure();
        let reply_b = h.backend.gate_configure();

        let a = h.selector.input_changed("a@b.c", "Rust");
        let b = h.selector.input_changed("a@b.c", "Rust async");
        let resolve = async {
            reply_b
                .send(Ok(hosted(false, Some("Topic not allowed"))))
                .unwrap();
            tokio::task::yield_now().await;
            reply_a.send(Ok(hosted(true, None))).unwrap();
        };
        futures::join!(a, b, resolve);

        assert_eq!(h.ui.hint(), Some(Hint::Error("Topic not allowed".into())));
        assert!(!h.presenter.hints().contains(&Some(Hint::Ready)));
        assert_eq!(h.backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_hosted_ready_and_errors() {
        let h = harness(CheckoutMode::HostedWidgetCheckout);
        h.backend.push_configure(Ok(hosted(true, None)));
        h.backend.push_configure(Ok(hosted(false, None)));
        h.backend.push_configure(Err(CheckoutError::Network("timeout".into())));

        h.selector.input_changed("a@b.c", "Rust").await;
        assert_eq!(h.ui.hint(), Some(Hint::Ready));

        h.selector.input_changed("a@b.c", "Rusty").await;
        assert_eq!(h.ui.hint(), Some(Hint::Error(HOSTED_NOT_READY_MESSAGE.into())));

        h.selector.input_changed("a@b.c", "Rustier").await;
        assert_eq!(
            h.ui.hint(),
            Some(Hint::Error(CheckoutError::Network(String::new()).user_message()))
        );
        assert_eq!(
            h.presenter.hints().first(),
            Some(&Some(Hint::Configuring))
        );
        assert!(h.presenter.submit_enabled());
    }

    #[tokio::test]
    async fn test_hosted_invalid_input_drops_inflight() {
        let h = harness(CheckoutMode::HostedWidgetCheckout);
        let reply = h.backend.gate_configure();

        let configure = h.selector.input_changed("a@b.c", "Rust");
        let edit = async {
            h.selector.input_changed("a@b", "Rust").await;
            reply.send(Ok(hosted(true, None))).unwrap();
        };
        futures::join!(configure, edit);

        assert_eq!(h.ui.hint(), None);
        assert_eq!(h.backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_input_changed_ignored_outside_hosted_mode() {
        let h = harness(CheckoutMode::DirectRegister);
        h.selector.input_changed("a@b.c", "Rust").await;
        assert!(h.backend.calls().is_empty());
        assert!(h.presenter.calls().is_empty());
    }

    #[test]
    fn test_blur_and_edit_annotations() {
        let h = harness(CheckoutMode::DirectRegister);

        h.selector.field_blurred(Field::Email, "");
        assert_eq!(h.ui.field_error(Field::Email), None);

        h.selector.field_blurred(Field::Email, "broken@");
        assert!(h.ui.field_error(Field::Email).is_some());

        h.selector.field_blurred(Field::Topic, "AI");
        h.selector.field_edited(Field::Email);
        assert_eq!(h.ui.field_error(Field::Email), None);
        assert!(h.ui.field_error(Field::Topic).is_some());
    }
}
