//! Recording fakes for the presenter, navigator and backend seams.
//!
//! Enabled for this crate's tests and, through the `testing` feature, for
//! downstream crates.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::backend::{BackendApi, HostedConfiguration, PaymentCreated, SubmitAck, Verification};
use crate::error::{CheckoutError, Result};
use crate::model::RegistrationIntent;
use crate::navigation::Navigator;
use crate::ui::{Hint, Panel, Presenter};
use crate::validate::Field;

/// One presenter invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PresenterCall {
    /// `nothing`, `pending`, `success: <msg>` or `error: <msg>`
    Panel(String),
    SubmitEnabled(bool),
    FieldError(Field, String),
    ClearField(Field),
    Hint(Option<Hint>),
    ResetForm,
}

/// Presenter that records every call in order
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    calls: RefCell<Vec<PresenterCall>>,
}

impl RecordingPresenter {
    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.borrow().clone()
    }

    pub fn panels(&self) -> Vec<PresenterCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, PresenterCall::Panel(_)))
            .collect()
    }

    pub fn hints(&self) -> Vec<Option<Hint>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PresenterCall::Hint(h) => Some(h),
                _ => None,
            })
            .collect()
    }

    /// Last value pushed to the submit affordance; enabled if never set
    pub fn submit_enabled(&self) -> bool {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find_map(|c| match c {
                PresenterCall::SubmitEnabled(enabled) => Some(*enabled),
                _ => None,
            })
            .unwrap_or(true)
    }

    fn record(&self, call: PresenterCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Presenter for RecordingPresenter {
    fn render(&self, panel: Panel<'_>) {
        let text = match panel {
            Panel::Nothing => "nothing".to_string(),
            Panel::Pending => "pending".to_string(),
            Panel::Success(m) => format!("success: {m}"),
            Panel::Error(m) => format!("error: {m}"),
        };
        self.record(PresenterCall::Panel(text));
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.record(PresenterCall::SubmitEnabled(enabled));
    }

    fn show_field_error(&self, field: Field, message: &str) {
        self.record(PresenterCall::FieldError(field, message.to_string()));
    }

    fn clear_field_error(&self, field: Field) {
        self.record(PresenterCall::ClearField(field));
    }

    fn show_hint(&self, hint: Option<&Hint>) {
        self.record(PresenterCall::Hint(hint.cloned()));
    }

    fn reset_form(&self) {
        self.record(PresenterCall::ResetForm);
    }
}

/// Navigator over an in-memory location
#[derive(Debug)]
pub struct RecordingNavigator {
    href: RefCell<String>,
    assigned: RefCell<Vec<String>>,
    replaced: RefCell<Vec<String>>,
    refuse_assign: Cell<bool>,
}

impl RecordingNavigator {
    pub fn at(href: impl Into<String>) -> Self {
        Self {
            href: RefCell::new(href.into()),
            assigned: RefCell::new(Vec::new()),
            replaced: RefCell::new(Vec::new()),
            refuse_assign: Cell::new(false),
        }
    }

    /// Make every `assign` fail, as a blocked popup or bad URL would
    pub fn refuse_navigation(&self) {
        self.refuse_assign.set(true);
    }

    pub fn href(&self) -> String {
        self.href.borrow().clone()
    }

    pub fn assigned(&self) -> Vec<String> {
        self.assigned.borrow().clone()
    }

    pub fn replaced(&self) -> Vec<String> {
        self.replaced.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_href(&self) -> Result<String> {
        Ok(self.href())
    }

    fn assign(&self, url: &str) -> Result<()> {
        if self.refuse_assign.get() {
            return Err(CheckoutError::Navigation(format!("refused {url}")));
        }
        self.assigned.borrow_mut().push(url.to_string());
        Ok(())
    }

    fn replace_url(&self, url: &str) -> Result<()> {
        self.replaced.borrow_mut().push(url.to_string());
        self.href.replace(url.to_string());
        Ok(())
    }
}

/// Backend operation as observed by [`ScriptedBackend`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCall {
    RegisterDirect(RegistrationIntent),
    CreatePayment(RegistrationIntent),
    VerifyPayment { payment_id: String, payer_id: String },
    ConfigureHosted(RegistrationIntent),
    HealthCheck,
}

enum Reply<T> {
    Ready(Result<T>),
    Gated(oneshot::Receiver<Result<T>>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> Result<T> {
        match self {
            Self::Ready(result) => result,
            Self::Gated(rx) => rx
                .await
                .unwrap_or_else(|_| Err(CheckoutError::Network("reply dropped".into()))),
        }
    }
}

struct Script<T>(RefCell<VecDeque<Reply<T>>>);

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self(RefCell::new(VecDeque::new()))
    }
}

impl<T> Script<T> {
    fn push(&self, result: Result<T>) {
        self.0.borrow_mut().push_back(Reply::Ready(result));
    }

    fn gate(&self) -> oneshot::Sender<Result<T>> {
        let (tx, rx) = oneshot::channel();
        self.0.borrow_mut().push_back(Reply::Gated(rx));
        tx
    }

    async fn next(&self, op: &str) -> Result<T> {
        let reply = self.0.borrow_mut().pop_front();
        match reply {
            Some(reply) => reply.resolve().await,
            None => Err(CheckoutError::Network(format!("no scripted reply for {op}"))),
        }
    }
}

/// Backend answering from per-operation queues.
///
/// Gated replies stay pending until the returned sender fires, which lets a
/// test choose the order in which concurrent calls resolve.
#[derive(Default)]
pub struct ScriptedBackend {
    calls: RefCell<Vec<BackendCall>>,
    register: Script<SubmitAck>,
    create: Script<PaymentCreated>,
    verify: Script<Verification>,
    configure: Script<HostedConfiguration>,
    health: Script<bool>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.borrow().clone()
    }

    pub fn push_register(&self, result: Result<SubmitAck>) {
        self.register.push(result);
    }

    pub fn gate_register(&self) -> oneshot::Sender<Result<SubmitAck>> {
        self.register.gate()
    }

    pub fn push_create(&self, result: Result<PaymentCreated>) {
        self.create.push(result);
    }

    pub fn push_verify(&self, result: Result<Verification>) {
        self.verify.push(result);
    }

    pub fn gate_verify(&self) -> oneshot::Sender<Result<Verification>> {
        self.verify.gate()
    }

    pub fn push_configure(&self, result: Result<HostedConfiguration>) {
        self.configure.push(result);
    }

    pub fn gate_configure(&self) -> oneshot::Sender<Result<HostedConfiguration>> {
        self.configure.gate()
    }

    pub fn push_health(&self, result: Result<bool>) {
        self.health.push(result);
    }

    fn record(&self, call: BackendCall) {
        self.calls.borrow_mut().push(call);
    }
}

#[async_trait(?Send)]
impl BackendApi for ScriptedBackend {
    async fn register_direct(&self, intent: RegistrationIntent) -> Result<SubmitAck> {
        self.record(BackendCall::RegisterDirect(intent));
        self.register.next("register_direct").await
    }

    async fn create_payment(&self, intent: RegistrationIntent) -> Result<PaymentCreated> {
        self.record(BackendCall::CreatePayment(intent));
        self.create.next("create_payment").await
    }

    async fn verify_payment(&self, payment_id: &str, payer_id: &str) -> Result<Verification> {
        self.record(BackendCall::VerifyPayment {
            payment_id: payment_id.to_string(),
            payer_id: payer_id.to_string(),
        });
        self.verify.next("verify_payment").await
    }

    async fn configure_hosted_payment(
        &self,
        intent: RegistrationIntent,
    ) -> Result<HostedConfiguration> {
        self.record(BackendCall::ConfigureHosted(intent));
        self.configure.next("configure_hosted_payment").await
    }

    async fn health_check(&self) -> Result<bool> {
        self.record(BackendCall::HealthCheck);
        self.health.next("health_check").await
    }
}
