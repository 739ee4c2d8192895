//! UI State Driver
//!
//! Sole owner of the current [`UiState`]. Other components request
//! transitions; only the driver talks to the [`Presenter`].
//!
//! Two channels are kept apart:
//! - the status panel, a pure projection of `UiState` where showing one panel
//!   always hides the others
//! - field annotations, keyed by [`Field`] and cleared independently

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::validate::{Field, FieldError};

/// Presentation state of the page
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiState {
    #[default]
    Idle,
    Submitting,
    AwaitingPaymentReturn,
    Success(String),
    Error(String),
}

impl UiState {
    /// The single panel this state renders
    pub fn panel(&self) -> Panel<'_> {
        match self {
            Self::Idle => Panel::Nothing,
            Self::Submitting | Self::AwaitingPaymentReturn => Panel::Pending,
            Self::Success(message) => Panel::Success(message),
            Self::Error(message) => Panel::Error(message),
        }
    }

    const fn is_pending(&self) -> bool {
        matches!(self, Self::Submitting | Self::AwaitingPaymentReturn)
    }
}

/// Mutually exclusive status panels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel<'a> {
    Nothing,
    Pending,
    Success(&'a str),
    Error(&'a str),
}

/// Informational hints that sit beside the status panel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hint {
    /// Hosted widget configuration requested
    Configuring,
    /// Hosted widget can take payment
    Ready,
    /// Hosted widget configuration failed
    Error(String),
    /// Returned payment is being verified
    Processing,
}

impl Hint {
    pub fn text(&self) -> String {
        match self {
            Self::Configuring => "Preparing secure payment...".into(),
            Self::Ready => "Payment ready. Use the button below to pay.".into(),
            Self::Error(message) => message.clone(),
            Self::Processing => "Processing your payment...".into(),
        }
    }
}

/// Presentation layer the driver renders into
pub trait Presenter {
    /// Show exactly this panel, hiding the others
    fn render(&self, panel: Panel<'_>);

    fn set_submit_enabled(&self, enabled: bool);

    fn show_field_error(&self, field: Field, message: &str);

    fn clear_field_error(&self, field: Field);

    /// `None` hides the hint
    fn show_hint(&self, hint: Option<&Hint>);

    /// Empty the form inputs
    fn reset_form(&self);
}

/// Owns `UiState` and translates transitions into presenter calls
pub struct UiStateDriver {
    presenter: Rc<dyn Presenter>,
    state: RefCell<UiState>,
    hint: RefCell<Option<Hint>>,
    field_errors: RefCell<HashMap<Field, String>>,
    in_flight: Cell<bool>,
    locked: Cell<bool>,
}

impl UiStateDriver {
    pub fn new(presenter: Rc<dyn Presenter>) -> Self {
        Self {
            presenter,
            state: RefCell::new(UiState::Idle),
            hint: RefCell::new(None),
            field_errors: RefCell::new(HashMap::new()),
            in_flight: Cell::new(false),
            locked: Cell::new(false),
        }
    }

    pub fn state(&self) -> UiState {
        self.state.borrow().clone()
    }

    pub fn hint(&self) -> Option<Hint> {
        self.hint.borrow().clone()
    }

    pub fn field_error(&self, field: Field) -> Option<String> {
        self.field_errors.borrow().get(&field).cloned()
    }

    /// Submit is enabled unless a blocking call is outstanding or a payment
    /// was confirmed
    pub fn submit_enabled(&self) -> bool {
        !self.in_flight.get() && !self.locked.get() && !self.state.borrow().is_pending()
    }

    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    /// Move to `next` and render its panel
    pub fn transition(&self, next: UiState) {
        tracing::debug!(from = ?*self.state.borrow(), to = ?next, "UI transition");
        self.state.replace(next);
        self.presenter.render(self.state.borrow().panel());
        self.refresh_submit();
    }

    pub fn set_in_flight(&self, in_flight: bool) {
        self.in_flight.set(in_flight);
        self.refresh_submit();
    }

    /// Permanently disable submission for this page load
    pub fn lock_submission(&self) {
        self.locked.set(true);
        self.refresh_submit();
    }

    pub fn show_hint(&self, hint: Option<Hint>) {
        self.hint.replace(hint);
        self.presenter.show_hint(self.hint.borrow().as_ref());
    }

    pub fn annotate(&self, error: &FieldError) {
        self.field_errors
            .borrow_mut()
            .insert(error.field, error.message.to_string());
        self.presenter.show_field_error(error.field, error.message);
    }

    /// Clear one field's annotation if it has one
    pub fn clear_field(&self, field: Field) {
        if self.field_errors.borrow_mut().remove(&field).is_some() {
            self.presenter.clear_field_error(field);
        }
    }

    pub fn clear_all_fields(&self) {
        for field in Field::ALL {
            self.clear_field(field);
        }
    }

    pub fn reset_form(&self) {
        self.presenter.reset_form();
    }

    fn refresh_submit(&self) {
        self.presenter.set_submit_enabled(self.submit_enabled());
    }
}
