//! Signal Presenter
//!
//! Renders coordinator output into Leptos signals that the view reads.

use academy_core::{Field, Hint, Panel, Presenter};
use leptos::prelude::*;

/// Owned copy of a `Panel`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PanelView {
    #[default]
    Nothing,
    Pending,
    Success(String),
    Error(String),
}

impl From<Panel<'_>> for PanelView {
    fn from(panel: Panel<'_>) -> Self {
        match panel {
            Panel::Nothing => Self::Nothing,
            Panel::Pending => Self::Pending,
            Panel::Success(message) => Self::Success(message.to_string()),
            Panel::Error(message) => Self::Error(message.to_string()),
        }
    }
}

/// Reactive state of the sign-up form
#[derive(Clone, Copy)]
pub struct FormSignals {
    pub email: RwSignal<String>,
    pub topic: RwSignal<String>,
    pub email_error: RwSignal<Option<String>>,
    pub topic_error: RwSignal<Option<String>>,
    pub hint: RwSignal<Option<Hint>>,
    pub panel: RwSignal<PanelView>,
    pub submit_enabled: RwSignal<bool>,
}

impl FormSignals {
    pub fn new() -> Self {
        Self {
            email: RwSignal::new(String::new()),
            topic: RwSignal::new(String::new()),
            email_error: RwSignal::new(None),
            topic_error: RwSignal::new(None),
            hint: RwSignal::new(None),
            panel: RwSignal::new(PanelView::Nothing),
            submit_enabled: RwSignal::new(true),
        }
    }

    pub const fn error_for(&self, field: Field) -> RwSignal<Option<String>> {
        match field {
            Field::Email => self.email_error,
            Field::Topic => self.topic_error,
        }
    }
}

impl Default for FormSignals {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SignalPresenter {
    signals: FormSignals,
}

impl SignalPresenter {
    pub const fn new(signals: FormSignals) -> Self {
        Self { signals }
    }
}

impl Presenter for SignalPresenter {
    fn render(&self, panel: Panel<'_>) {
        self.signals.panel.set(panel.into());
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.signals.submit_enabled.set(enabled);
    }

    fn show_field_error(&self, field: Field, message: &str) {
        self.signals.error_for(field).set(Some(message.to_string()));
    }

    fn clear_field_error(&self, field: Field) {
        self.signals.error_for(field).set(None);
    }

    fn show_hint(&self, hint: Option<&Hint>) {
        self.signals.hint.set(hint.cloned());
    }

    fn reset_form(&self) {
        self.signals.email.set(String::new());
        self.signals.topic.set(String::new());
    }
}
