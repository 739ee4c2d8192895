//! Main App Component

use std::rc::Rc;
use std::time::Duration;

use academy_client::HttpBackend;
use academy_core::config::{
    ENV_API_BASE_URL, ENV_CHECKOUT_MODE, ENV_HOSTED_DEBOUNCE_MS, ENV_REQUEST_TIMEOUT_SECS,
};
use academy_core::{CheckoutConfig, CheckoutCoordinator, CheckoutMode, Field};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::browser::BrowserNavigator;
use crate::components::{FieldMessage, HintLine, StatusPanel};
use crate::presenter::{FormSignals, SignalPresenter};

/// Deployment settings baked in at build time
fn build_config() -> CheckoutConfig {
    let lookup = |key: &str| {
        match key {
            ENV_API_BASE_URL => option_env!("ACADEMY_API_BASE_URL"),
            ENV_CHECKOUT_MODE => option_env!("ACADEMY_CHECKOUT_MODE"),
            ENV_REQUEST_TIMEOUT_SECS => option_env!("ACADEMY_REQUEST_TIMEOUT_SECS"),
            ENV_HOSTED_DEBOUNCE_MS => option_env!("ACADEMY_HOSTED_DEBOUNCE_MS"),
            _ => None,
        }
        .map(str::to_string)
    };

    CheckoutConfig::from_lookup(lookup).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid build configuration, using defaults");
        CheckoutConfig::default()
    })
}

const fn submit_label(mode: CheckoutMode) -> &'static str {
    match mode {
        CheckoutMode::RedirectCheckout => "Continue to payment",
        CheckoutMode::DirectRegister | CheckoutMode::HostedWidgetCheckout => "Get my learning plan",
    }
}

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let config = build_config();
    let signals = FormSignals::new();

    let backend = match HttpBackend::from_config(&config) {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!(error = %e, "Cannot create backend client");
            return view! { <p class="status error">{e.user_message()}</p> }.into_any();
        }
    };

    let coordinator = Rc::new(CheckoutCoordinator::new(
        &config,
        Rc::new(backend),
        Rc::new(BrowserNavigator),
        Rc::new(SignalPresenter::new(signals)),
    ));
    tracing::info!(mode = %config.mode, api = %config.api_base_url, "Sign-up page loaded");

    {
        let coordinator = coordinator.clone();
        spawn_local(async move {
            coordinator.on_page_load().await;
        });
    }

    let coordinator = StoredValue::new_local(coordinator);
    let mode = config.mode;
    let debounce = Duration::from_millis(config.hosted_debounce_ms);
    let pending_configure = StoredValue::new(None::<TimeoutHandle>);

    // Hosted mode: reconfigure once input has been quiet for the debounce period
    let schedule_configure = move || {
        if mode != CheckoutMode::HostedWidgetCheckout {
            return;
        }
        if let Some(handle) = pending_configure.get_value() {
            handle.clear();
        }

        let coordinator = coordinator.get_value();
        let fire = move || {
            let (email, topic) = (signals.email.get_untracked(), signals.topic.get_untracked());
            spawn_local(async move {
                coordinator.selector().input_changed(&email, &topic).await;
            });
        };

        match set_timeout_with_handle(fire, debounce) {
            Ok(handle) => pending_configure.set_value(Some(handle)),
            Err(e) => tracing::warn!(error = ?e, "Cannot schedule hosted configuration"),
        }
    };

    let on_edit = move |field: Field, value: String| {
        match field {
            Field::Email => signals.email.set(value),
            Field::Topic => signals.topic.set(value),
        }
        coordinator.with_value(|c| c.selector().field_edited(field));
        schedule_configure();
    };

    let on_blur = move |field: Field, value: String| {
        coordinator.with_value(|c| c.selector().field_blurred(field, &value));
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let coordinator = coordinator.get_value();
        let (email, topic) = (signals.email.get_untracked(), signals.topic.get_untracked());
        spawn_local(async move {
            let outcome = coordinator.selector().submit(&email, &topic).await;
            tracing::debug!(?outcome, "Submit handled");
        });
    };

    view! {
        <main class="app">
            <section class="signup">
                <h1>"Bhai Jaan Academy"</h1>
                <p class="subtitle">"A personalised learning plan for any topic, straight to your inbox"</p>

                <form novalidate=true on:submit=on_submit>
                    <div class="field">
                        <label for="email">"Email"</label>
                        <input
                            id="email"
                            type="email"
                            placeholder="you@example.com"
                            class:invalid=move || signals.email_error.get().is_some()
                            prop:value=move || signals.email.get()
                            on:input=move |ev| on_edit(Field::Email, event_target_value(&ev))
                            on:blur=move |ev| on_blur(Field::Email, event_target_value(&ev))
                        />
                        <FieldMessage message=signals.email_error />
                    </div>

                    <div class="field">
                        <label for="topic">"What do you want to learn?"</label>
                        <input
                            id="topic"
                            type="text"
                            placeholder="Rust ownership"
                            class:invalid=move || signals.topic_error.get().is_some()
                            prop:value=move || signals.topic.get()
                            on:input=move |ev| on_edit(Field::Topic, event_target_value(&ev))
                            on:blur=move |ev| on_blur(Field::Topic, event_target_value(&ev))
                        />
                        <FieldMessage message=signals.topic_error />
                    </div>

                    <button type="submit" disabled=move || !signals.submit_enabled.get()>
                        {submit_label(mode)}
                    </button>
                </form>

                <HintLine hint=signals.hint />
                <StatusPanel panel=signals.panel />
            </section>
        </main>
    }
    .into_any()
}
