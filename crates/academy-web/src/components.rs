//! UI Components

use academy_core::Hint;
use leptos::prelude::*;

use crate::presenter::PanelView;

/// Success, error or pending panel. Only one is ever visible.
#[component]
pub fn StatusPanel(panel: RwSignal<PanelView>) -> impl IntoView {
    move || match panel.get() {
        PanelView::Nothing => ().into_any(),
        PanelView::Pending => view! { <div class="status pending">"Please wait..."</div> }.into_any(),
        PanelView::Success(message) => {
            view! { <div class="status success">{message}</div> }.into_any()
        }
        PanelView::Error(message) => view! { <div class="status error">{message}</div> }.into_any(),
    }
}

#[component]
pub fn FieldMessage(message: RwSignal<Option<String>>) -> impl IntoView {
    view! { <span class="field-error">{move || message.get().unwrap_or_default()}</span> }
}

#[component]
pub fn HintLine(hint: RwSignal<Option<Hint>>) -> impl IntoView {
    move || {
        hint.get().map(|hint| {
            let class = if matches!(hint, Hint::Error(_)) { "hint error" } else { "hint" };
            view! { <p class=class>{hint.text()}</p> }
        })
    }
}
