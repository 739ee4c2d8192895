//! Page Coordinator
//!
//! Wires the driver, selector and reconciler around one presenter, one
//! navigator and one backend for a single page load.

use std::rc::Rc;

use crate::backend::{probe_backend, BackendApi};
use crate::config::CheckoutConfig;
use crate::navigation::Navigator;
use crate::reconcile::{ReconcileOutcome, ReturnReconciler};
use crate::selector::CheckoutSelector;
use crate::ui::{Presenter, UiStateDriver};

pub struct CheckoutCoordinator {
    backend: Rc<dyn BackendApi>,
    ui: Rc<UiStateDriver>,
    selector: CheckoutSelector,
    reconciler: ReturnReconciler,
}

impl CheckoutCoordinator {
    pub fn new(
        config: &CheckoutConfig,
        backend: Rc<dyn BackendApi>,
        navigator: Rc<dyn Navigator>,
        presenter: Rc<dyn Presenter>,
    ) -> Self {
        let ui = Rc::new(UiStateDriver::new(presenter));
        let selector =
            CheckoutSelector::new(config.mode, backend.clone(), navigator.clone(), ui.clone());
        let reconciler = ReturnReconciler::new(backend.clone(), navigator, ui.clone());

        Self {
            backend,
            ui,
            selector,
            reconciler,
        }
    }

    pub const fn selector(&self) -> &CheckoutSelector {
        &self.selector
    }

    pub fn ui(&self) -> &UiStateDriver {
        &self.ui
    }

    /// Resume any returned checkout, then probe the backend
    pub async fn on_page_load(&self) -> ReconcileOutcome {
        let outcome = self.reconciler.reconcile().await;
        tracing::debug!(?outcome, mode = %self.selector.mode(), "Page load reconciled");
        probe_backend(self.backend.as_ref()).await;
        outcome
    }
}
