//! Browser Navigation

use academy_core::{CheckoutError, Navigator, Result};
use wasm_bindgen::JsValue;

/// `Navigator` over `window.location` and `window.history`
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn current_href(&self) -> Result<String> {
        window()?.location().href().map_err(js_error)
    }

    fn assign(&self, url: &str) -> Result<()> {
        window()?.location().set_href(url).map_err(js_error)
    }

    fn replace_url(&self, url: &str) -> Result<()> {
        window()?
            .history()
            .map_err(js_error)?
            .replace_state_with_url(&JsValue::NULL, "", Some(url))
            .map_err(js_error)
    }
}

fn window() -> Result<web_sys::Window> {
    web_sys::window().ok_or_else(|| CheckoutError::Navigation("no window".into()))
}

fn js_error(err: JsValue) -> CheckoutError {
    CheckoutError::Navigation(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}
