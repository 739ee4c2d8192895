//! Terminal Presenter and Navigator
//!
//! Stand-ins for the browser when driving the coordinator from a shell.

use std::cell::RefCell;

use academy_core::{Field, Hint, Navigator, Panel, Presenter, Result};

/// Prints panels to stdout, everything else goes to the log
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn render(&self, panel: Panel<'_>) {
        match panel {
            Panel::Nothing => {}
            Panel::Pending => println!("... working"),
            Panel::Success(message) => println!("✓ {message}"),
            Panel::Error(message) => println!("✗ {message}"),
        }
    }

    fn set_submit_enabled(&self, enabled: bool) {
        tracing::debug!(enabled, "Submit affordance");
    }

    fn show_field_error(&self, field: Field, message: &str) {
        println!("  {field}: {message}");
    }

    fn clear_field_error(&self, field: Field) {
        tracing::trace!(%field, "Field annotation cleared");
    }

    fn show_hint(&self, hint: Option<&Hint>) {
        if let Some(hint) = hint {
            println!("  {}", hint.text());
        }
    }

    fn reset_form(&self) {
        tracing::debug!("Form reset");
    }
}

/// Tracks a virtual page location. Leaving the page prints the target.
#[derive(Debug)]
pub struct TerminalNavigator {
    href: RefCell<String>,
}

impl TerminalNavigator {
    pub fn at(href: impl Into<String>) -> Self {
        Self {
            href: RefCell::new(href.into()),
        }
    }

    pub fn href(&self) -> String {
        self.href.borrow().clone()
    }
}

impl Navigator for TerminalNavigator {
    fn current_href(&self) -> Result<String> {
        Ok(self.href())
    }

    fn assign(&self, url: &str) -> Result<()> {
        println!("Open this page to complete payment:\n  {url}");
        self.href.replace(url.to_string());
        Ok(())
    }

    fn replace_url(&self, url: &str) -> Result<()> {
        tracing::debug!(url, "Visible URL replaced");
        self.href.replace(url.to_string());
        Ok(())
    }
}
