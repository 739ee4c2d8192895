//! Academy Checkout CLI
//!
//! Drives the checkout coordinator against a live backend from a terminal.
//!
//! ## Usage
//!
//! ```bash
//! academy-cli probe
//! academy-cli --mode redirect submit learner@example.com "Rust ownership"
//! academy-cli return "https://bhaijaanacademy.com/?payment=success&token=EC-1&PayerID=U1"
//! ```

mod terminal;

use std::rc::Rc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use academy_client::HttpBackend;
use academy_core::config::{ENV_API_BASE_URL, ENV_CHECKOUT_MODE};
use academy_core::{
    probe_backend, CheckoutConfig, CheckoutCoordinator, CheckoutMode, ReconcileOutcome,
    SubmitOutcome,
};

use crate::terminal::{TerminalNavigator, TerminalPresenter};

/// Page location used when no return URL is given
const LANDING_PAGE: &str = "http://localhost:3000/";

#[derive(Parser)]
#[command(name = "academy-cli")]
#[command(about = "Academy sign-up and checkout from the terminal", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL (overrides ACADEMY_API_BASE_URL)
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    /// Checkout path: direct, redirect or hosted (overrides ACADEMY_CHECKOUT_MODE)
    #[arg(long, global = true)]
    mode: Option<CheckoutMode>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend answers
    Probe,

    /// Submit the sign-up form
    Submit {
        #[arg(value_name = "EMAIL")]
        email: String,

        #[arg(value_name = "TOPIC")]
        topic: String,
    },

    /// Configure the hosted payment widget for this input
    Configure {
        #[arg(value_name = "EMAIL")]
        email: String,

        #[arg(value_name = "TOPIC")]
        topic: String,
    },

    /// Load the page at a provider return URL and reconcile it
    Return {
        #[arg(value_name = "URL")]
        url: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = resolve_config(cli.api_base_url, cli.mode, |key| std::env::var(key).ok())?;

    let backend = Rc::new(HttpBackend::from_config(&config)?);
    tracing::info!(api = %backend.base_url(), mode = %config.mode, "Academy checkout");

    match cli.command {
        Commands::Probe => {
            if !probe_backend(backend.as_ref()).await {
                anyhow::bail!("backend at {} is not available", config.api_base_url);
            }
            println!("✓ Backend is up");
        }
        Commands::Submit { email, topic } => {
            let coordinator = page(&config, backend, LANDING_PAGE);
            match coordinator.selector().submit(&email, &topic).await {
                SubmitOutcome::Invalid(_) => anyhow::bail!("form has errors"),
                SubmitOutcome::Failed(e) if e.is_retryable() => {
                    anyhow::bail!("{e} (the backend may be unreachable, try again)")
                }
                SubmitOutcome::Failed(e) => anyhow::bail!(e),
                outcome => tracing::debug!(?outcome, "Submit handled"),
            }
        }
        Commands::Configure { email, topic } => {
            config.mode = CheckoutMode::HostedWidgetCheckout;
            let coordinator = page(&config, backend, LANDING_PAGE);
            coordinator.selector().input_changed(&email, &topic).await;
            if coordinator.ui().hint().is_none() {
                anyhow::bail!("input is not valid for hosted checkout");
            }
        }
        Commands::Return { url } => {
            let coordinator = page(&config, backend, &url);
            match coordinator.on_page_load().await {
                ReconcileOutcome::NoReturn => println!("No payment return on this URL"),
                ReconcileOutcome::Malformed => anyhow::bail!("return URL is missing payment identifiers"),
                ReconcileOutcome::Rejected(message) => anyhow::bail!(message),
                ReconcileOutcome::Cancelled | ReconcileOutcome::Verified => {}
            }
        }
    }

    Ok(())
}

/// Environment configuration with command-line values taking precedence
fn resolve_config(
    api_base_url: Option<String>,
    mode: Option<CheckoutMode>,
    env: impl Fn(&str) -> Option<String>,
) -> academy_core::Result<CheckoutConfig> {
    CheckoutConfig::from_lookup(|key| match key {
        ENV_API_BASE_URL if api_base_url.is_some() => api_base_url.clone(),
        ENV_CHECKOUT_MODE if mode.is_some() => mode.map(|m| m.as_str().to_string()),
        _ => env(key),
    })
}

fn page(config: &CheckoutConfig, backend: Rc<HttpBackend>, href: &str) -> CheckoutCoordinator {
    CheckoutCoordinator::new(
        config,
        backend,
        Rc::new(TerminalNavigator::at(href)),
        Rc::new(TerminalPresenter),
    )
}
