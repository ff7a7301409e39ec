//! `doorctl` -- administration console for the RFID door-access backend.
//!
//! Every invocation opens a fresh admin session with the configured
//! credentials, runs one subcommand, and exits. Nothing is stored locally.
//!
//! # Environment variables
//!
//! | Variable                       | Required | Default                 | Description                        |
//! |--------------------------------|----------|-------------------------|------------------------------------|
//! | `DOORCTL_BASE_URL`             | no       | `http://localhost:8000` | Backend base URL                   |
//! | `DOORCTL_REQUEST_TIMEOUT_SECS` | no       | `10`                    | Per-request timeout                |
//! | `DOORCTL_USERNAME`             | yes      | --                      | Administrator username             |
//! | `DOORCTL_PASSWORD`             | yes      | --                      | Administrator password             |
//! | `DOORCTL_NEW_ADMIN_PASSWORD`   | no       | --                      | Password for `admins add`          |
//! | `RUST_LOG`                     | no       | `doorctl=info,doorctl_binding=info` | Log filter             |

mod args;
mod commands;
mod render;

use std::process::ExitCode;

use clap::Parser;
use doorctl_client::{AdminApi, ClientConfig};
use doorctl_console::SessionView;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::Cli;
use crate::commands::Reported;

/// Exit status when the backend ends the admin session mid-command.
const EXIT_SESSION_EXPIRED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "doorctl=info,doorctl_binding=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            if e.downcast_ref::<Reported>().is_none() {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    tracing::debug!(base_url = %config.base_url, "Connecting to access-control server");
    let api = AdminApi::new(&config)?;

    let Some((username, password)) = config.credentials() else {
        anyhow::bail!("DOORCTL_USERNAME and DOORCTL_PASSWORD must be set");
    };
    let mut session = SessionView::new(api.clone());
    if let Err(e) = session.login(username, password).await {
        eprintln!("[ERROR] {}", e.notice("Login"));
        return Err(anyhow::Error::new(e).context(Reported));
    }

    let auth = api.auth_signal().clone();
    tokio::select! {
        biased;

        _ = auth.expired() => {
            eprintln!("Session expired, run `doorctl login` to check your credentials.");
            Ok(ExitCode::from(EXIT_SESSION_EXPIRED))
        }

        result = commands::run(&api, cli.command) => result.map(|()| ExitCode::SUCCESS),
    }
}
