//! tracegate - drive the session and navigation guard layer from a terminal.
//!
//! Each command builds the gate for one front-end surface, so the stored
//! credential, the route guard and the request pipeline behave exactly as
//! they do inside the front-end.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Method;
use tracegate_core::nav::{HistoryNavigator, Navigation};
use tracegate_core::{Config, Credential, Gate, Navigator, StoreBackend, Surface};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "tracegate", version, about = "Session and navigation guard for the tracegate front-ends")]
struct Cli {
    /// Front-end surface: admin or mobile
    #[arg(long, global = true, default_value = "admin", env = "TRACEGATE_SURFACE")]
    surface: String,

    /// Also write logs to a daily-rolling file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store a credential and leave the login page
    Login {
        /// Token issued by the login endpoint; prompted for when omitted
        token: Option<String>,
        /// Login location to start from, e.g. "/login?redirect=/batches"
        #[arg(long)]
        from: Option<String>,
    },
    /// Clear the stored credential
    Logout,
    /// Update and save the config file
    Configure {
        /// Backend origin, e.g. "https://trace.example.com"
        #[arg(long)]
        origin: Option<String>,
        /// Request timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Credential store backend: file, keyring or memory
        #[arg(long)]
        store: Option<StoreBackend>,
    },
    /// Show whether a credential is stored
    Status,
    /// Run the route guard for a path and print where navigation ends up
    Visit { path: String },
    /// Send a request through the interceptor pipeline
    Request {
        method: String,
        path: String,
        /// JSON request body
        #[arg(long)]
        body: Option<String>,
        /// Location the request is made from
        #[arg(long)]
        from: Option<String>,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tracegate.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_dir.as_ref());

    let surface = Surface::by_name(&cli.surface)
        .with_context(|| format!("Unknown surface '{}' (expected admin or mobile)", cli.surface))?;

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    config.apply_env()?;
    debug!(?config, surface = %surface.name, "Configuration loaded");

    match cli.command {
        Command::Configure { origin, timeout_ms, store } => {
            // Env overrides are per process and must not end up in the file.
            let mut saved = Config::load()?;
            if let Some(origin) = origin {
                saved.origin = origin;
            }
            if let Some(timeout_ms) = timeout_ms {
                saved.timeout_ms = timeout_ms;
            }
            if let Some(store) = store {
                saved.store = store;
            }
            saved.save()?;
            println!(
                "Saved config (origin: {}, timeout: {} ms, store: {:?})",
                saved.origin, saved.timeout_ms, saved.store
            );
        }
        Command::Login { token, from } => {
            let start = from.unwrap_or_else(|| surface.login_path.clone());
            let token = match token {
                Some(t) => t,
                None => rpassword::prompt_password("Token: ").context("Failed to read token")?,
            };
            let token = token.trim().to_string();
            if token.is_empty() {
                anyhow::bail!("Token must not be empty");
            }
            let (gate, _) = build_gate(surface, &config, &start)?;
            let nav = gate.login(Credential::new(token))?;
            println!("Signed in; now at {}", nav.route().full_path);
        }
        Command::Logout => {
            let start = surface.home_path.clone();
            let (gate, _) = build_gate(surface, &config, &start)?;
            let nav = gate.logout()?;
            println!("Signed out; now at {}", nav.route().full_path);
        }
        Command::Status => {
            let start = surface.home_path.clone();
            let name = surface.name.clone();
            let (gate, _) = build_gate(surface, &config, &start)?;
            let state = if gate.is_authenticated() { "signed in" } else { "signed out" };
            println!("{}: {} (backend: {:?}, origin: {})", name, state, config.store, config.origin);
        }
        Command::Visit { path } => {
            let start = surface.home_path.clone();
            let (gate, _) = build_gate(surface, &config, &start)?;
            print_navigation(&path, &gate.router().push(&path)?);
        }
        Command::Request { method, path, body, from } => {
            let start = from.unwrap_or_else(|| surface.home_path.clone());
            let (gate, navigator) = build_gate(surface, &config, &start)?;
            let result = send_request(&gate, &method, &path, body.as_deref()).await;
            for location in navigator.visits() {
                println!("-> navigated to {}", location);
            }
            result?;
        }
    }

    Ok(())
}

fn build_gate(surface: Surface, config: &Config, start: &str) -> Result<(Gate, Arc<HistoryNavigator>)> {
    let navigator = Arc::new(HistoryNavigator::new(start));
    let gate = Gate::new(surface, config, navigator.clone())?;
    Ok((gate, navigator))
}

fn print_navigation(requested: &str, nav: &Navigation) {
    match nav {
        Navigation::Committed { route, redirected_from: Some(_) } => {
            println!("{} -> redirected to {}", requested, route.full_path);
        }
        Navigation::Committed { route, redirected_from: None } => {
            println!("{} -> allowed ({})", requested, route.name.as_deref().unwrap_or("unmatched"));
        }
        Navigation::Aborted { route } => {
            println!("{} -> aborted", route.full_path);
        }
    }
}

async fn send_request(gate: &Gate, method: &str, path: &str, body: Option<&str>) -> Result<()> {
    let method_name = method.to_ascii_uppercase();
    let method = Method::from_bytes(method_name.as_bytes())
        .with_context(|| format!("Invalid HTTP method: {}", method))?;

    let mut builder = gate.http().request(method, path)?;
    if let Some(body) = body {
        let json: serde_json::Value = serde_json::from_str(body).context("Request body is not valid JSON")?;
        builder = builder.json(&json);
    }

    match gate.http().send(builder).await {
        Ok(response) => {
            let status = response.status();
            let text = response.text().await.context("Failed to read response body")?;
            println!("{}", status);
            if !text.is_empty() {
                println!("{}", text);
            }
        }
        Err(e) => {
            info!(error = %e, "Request failed");
            if !gate.is_authenticated() {
                println!("(no credential stored; currently at {})", gate.navigator().location());
            }
            return Err(e).context(format!("{} {} failed", method_name, path));
        }
    }
    Ok(())
}
