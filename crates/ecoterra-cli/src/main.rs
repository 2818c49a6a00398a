//! Ecoterra CLI - drive the session manager from a terminal.
//!
//! Each invocation restores the persisted session, runs one action through
//! the session store and prints the resulting state.

mod cli;

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use ecoterra_core::models::FieldError;
use ecoterra_core::{Config, LoginRequest, RegisterRequest, SessionState, SessionStore};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

/// Log file name in the cache directory
const LOG_FILE: &str = "ecoterra.log";

/// Initialize the tracing subscriber, logging to a file in `log_dir`
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    let cache_dir = config.cache_dir()?;
    std::fs::create_dir_all(&cache_dir)?;
    let _log_guard = init_tracing(&cache_dir);
    info!(api = %config.api_base_url, storage = ?config.storage, "Ecoterra CLI starting");

    let store = SessionStore::open(config.gateway(&cache_dir)?).await;

    let ok = match cli.command {
        Commands::Login {
            email,
            remember,
            password,
        } => {
            let email = match email {
                Some(email) => email,
                None => prompt_email(config.last_email.as_deref())?,
            };
            let password = match password.password {
                Some(password) => password,
                None => rpassword::prompt_password("Password: ")?,
            };
            let request = LoginRequest::new(email.clone(), password).remember_me(remember);
            if let Err(errors) = request.validate() {
                print_field_errors(&errors);
                return Ok(ExitCode::FAILURE);
            }

            let ok = store.login(&request).await;
            if ok {
                config.last_email = Some(email);
                config.save()?;
            }
            ok
        }
        Commands::Register {
            full_name,
            username,
            email,
            category,
            password,
        } => {
            let password = match password.password {
                Some(password) => password,
                None => {
                    let password = rpassword::prompt_password("Password: ")?;
                    let confirm = rpassword::prompt_password("Konfirmasi password: ")?;
                    if confirm != password {
                        eprintln!("Password tidak cocok");
                        return Ok(ExitCode::FAILURE);
                    }
                    password
                }
            };
            let request = RegisterRequest {
                full_name,
                username,
                email,
                password,
                category,
            };
            if let Err(errors) = request.validate() {
                print_field_errors(&errors);
                return Ok(ExitCode::FAILURE);
            }
            store.register(&request).await
        }
        Commands::Logout => store.logout().await,
        Commands::Status => store.state().is_authenticated(),
        Commands::Verify => store.verify().await,
    };

    print_state(&store.state());
    info!(ok, "Ecoterra CLI finished");
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn prompt_email(last_email: Option<&str>) -> Result<String> {
    match last_email {
        Some(last) => print!("Email [{}]: ", last),
        None => print!("Email: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match (input.is_empty(), last_email) {
        (true, Some(last)) => last.to_string(),
        _ => input.to_string(),
    })
}

fn print_field_errors(errors: &[FieldError]) {
    for error in errors {
        eprintln!("{:?}: {}", error.field, error.message);
    }
}

fn print_state(state: &SessionState) {
    println!("Status : {}", state.phase.as_str());
    if let Some(ref user) = state.user {
        println!("User   : {} <{}> ({})", user.display_name(), user.email, user.category);
    }
    if let Some(ref message) = state.message {
        println!("Pesan  : {}", message);
    }
    if let Some(ref error) = state.error {
        println!("Error  : {}", error);
    }
}
