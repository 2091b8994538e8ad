//! Memory Vault TUI - a terminal client for a personal memory vault.
//!
//! Sign in, browse uploaded photos, audio and video, write a diary entry for
//! each one and pin notes to moments of an audio track.

mod app;
mod ui;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use memvault_core::api::{ApiClient, Gateway, Vault};
use memvault_core::auth::{self, Credential, SessionStore};
use memvault_core::config::Config;
use memvault_core::guard::Screen;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written while the TUI owns the terminal
const LOG_FILE: &str = "memvault.log";

/// Initialize the tracing subscriber for logging.
///
/// The TUI logs to a file under the cache directory since stderr is hidden
/// behind the alternate screen; CLI commands log to stderr.
/// Use RUST_LOG to control the level (e.g. RUST_LOG=memvault_core=debug).
fn init_tracing(log_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: ignoring unreadable config: {:#}", e);
        Config::default()
    });
    let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    let reset_token = match args.get(1).map(String::as_str) {
        Some("--reset") => Some(args.get(2).cloned().unwrap_or_default()),
        _ => None,
    };
    if let (Some(command), None) = (args.get(1), &reset_token) {
        let _guard = init_tracing(None);
        return match command.as_str() {
            "--login" => cli_login(config, cache_dir).await,
            "--whoami" => cli_whoami(cache_dir),
            "--logout" => cli_logout(cache_dir),
            "--list" => cli_list(config, cache_dir).await,
            "--help" | "-h" => {
                print_usage();
                Ok(())
            }
            other => {
                print_usage();
                anyhow::bail!("Unknown option: {}", other)
            }
        };
    }

    if let Err(e) = std::fs::create_dir_all(&cache_dir) {
        eprintln!("Warning: cannot create {}: {}", cache_dir.display(), e);
    }
    let _guard = init_tracing(Some(&cache_dir));
    run_tui(config, cache_dir, reset_token).await
}

fn print_usage() {
    eprintln!("Usage: memvault [OPTION]");
    eprintln!();
    eprintln!("  (none)          Start the terminal UI");
    eprintln!("  --login         Sign in with username/email and password");
    eprintln!("  --whoami        Show the signed-in user");
    eprintln!("  --logout        Sign out and forget the session");
    eprintln!("  --list          Print your files as JSON");
    eprintln!("  --reset TOKEN   Open the password reset form for a mailed token");
}

async fn run_tui(config: Config, cache_dir: PathBuf, reset_token: Option<String>) -> Result<()> {
    info!("Memory Vault TUI starting");

    let store = SessionStore::persistent(cache_dir);
    let mut app = App::new(config, store)?;
    app.start_hydration();
    if let Some(token) = reset_token {
        app.navigate(Screen::ResetPassword { token });
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Memory Vault TUI shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Redirect before drawing so protected content never flashes
        app.enforce_guard();

        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Collect finished background tasks and advance playback
        app.tick();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

// ============================================================================
// CLI commands
// ============================================================================

fn prompt(label: &str) -> Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Sign in from the command line and persist the session
async fn cli_login(mut config: Config, cache_dir: PathBuf) -> Result<()> {
    let prefill = config.prefill_username();
    let username = if prefill.is_empty() {
        prompt("Username or email: ")?
    } else {
        let entered = prompt(&format!("Username or email [{}]: ", prefill))?;
        if entered.is_empty() { prefill } else { entered }
    };
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;
    if username.is_empty() || password.is_empty() {
        anyhow::bail!("Username and password are required");
    }

    let api = ApiClient::new(&config.api_base_url())?;
    let store = SessionStore::persistent(cache_dir);
    let session = auth::sign_in(&api, &store, Credential::password(username.clone(), password)).await?;

    config.last_username = Some(username);
    if let Err(e) = config.save() {
        eprintln!("Warning: could not save config: {}", e);
    }
    eprintln!("Signed in as {}", session.display_name);
    Ok(())
}

fn cli_whoami(cache_dir: PathBuf) -> Result<()> {
    let store = SessionStore::persistent(cache_dir);
    store.hydrate()?;
    match store.get() {
        Some(session) => {
            println!("{} (id {})", session.display_name, session.user_id);
            eprintln!(
                "Signed in since {}",
                session.created_at.with_timezone(&chrono::Local).format("%b %d, %Y %H:%M")
            );
        }
        None => eprintln!("Not signed in"),
    }
    Ok(())
}

fn cli_logout(cache_dir: PathBuf) -> Result<()> {
    let store = SessionStore::persistent(cache_dir);
    store.hydrate()?;
    auth::sign_out(&store)?;
    eprintln!("Signed out");
    Ok(())
}

/// Print the signed-in user's files as JSON
async fn cli_list(config: Config, cache_dir: PathBuf) -> Result<()> {
    let store = SessionStore::persistent(cache_dir);
    store.hydrate()?;
    if store.get().is_none() {
        anyhow::bail!("Not signed in. Run `memvault --login` first.");
    }

    let api = ApiClient::new(&config.api_base_url())?;
    let vault = Vault::new(Gateway::new(api), store.clone());
    let files = match vault.list_files().await {
        Ok(files) => files,
        Err(e) if e.is_unauthenticated() => {
            auth::sign_out(&store)?;
            anyhow::bail!("{}", e.user_message());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", serde_json::to_string_pretty(&files)?);
    eprintln!("{} files", files.len());
    Ok(())
}
