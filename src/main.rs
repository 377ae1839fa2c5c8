//! Routy account client.
//!
//! A command-line shell around the account flows: sign up, sign in, and
//! sign out against the Routy API, with the session persisted locally.
//! The flows themselves live in `app`; this file owns the prompts, the
//! process lifecycle, and the execution of navigation intents.

mod api;
mod app;
mod auth;
mod config;
mod models;
mod nav;

use std::io::{self, Write};

use anyhow::Result;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use api::AuthApi;
use app::{run_login, run_signup, LoginFlow, LogoutFlow, SignupFlow};
use auth::{FileStore, MemoryStore, SessionStore, StorageLifetime};
use config::Config;
use nav::{oauth_redirect, NavIntent, OAuthProvider, PASSWORD_RESET_ROUTE, SIGNUP_ROUTE};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Set up logging with environment-based filter
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let mut config = Config::load().unwrap_or_default();
    let mut store = SessionStore::new(
        Box::new(FileStore::open(Config::session_path()?)),
        Box::new(MemoryStore::new()),
    );

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("login") => login_command(&args[2..], &mut config, &mut store).await,
        Some("signup") => signup_command(&config).await,
        Some("logout") => logout_command(&mut store).await,
        Some("status") => {
            status_command(&store);
            Ok(())
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("Routy account client\n");
    println!("Usage: routy <command>\n");
    println!("Commands:");
    println!("  login [--redirect PATH] [--no-remember] [--with PROVIDER]");
    println!("          Sign in (PROVIDER: kakao, google, naver)");
    println!("  signup  Create an account");
    println!("  logout  Clear the stored session");
    println!("  status  Show the stored session, if any");
}

async fn login_command(args: &[String], config: &mut Config, store: &mut SessionStore) -> Result<()> {
    let redirect_to = flag_value(args, "--redirect");

    // Provider buttons hand off to the OAuth route; no credential
    // exchange happens on this side of it.
    if let Some(slug) = flag_value(args, "--with") {
        match OAuthProvider::from_slug(&slug) {
            Some(provider) => {
                execute_intent(oauth_redirect(provider, redirect_to.as_deref())).await;
                return Ok(());
            }
            None => {
                println!("Unknown provider: {}", slug);
                return Ok(());
            }
        }
    }

    println!("No account? -> {}  Forgot password? -> {}", SIGNUP_ROUTE, PASSWORD_RESET_ROUTE);

    let mut flow = LoginFlow::new(redirect_to);
    flow.set_remember_me(!args.iter().any(|a| a == "--no-remember"));
    flow.on_success(Box::new(|profile| {
        if let Some(nickname) = profile.and_then(|p| p.nickname.as_deref()) {
            println!("Welcome back, {}!", nickname);
        }
        Ok(())
    }));

    let email = prompt("Email", config.last_email.as_deref())?;
    flow.set_email(&email);
    let password = rpassword::prompt_password("Password: ")?;
    flow.set_password(&password);

    if !flow.remember_me() {
        println!("This session will not be remembered after exit.");
    }

    // Submission is disabled while any field check fails; run the
    // ordered checks anyway so the first failure's message surfaces.
    if !flow.can_submit() {
        flow.submit();
        if let Some(message) = flow.message() {
            println!("{}", message);
        }
        return Ok(());
    }

    let gateway = AuthApi::new(config.base_url())?;
    let intent = run_login(&mut flow, &gateway, store).await;
    debug!(phase = ?flow.phase(), "Login flow settled");

    if let Some(message) = flow.message() {
        println!("{}", message);
    }

    if let Some(intent) = intent {
        config.last_email = Some(flow.email().trim().to_string());
        if let Err(e) = config.save() {
            warn!(error = %e, "Failed to save config");
        }
        execute_intent(intent).await;
    }
    Ok(())
}

async fn signup_command(config: &Config) -> Result<()> {
    let mut flow = SignupFlow::new();
    flow.on_success(Box::new(|profile| {
        if let Some(nickname) = profile.and_then(|p| p.nickname.as_deref()) {
            println!("Welcome, {}!", nickname);
        }
        Ok(())
    }));

    flow.set_email(&prompt("Email", None)?);
    flow.set_nickname(&prompt("Nickname (2-12 letters or digits)", None)?);
    flow.set_password(&rpassword::prompt_password("Password (8-16 characters): ")?);

    if !flow.can_submit() {
        flow.submit();
        if let Some(message) = flow.message() {
            println!("{}", message);
        }
        return Ok(());
    }

    let gateway = AuthApi::new(config.base_url())?;
    let intent = run_signup(&mut flow, &gateway).await;
    debug!(phase = ?flow.phase(), "Signup flow settled");

    if let Some(message) = flow.message() {
        println!("{}", message);
    }

    if let Some(intent) = intent {
        execute_intent(intent).await;
    }
    Ok(())
}

async fn logout_command(store: &mut SessionStore) -> Result<()> {
    let mut flow = LogoutFlow::new();
    let intent = flow.enter(store);

    if let Some(message) = flow.message() {
        println!("{}", message);
    }

    // The delayed move home rides a cancellable timer: ^C before the
    // delay elapses tears the flow down and the navigation never fires.
    if let NavIntent::Delayed { path, delay, replace } = intent {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = tokio::signal::ctrl_c() => flow.teardown(),
        }
        if !flow.is_torn_down() {
            print_route(&path, replace);
        }
    }
    Ok(())
}

fn status_command(store: &SessionStore) {
    match store.read_lifetime() {
        Some(lifetime) => {
            let scope = match lifetime {
                StorageLifetime::Durable => "stays signed in",
                StorageLifetime::Ephemeral => "this session only",
            };
            match store.profile().and_then(|p| p.nickname) {
                Some(nickname) => println!("Signed in as {} ({})", nickname, scope),
                None => println!("Signed in ({})", scope),
            }
        }
        None => println!("Not signed in"),
    }
}

/// Carry out a navigation intent. Routing in this shell is informational:
/// the destination is printed so the surrounding tooling can follow the
/// move.
async fn execute_intent(intent: NavIntent) {
    match intent {
        NavIntent::Push(path) => print_route(&path, false),
        NavIntent::Replace(path) => print_route(&path, true),
        NavIntent::Back { fallback } => println!("-> back (falling back to {})", fallback),
        NavIntent::Delayed { path, delay, replace } => {
            // ^C during the delay drops the pending move instead of firing it.
            tokio::select! {
                _ = tokio::time::sleep(delay) => print_route(&path, replace),
                _ = tokio::signal::ctrl_c() => {}
            }
        }
    }
}

fn print_route(path: &str, replace: bool) {
    if replace {
        println!("-> {} (replacing history)", path);
    } else {
        println!("-> {}", path);
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// Read a line from stdin, offering `default` when the input is empty.
fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(default) => print!("{} [{}]: ", label, default),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        if let Some(default) = default {
            return Ok(default.to_string());
        }
    }
    Ok(input.to_string())
}
