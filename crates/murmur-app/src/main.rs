//! Murmur console binary - composition root.
//!
//! Parses the command line, picks a gateway (live HTTP agent or the
//! built-in mock), builds the console, runs the requested operation, and
//! renders the resulting state to stdout. Logs go to stderr so command
//! output stays pipeable. The process exits nonzero exactly when the
//! operation left an error surfaced.

mod cli;
mod settings;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::broadcast;

use murmur_console::{Console, ConsoleState, FIELDS};
use murmur_core::{AgentEvent, SessionStatus};
use murmur_gateway::{AgentGateway, HttpGateway, MockGateway};

use cli::{CliArgs, Command, ConfigAction};
use settings::ConsoleSettings;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    if args.mock {
        return run(Arc::new(MockGateway::new()), args.command).await;
    }

    let settings = ConsoleSettings::load_or_default(&settings::settings_path());
    let url = args.resolve_agent_url(settings.agent.url.as_deref());
    tracing::debug!(url = %url, "Connecting to agent");

    match HttpGateway::new(url) {
        Ok(gateway) => run(Arc::new(gateway), args.command).await,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run<G: AgentGateway>(gateway: Arc<G>, command: Command) -> ExitCode {
    let console = Console::new(Arc::clone(&gateway));

    match command {
        Command::Status => {
            console.reload().await;
            if console.state().last_error().is_none() {
                print_status(console.state());
            }
        }
        Command::Config { action } => match action {
            ConfigAction::Show => {
                console.reload().await;
                if console.state().last_error().is_none() {
                    print_config(console.state());
                }
            }
            ConfigAction::Set { path, value } => {
                // Edit against the agent's current configuration, not the
                // built-in defaults, then persist the whole draft.
                console.reload().await;
                if console.state().last_error().is_none() {
                    if let Err(e) = console.state().draft().set(&path, &value) {
                        eprintln!("error: {e}");
                        eprintln!("editable fields: {}", FIELDS.join(", "));
                        return ExitCode::FAILURE;
                    }
                    console.save().await;
                }
            }
            ConfigAction::Reset => {
                console.reset().await;
                if console.state().last_error().is_none() {
                    print_config(console.state());
                }
            }
        },
        Command::Toggle => {
            // Subscribe before issuing so the confirming event cannot be
            // missed; the command response itself says nothing about the
            // new state.
            let mut events = gateway.events();
            console.toggle_recording().await;
            if console.state().last_error().is_none() {
                match tokio::time::timeout(Duration::from_secs(2), status_event(&mut events))
                    .await
                {
                    Ok(Some(status)) => println!("session: {}", status.state),
                    _ => println!("toggle accepted; no status report yet"),
                }
            }
        }
        Command::Test => {
            console.test().await;
            if let Some(text) = console.state().transcript() {
                println!("{text}");
            }
        }
        Command::Autostart { enabled } => {
            console.set_autostart(enabled).await;
            if console.state().last_error().is_none() {
                println!("autostart: {}", console.state().autostart().as_str());
            }
        }
        Command::Watch => return watch(&console, gateway.events()).await,
    }

    finish(console.state())
}

/// Follow pushed agent events until interrupted.
async fn watch<G: AgentGateway>(
    console: &Console<G>,
    mut events: broadcast::Receiver<AgentEvent>,
) -> ExitCode {
    console.reload().await;
    if let Some(error) = console.state().last_error() {
        eprintln!("error: {error}");
        return ExitCode::FAILURE;
    }
    print_status(console.state());
    println!();
    println!("watching agent events, ctrl-c to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return ExitCode::SUCCESS,
            received = events.recv() => match received {
                Ok(event) => print_event(&event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    eprintln!("({missed} events missed)");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    eprintln!("event stream closed");
                    return ExitCode::FAILURE;
                }
            },
        }
    }
}

/// Wait for the next `status_changed` event, skipping everything else.
async fn status_event(events: &mut broadcast::Receiver<AgentEvent>) -> Option<SessionStatus> {
    loop {
        match events.recv().await {
            Ok(AgentEvent::StatusChanged { status }) => return Some(status),
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

fn print_status(state: &ConsoleState) {
    let status = state.view().get();
    println!("session:    {}", status.state);
    if let Some(error) = &status.last_error {
        println!("last error: {error}");
    }
    println!("api key:    {}", state.key_presence().as_str());
    println!("autostart:  {}", state.autostart().as_str());
}

fn print_config(state: &ConsoleState) {
    let config = state.draft().get();
    match serde_json::to_string_pretty(&*config) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("error: {e}"),
    }
}

fn print_event(event: &AgentEvent) {
    let stamp = chrono::Local::now().format("%H:%M:%S");
    match event {
        AgentEvent::StatusChanged { status } => match &status.last_error {
            Some(error) => println!("[{stamp}] status: {} ({error})", status.state),
            None => println!("[{stamp}] status: {}", status.state),
        },
        AgentEvent::TranscriptReady { text } => println!("[{stamp}] transcript: {text}"),
        AgentEvent::Error { message } => println!("[{stamp}] error: {message}"),
        other => println!("[{stamp}] {}", other.event_name()),
    }
}

fn finish(state: &ConsoleState) -> ExitCode {
    match state.last_error() {
        Some(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}
