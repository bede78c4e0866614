//! CLI argument definitions for the murmur console.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution for the agent URL: `--agent-url` flag >
//! `MURMUR_AGENT_URL` env var > settings file > built-in default.

use clap::{Parser, Subcommand};

/// Gateway address used when nothing else is configured.
pub const DEFAULT_AGENT_URL: &str = "http://127.0.0.1:7171";

/// Murmur - control surface for the background dictation agent.
#[derive(Parser, Debug)]
#[command(name = "murmur", version, about)]
pub struct CliArgs {
    /// Base URL of the agent's command gateway.
    #[arg(short = 'u', long = "agent-url", global = true)]
    pub agent_url: Option<String>,

    /// Run against a built-in in-memory agent instead of a live one.
    #[arg(long = "mock", global = true)]
    pub mock: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the session state, API key presence, and autostart flag.
    Status,
    /// Inspect or edit the dictation configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Ask the agent to start or stop recording.
    Toggle,
    /// Run a short transcription round trip and print the transcript.
    Test,
    /// Enable or disable launching the agent at session start.
    Autostart {
        /// `on` or `off`.
        #[arg(value_parser = parse_on_off, action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Print agent events as they arrive, until interrupted.
    Watch,
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the agent's current configuration.
    Show,
    /// Set one field and persist the whole configuration.
    Set {
        /// Field path in wire form, e.g. `thresholds.holdMs`.
        path: String,
        /// New value in textual form.
        value: String,
    },
    /// Restore the agent's built-in defaults.
    Reset,
}

impl CliArgs {
    /// Resolve the agent gateway URL.
    ///
    /// Priority: `--agent-url` flag > `MURMUR_AGENT_URL` env var > settings
    /// file > [`DEFAULT_AGENT_URL`].
    pub fn resolve_agent_url(&self, settings_url: Option<&str>) -> String {
        resolve_agent_url(
            self.agent_url.as_deref(),
            std::env::var("MURMUR_AGENT_URL").ok().as_deref(),
            settings_url,
        )
    }
}

fn resolve_agent_url(flag: Option<&str>, env: Option<&str>, settings: Option<&str>) -> String {
    flag.or(env)
        .or(settings)
        .unwrap_or(DEFAULT_AGENT_URL)
        .to_string()
}

fn parse_on_off(raw: &str) -> Result<bool, String> {
    match raw {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(format!("expected 'on' or 'off', got {raw:?}")),
    }
}

// =============================================================================
// Tests
// =============================================================================
