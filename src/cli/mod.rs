//! CLI entry point for hub-auth.

pub mod auth;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::scope::ScopePreset;

/// hub-auth CLI
#[derive(Parser, Debug)]
#[command(name = "hub-auth", version, about = "OAuth sign-in for the Hub")]
pub struct Cli {
    /// Keep the token in a TOML file under this directory instead of the OS keyring
    #[arg(long, global = true, value_name = "DIR")]
    pub file_store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in through the browser
    Login(LoginArgs),
    /// Show the stored session
    Status,
    /// Print a valid access token, refreshing it if needed
    Token,
    /// Forget the stored session
    Logout,
}

/// Arguments for `hub-auth login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Scope preset (basic, read-access, write-access, full-access, inference-only, discussions)
    #[arg(long)]
    pub scopes: Option<ScopePreset>,

    /// Print the URL without trying to open a browser
    #[arg(long)]
    pub no_browser: bool,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
