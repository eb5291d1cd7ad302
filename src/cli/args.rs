//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Quick Deals marketplace backend
#[derive(Parser, Debug)]
#[command(name = "quick-deals")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),
}

/// Arguments for the serve command. Unset values fall back to the
/// environment configuration.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Resolve the bind address against configured defaults.
    pub fn bind_addr(&self, host: &str, port: u16) -> String {
        format!(
            "{}:{}",
            self.host.as_deref().unwrap_or(host),
            self.port.unwrap_or(port)
        )
    }
}

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Drop everything and re-run all migrations
    Fresh,
}
