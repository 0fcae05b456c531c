//! hub-auth CLI binary entry point.

use hub_auth::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();
    let file_store = cli.file_store.as_deref();

    let result = match cli.command {
        Commands::Login(args) => hub_auth::cli::auth::handle_login(args, file_store).await,
        Commands::Status => hub_auth::cli::auth::handle_status(file_store).await,
        Commands::Token => hub_auth::cli::auth::handle_token(file_store).await,
        Commands::Logout => hub_auth::cli::auth::handle_logout(file_store).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
