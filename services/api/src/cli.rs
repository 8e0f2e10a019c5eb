use crate::commands::{run_roles, run_token, TokenArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use marketplace_core::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Property Marketplace",
    about = "Run the property marketplace API and inspect its access model",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print every role with its rank and granted permissions
    Roles,
    /// Mint a bearer token for local testing with the configured signing secret
    Token(TokenArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Roles => {
            run_roles();
            Ok(())
        }
        Command::Token(args) => run_token(args),
    }
}
