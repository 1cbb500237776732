use crate::demo::{run_demo, DemoArgs};
use crate::infra::run_import;
use crate::server;
use clap::{Args, Parser, Subcommand};
use rentals::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Rentals",
    about = "Run the apartment rental service or exercise its workflows from the command line",
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
    /// Validate an apartment fixture and report what would be seeded
    Import(ImportArgs),
    /// Walk through a reservation and a conversation against an in-memory store
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Apartment CSV fixture to seed at startup
    #[arg(long)]
    pub(crate) fixture: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Apartment CSV fixture
    #[arg(long)]
    pub(crate) fixture: PathBuf,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Import(args) => run_import(args),
        Command::Demo(args) => run_demo(args),
    }
}
