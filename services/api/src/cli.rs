use crate::commands::{self, ComplaintsCommand};
use crate::server;
use clap::{Args, Parser, Subcommand};
use complaint_desk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Complaint Desk",
    about = "Run the complaint intake service or manage complaints from the command line",
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
    /// Submit, inspect and triage complaints in the configured store
    Complaints {
        #[command(subcommand)]
        command: ComplaintsCommand,
    },
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
        Command::Complaints { command } => commands::run(command),
    }
}
