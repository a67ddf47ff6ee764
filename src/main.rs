use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use kursvakt::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for kursvakt::AppCommand {
    fn from(cmd: Commands) -> kursvakt::AppCommand {
        match cmd {
            Commands::Show { json } => kursvakt::AppCommand::Show { json },
            Commands::Watch => kursvakt::AppCommand::Watch,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Refresh once and display the full record per instrument
    Show {
        /// Emit the records as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Refresh periodically and display a summary per cycle
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => kursvakt::cli::setup::setup(),
        Some(cmd) => kursvakt::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
