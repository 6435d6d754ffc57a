use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use mnb_rates::core::log::init_logging;
use rust_decimal::Decimal;

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

impl From<Commands> for mnb_rates::AppCommand {
    fn from(cmd: Commands) -> mnb_rates::AppCommand {
        match cmd {
            Commands::Current { currencies } => mnb_rates::AppCommand::Current { currencies },
            Commands::Historical { date, currencies } => {
                mnb_rates::AppCommand::Historical { date, currencies }
            }
            Commands::Convert {
                amount,
                from,
                to,
                date,
            } => mnb_rates::AppCommand::Convert {
                amount,
                from,
                to,
                date,
            },
            Commands::ClearCache => mnb_rates::AppCommand::ClearCache,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show the latest published HUF rates
    Current {
        /// Currency codes, e.g. EUR USD JPY
        #[arg(required = true)]
        currencies: Vec<String>,
    },
    /// Show HUF rates on a given day (YYYY-MM-DD)
    Historical {
        date: NaiveDate,
        #[arg(required = true)]
        currencies: Vec<String>,
    },
    /// Convert an amount to or from HUF
    Convert {
        amount: Decimal,
        from: String,
        to: String,
        /// Use the rate of this day instead of the latest one
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Remove all cached rates
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => mnb_rates::cli::setup::setup(),
        Some(cmd) => mnb_rates::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
