pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::providers::{MnbService, ReversibleService};
use crate::store::KeyValueStore;
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Commands that need the rate service. `setup` is handled by the binary.
#[derive(Debug, Clone)]
pub enum AppCommand {
    Current {
        currencies: Vec<String>,
    },
    Historical {
        date: NaiveDate,
        currencies: Vec<String>,
    },
    Convert {
        amount: Decimal,
        from: String,
        to: String,
        date: Option<NaiveDate>,
    },
    ClearCache,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("mnb-rates starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = if config.cache.persist {
        KeyValueStore::new(&config.default_data_path()?)
    } else {
        KeyValueStore::in_memory()
    };
    let service = MnbService::from_config(&config, &store)?;

    match command {
        AppCommand::Current { currencies } => cli::rates::run_current(&service, &currencies).await,
        AppCommand::Historical { date, currencies } => {
            cli::rates::run_historical(&service, date, &currencies).await
        }
        AppCommand::Convert {
            amount,
            from,
            to,
            date,
        } => {
            let service = ReversibleService::new(service);
            cli::convert::run(&service, amount, &from, &to, date).await
        }
        AppCommand::ClearCache => {
            service.clear_cache().await;
            println!("Rate cache cleared");
            Ok(())
        }
    }
}
