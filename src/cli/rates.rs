use super::ui;
use crate::core::{ExchangeRate, QUOTE_CURRENCY, RateError, RateRequest, RateService};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, Table};
use futures::future::join_all;

type RateRow = (String, Result<ExchangeRate, RateError>);

/// Prints the latest published rates.
///
/// Requests run one after another: the first one fetches the whole current
/// table and the rest are served from cache.
pub async fn run_current(service: &dyn RateService, currencies: &[String]) -> Result<()> {
    let pb = ui::new_progress_bar(currencies.len() as u64);
    pb.set_message("Fetching current rates");
    let mut rows = Vec::with_capacity(currencies.len());
    for currency in currencies {
        let request = RateRequest::current(currency, QUOTE_CURRENCY);
        let result = service.resolve(&request).await;
        pb.inc(1);
        rows.push((request.pair().base.clone(), result));
    }
    pb.finish_and_clear();

    print_rates("Current exchange rates", &rows);
    fail_on_transport_error(&rows)
}

/// Prints rates for `date`, each with the day it was actually quoted on.
pub async fn run_historical(
    service: &dyn RateService,
    date: NaiveDate,
    currencies: &[String],
) -> Result<()> {
    let pb = ui::new_progress_bar(currencies.len() as u64);
    pb.set_message(format!("Fetching rates for {date}"));
    let futures = currencies.iter().map(|currency| {
        let pb = pb.clone();
        async move {
            let request = RateRequest::historical(currency, QUOTE_CURRENCY, date);
            let result = service.resolve(&request).await;
            pb.inc(1);
            (request.pair().base.clone(), result)
        }
    });
    let rows: Vec<RateRow> = join_all(futures).await;
    pb.finish_and_clear();

    print_rates(&format!("Exchange rates on {date}"), &rows);
    fail_on_transport_error(&rows)
}

fn print_rates(title: &str, rows: &[RateRow]) {
    println!("\n{}", ui::style_text(title, ui::StyleType::Title));
    println!("{}", rate_table(rows));

    for (currency, result) in rows {
        if let Err(e) = result {
            println!(
                "{}",
                ui::style_text(&format!("{currency}: {e}"), ui::StyleType::Error)
            );
        }
    }
}

fn rate_table(rows: &[RateRow]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate ({QUOTE_CURRENCY})")),
        ui::header_cell("As of"),
    ]);

    for (currency, result) in rows {
        match result {
            Ok(rate) => table.add_row(vec![
                Cell::new(currency),
                ui::rate_cell(rate.rate),
                Cell::new(rate.date.format("%Y-%m-%d")),
            ]),
            Err(_) => table.add_row(vec![
                Cell::new(currency),
                ui::na_cell(true),
                ui::na_cell(false),
            ]),
        };
    }
    table
}

// Missing rates are shown in the table; a failed remote call fails the command.
fn fail_on_transport_error(rows: &[RateRow]) -> Result<()> {
    match rows.iter().find_map(|(_, result)| match result {
        Err(e @ RateError::Transport(_)) => Some(e),
        _ => None,
    }) {
        Some(e) => Err(e.clone().into()),
        None => Ok(()),
    }
}
