use super::ui;
use crate::core::{self, Conversion, RateRequest, RateService};
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub async fn run(
    service: &dyn RateService,
    amount: Decimal,
    from: &str,
    to: &str,
    date: Option<NaiveDate>,
) -> Result<()> {
    let request = match date {
        Some(date) => RateRequest::historical(from, to, date),
        None => RateRequest::current(from, to),
    };

    let spinner = ui::new_spinner(&format!("Converting {request}"));
    let result = core::convert(service, amount, &request).await;
    spinner.finish_and_clear();

    println!("{}", describe(&request, &result?));
    Ok(())
}

fn describe(request: &RateRequest, conversion: &Conversion) -> String {
    let pair = request.pair();
    format!(
        "{} {} = {} {}\n{}",
        conversion.amount,
        pair.base,
        ui::style_text(&conversion.converted.to_string(), ui::StyleType::Value),
        pair.quote,
        ui::style_text(
            &format!(
                "1 {} = {} {} as of {}",
                pair.base,
                conversion.rate,
                pair.quote,
                conversion.date.format("%Y-%m-%d")
            ),
            ui::StyleType::Subtle
        )
    )
}
