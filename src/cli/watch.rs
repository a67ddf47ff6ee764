use super::ui;
use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::metrics::AttrValue;
use crate::providers::avanza::AvanzaProvider;
use crate::tracker::{self, InstrumentTracker};
use anyhow::Result;
use comfy_table::Cell;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Periodic refresh loop: one cycle per interval, every instrument refreshed
/// concurrently, previously published records kept through failed cycles.
pub async fn run(config: &AppConfig) -> Result<()> {
    if config.instruments.is_empty() {
        println!("No instruments configured.");
        return Ok(());
    }

    let mut trackers: Vec<InstrumentTracker> = config
        .instruments
        .iter()
        .cloned()
        .map(InstrumentTracker::new)
        .collect();
    let interval = Duration::from_secs(config.refresh_minutes * 60);
    info!(
        instruments = trackers.len(),
        refresh_minutes = config.refresh_minutes,
        "Starting watch loop"
    );

    loop {
        // A fresh cache per cycle: documents are shared within a cycle (e.g.
        // a conversion pair used by several instruments) but never across
        // cycles.
        let cache = Arc::new(Cache::new());
        let provider = AvanzaProvider::new(&config.provider.base_url, cache);

        let pb = ui::new_progress_bar(trackers.len() as u64, true);
        pb.set_message("Refreshing instruments...");
        tracker::refresh_all(&mut trackers, &provider, &pb).await;
        pb.finish_and_clear();

        println!(
            "\n{}",
            ui::style_text(
                &format!("Quotes as of {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")),
                ui::StyleType::Subtle
            )
        );
        display_summary(&trackers);

        tokio::time::sleep(interval).await;
    }
}

fn display_summary(trackers: &[InstrumentTracker]) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Instrument"),
        ui::header_cell("Price"),
        ui::header_cell("Change"),
        ui::header_cell("Change %"),
        ui::header_cell("Trend"),
    ]);

    for tracker in trackers {
        match tracker.published() {
            Some(published) => {
                let change = match published.record.get("change") {
                    Some(AttrValue::Number(n)) => ui::change_cell(*n, ""),
                    _ => ui::na_cell(false),
                };
                let change_percent = match published.record.get("changePercent") {
                    Some(AttrValue::Number(n)) => ui::change_cell(*n, "%"),
                    _ => ui::na_cell(false),
                };
                table.add_row(vec![
                    Cell::new(&published.name),
                    Cell::new(format!(
                        "{:.2} {}",
                        published.record.value, published.record.unit
                    )),
                    change,
                    change_percent,
                    ui::trend_cell(published.trend),
                ]);
            }
            None => {
                table.add_row(vec![
                    Cell::new(tracker.display_name()),
                    ui::na_cell(true),
                    ui::na_cell(true),
                    ui::na_cell(true),
                    ui::na_cell(true),
                ]);
            }
        }
    }

    println!("{table}");
}
