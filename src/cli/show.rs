use super::ui;
use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::metrics::AttrValue;
use crate::providers::avanza::AvanzaProvider;
use crate::tracker::{self, InstrumentTracker, PublishedRecord};
use anyhow::Result;
use comfy_table::Cell;
use serde_json::json;
use std::sync::Arc;

/// Refresh every configured instrument once and render the full records.
pub async fn run(config: &AppConfig, as_json: bool) -> Result<()> {
    if config.instruments.is_empty() {
        println!("No instruments configured.");
        return Ok(());
    }

    let cache = Arc::new(Cache::new());
    let provider = AvanzaProvider::new(&config.provider.base_url, cache);
    let mut trackers: Vec<InstrumentTracker> = config
        .instruments
        .iter()
        .cloned()
        .map(InstrumentTracker::new)
        .collect();

    let pb = ui::new_progress_bar(trackers.len() as u64, true);
    pb.set_message("Refreshing instruments...");
    tracker::refresh_all(&mut trackers, &provider, &pb).await;
    pb.finish_and_clear();

    if as_json {
        let records: Vec<serde_json::Value> = trackers
            .iter()
            .map(|t| match t.published() {
                Some(published) => json!({
                    "name": published.name,
                    "value": published.record.value,
                    "unit": published.record.unit,
                    "attributes": published.record.attributes,
                    "trend": published.trend.as_str(),
                    "icon": published.icon,
                }),
                None => json!({
                    "name": t.display_name(),
                    "error": "refresh failed",
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let num_trackers = trackers.len();
    for (i, t) in trackers.iter().enumerate() {
        match t.published() {
            Some(published) => display_record(published),
            None => println!(
                "{}: {}",
                ui::style_text(&t.display_name(), ui::StyleType::Title),
                ui::style_text("refresh failed", ui::StyleType::Error)
            ),
        }
        if i < num_trackers - 1 {
            ui::print_separator();
        }
    }

    Ok(())
}

fn display_record(published: &PublishedRecord) {
    println!(
        "\n{}  [{}]",
        ui::style_text(&published.name, ui::StyleType::Title),
        published.icon
    );
    println!(
        "Price: {} {}",
        ui::style_text(
            &format!("{:.2}", published.record.value),
            ui::StyleType::Value
        ),
        published.record.unit
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Attribute"), ui::header_cell("Value")]);
    for (name, value) in &published.record.attributes {
        let cell = match (name.as_str(), value) {
            ("change", AttrValue::Number(n)) => ui::change_cell(*n, ""),
            ("changePercent", AttrValue::Number(n)) => ui::change_cell(*n, "%"),
            (_, value) => ui::attr_cell(value),
        };
        table.add_row(vec![Cell::new(name), cell]);
    }
    println!("{table}");
}
