use std::collections::BTreeMap;

use anyhow::Result;
use dayflow_core::error::DayflowResult;
use dayflow_core::store::SubscriptionStore;
use owo_colors::OwoColorize;

use super::App;
use crate::render::pluralize;
use crate::utils::tui;

pub async fn run(app: &App, id: Option<i64>) -> Result<()> {
    let results: BTreeMap<i64, DayflowResult<usize>> = match id {
        Some(id) => {
            let spinner = tui::create_spinner(format!("Syncing #{}", id));
            let result = app.sync.sync(id).await;
            spinner.finish_and_clear();
            BTreeMap::from([(id, result)])
        }
        None => {
            let spinner = tui::create_spinner("Syncing enabled subscriptions".to_string());
            let results = app.sync.sync_all_enabled().await;
            spinner.finish_and_clear();
            results?
        }
    };

    if results.is_empty() {
        println!("{}", "No enabled subscriptions to sync".dimmed());
        return Ok(());
    }

    let mut imported = 0;
    let mut failed = 0;

    for (id, result) in &results {
        let name = app
            .store
            .get_subscription(*id)?
            .map(|s| s.name)
            .unwrap_or_else(|| format!("#{}", id));

        println!("📅 {}", name);
        match result {
            Ok(count) => {
                println!("   {} {} {}", "+".green(), count, pluralize("event", *count));
                imported += count;
            }
            Err(e) => {
                println!("   {}", e.to_string().red());
                failed += 1;
            }
        }
    }

    let synced = results.len() - failed;
    println!(
        "\nSynced {} {}, {} {}",
        synced,
        pluralize("subscription", synced),
        imported,
        pluralize("event", imported)
    );
    if failed > 0 {
        anyhow::bail!("{} {} failed to sync", failed, pluralize("subscription", failed));
    }

    Ok(())
}
