use anyhow::Result;
use dayflow_core::event::EventColor;
use dayflow_core::store::SubscriptionStore;
use owo_colors::OwoColorize;

use super::App;
use crate::render::{pluralize, Render};
use crate::utils::tui;

pub async fn add(app: &App, name: &str, url: &str, color: EventColor, sync_now: bool) -> Result<()> {
    let id = app.sync.subscribe(name, url, color)?;
    println!("Subscribed to {} as #{}", name.bold(), id);

    if !sync_now {
        println!("Run `dayflow sync --id {}` to fetch its events.", id);
        return Ok(());
    }

    let spinner = tui::create_spinner(format!("Syncing {}", name));
    let result = app.sync.sync(id).await;
    spinner.finish_and_clear();

    match result {
        Ok(count) => println!("   {} {} {}", "+".green(), count, pluralize("event", count)),
        // The subscription stays; its status records the failure
        Err(e) => println!("   {}", e.to_string().red()),
    }
    Ok(())
}

pub async fn remove(app: &App, id: i64) -> Result<()> {
    let removed = app.sync.unsubscribe(id).await?;
    println!(
        "Removed subscription #{} and {} {}",
        id,
        removed,
        pluralize("event", removed)
    );
    Ok(())
}

pub fn set_enabled(app: &App, id: i64, enabled: bool) -> Result<()> {
    app.sync.set_enabled(id, enabled)?;
    let state = if enabled { "enabled" } else { "disabled" };
    println!("Subscription #{} {}", id, state);
    Ok(())
}

pub fn list(app: &App) -> Result<()> {
    let subscriptions = app.store.list_subscriptions()?;

    if subscriptions.is_empty() {
        println!("{}", "No subscriptions".dimmed());
        println!("\nAdd one with:\n  dayflow subscribe <name> <url>");
        return Ok(());
    }

    for subscription in &subscriptions {
        println!("{}", subscription.render());
    }
    Ok(())
}
