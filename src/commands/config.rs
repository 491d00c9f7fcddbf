use anyhow::Result;
use dayflow_core::config::DayflowConfig;
use owo_colors::OwoColorize;

use super::App;

pub fn run(app: &App) -> Result<()> {
    let config_path = DayflowConfig::config_path()?;

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Store:   {}", app.config.store_path().display());

    println!("\n{}", "Sync".bold());
    println!("  Timeout:     {}s", app.config.fetch_timeout_secs);
    println!("  User-Agent:  {}", app.config.user_agent);
    println!("  Max feed:    {} bytes", app.config.max_feed_bytes);

    Ok(())
}
