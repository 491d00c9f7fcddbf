use anyhow::Result;
use owo_colors::OwoColorize;

use super::App;

pub async fn run(app: &App, url: &str) -> Result<()> {
    match app.sync.check_url(url).await {
        Ok(()) => {
            println!("{} {}", "✓".green(), url);
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red(), url);
            Err(e.into())
        }
    }
}
