//! Settings command handler.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};

/// Show the active configuration
#[derive(Args, Debug)]
pub struct SettingsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SettingsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        print_settings(config, self.json)
    }
}

/// Print the configuration info table.
pub fn print_settings(config: &AppConfig, json: bool) -> AppResult<()> {
    let info = config.info();

    if json {
        let output: serde_json::Map<String, serde_json::Value> = info
            .into_iter()
            .map(|(key, value)| (key.to_string(), serde_json::Value::String(value)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let width = info.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in info {
        println!("{:width$}  {}", key, value, width = width);
    }
    Ok(())
}
