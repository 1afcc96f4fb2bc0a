//! Configuration subcommands.

use clap::Subcommand;
use thermalog_core::{Config, TemperatureUnit};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Set the device name broadcast to the companion
    SetDeviceName { name: String },
    /// Set the default temperature unit (f | c)
    SetUnit { unit: String },
    /// Enable or disable companion sync
    SetSync {
        #[arg(value_parser = clap::value_parser!(bool))]
        enabled: bool,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }
        ConfigAction::SetDeviceName { name } => {
            config.sync.device_name = name;
        }
        ConfigAction::SetUnit { unit } => {
            config.temperature_unit = match unit.as_str() {
                "f" | "fahrenheit" => TemperatureUnit::Fahrenheit,
                "c" | "celsius" => TemperatureUnit::Celsius,
                other => return Err(format!("unknown unit: {other}").into()),
            };
        }
        ConfigAction::SetSync { enabled } => {
            config.sync.enabled = enabled;
        }
    }
    config.save()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
