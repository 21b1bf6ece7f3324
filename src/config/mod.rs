mod settings;

use crate::client::ReceiveMode;
use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{BrokerSettings, ConsumerSettings, LoggingSettings, Settings};

/// Environment variable prefix, e.g. `BATCHSUB_BROKER__DISPATCH_INTERVAL_MS`.
pub const ENV_PREFIX: &str = "BATCHSUB";

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct, or an error if a value fails validation
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    merge(partial)
}

/// Fill the gaps in `partial` with defaults and validate the result.
fn merge(partial: PartialSettings) -> Result<Settings, ConfigError> {
    let default = Settings::default();

    let dispatch_interval_ms = partial
        .broker
        .as_ref()
        .and_then(|b| b.dispatch_interval_ms)
        .unwrap_or(default.broker.dispatch_interval_ms);
    if dispatch_interval_ms == 0 {
        return Err(ConfigError::Message(
            "broker.dispatch_interval_ms must be greater than zero".to_string(),
        ));
    }

    let receive_mode = match partial
        .consumer
        .as_ref()
        .and_then(|c| c.receive_mode.as_deref())
    {
        Some(raw) => raw
            .parse::<ReceiveMode>()
            .map_err(|e| ConfigError::Message(e.to_string()))?,
        None => default.consumer.receive_mode,
    };

    Ok(Settings {
        broker: BrokerSettings {
            dispatch_interval_ms,
        },
        logging: LoggingSettings {
            level: partial
                .logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.logging.level),
        },
        consumer: ConsumerSettings { receive_mode },
    })
}
