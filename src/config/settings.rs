use std::time::Duration;

use serde::Deserialize;

use crate::client::ReceiveMode;

/// Top-level configuration settings for the application.
///
/// Includes settings for the broker, logging and default consumer behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub broker: BrokerSettings,
    pub logging: LoggingSettings,
    pub consumer: ConsumerSettings,
}

/// Configuration settings for the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerSettings {
    /// Tick of the background dispatch loop, in milliseconds. Always > 0.
    pub dispatch_interval_ms: u64,
}

impl BrokerSettings {
    pub fn dispatch_interval(&self) -> Duration {
        Duration::from_millis(self.dispatch_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Default behaviour for consumers built by the binary.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerSettings {
    pub receive_mode: ReceiveMode,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub broker: Option<PartialBrokerSettings>,
    pub logging: Option<PartialLoggingSettings>,
    pub consumer: Option<PartialConsumerSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub dispatch_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

/// Partial consumer settings.
///
/// `receive_mode` stays a raw string here; it is validated while merging.
#[derive(Debug, Deserialize)]
pub struct PartialConsumerSettings {
    pub receive_mode: Option<String>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            broker: BrokerSettings {
                dispatch_interval_ms: 250,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
            consumer: ConsumerSettings {
                receive_mode: ReceiveMode::Record,
            },
        }
    }
}
