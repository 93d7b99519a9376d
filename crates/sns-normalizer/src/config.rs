use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::parsers::ParserOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub confirmation: ConfirmationConfig,
    #[serde(default)]
    pub parser_options: ParserOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationConfig {
    /// Upper bound for the subscription confirmation request.
    pub timeout_secs: u64,
}

impl ConfirmationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn load() -> crate::Result<Self> {
        // Load environment variables from .env file if it exists
        let _ = dotenvy::dotenv();

        let parser_options = match std::env::var("PARSER_OPTIONS") {
            Ok(raw) if !raw.trim().is_empty() => parse_options(&raw)?,
            _ => ParserOptions::new(),
        };

        let config = Config {
            server: ServerConfig {
                addr: std::env::var("SERVER_ADDR")
                    .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            },
            confirmation: ConfirmationConfig {
                timeout_secs: std::env::var("CONFIRMATION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            },
            parser_options,
        };

        if config.confirmation.timeout_secs == 0 {
            return Err(crate::Error::Config(
                "CONFIRMATION_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }
}

fn parse_options(raw: &str) -> crate::Result<ParserOptions> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(options)) => Ok(options),
        Ok(_) => Err(crate::Error::Config(
            "PARSER_OPTIONS must be a JSON object".to_string(),
        )),
        Err(e) => Err(crate::Error::Config(format!(
            "PARSER_OPTIONS is not valid JSON: {}",
            e
        ))),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                addr: "0.0.0.0:8080".to_string(),
            },
            confirmation: ConfirmationConfig { timeout_secs: 10 },
            parser_options: ParserOptions::new(),
        }
    }
}
