//! Provider-specific notification parsers and the primitives they share.

mod classify;
mod cloudwatch;
mod dedup;
mod extract;
mod health;
pub mod timestamp;

pub use classify::{AlarmState, HealthCategory};
pub use cloudwatch::{error_event, CloudWatchAlarmParser, PARSE_ERROR_TITLE};
pub use dedup::{alarm_event_key, content_hash, BUCKET_SECONDS};
pub use health::HealthEventParser;
pub use timestamp::{RawTimestamp, TimestampFormat};

/// Options handed over by the host. Parsers receive them untouched.
pub type ParserOptions = serde_json::Map<String, serde_json::Value>;
