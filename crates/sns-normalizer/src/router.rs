use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    event::Event,
    metrics::{CONFIRMATIONS_TOTAL, EVENTS_EMITTED_TOTAL, NOTIFICATIONS_RECEIVED_TOTAL, PARSE_FAILURES_TOTAL},
    parsers::{CloudWatchAlarmParser, HealthEventParser, ParserOptions},
    sns::{MessageType, SubscriptionConfirmer},
    Error, Result,
};

/// Notification source, chosen by the caller from topic configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    CloudWatch,
    Health,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::CloudWatch => "cloudwatch",
            Provider::Health => "health",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cloudwatch" => Ok(Provider::CloudWatch),
            "health" | "phd" => Ok(Provider::Health),
            other => Err(Error::Config(format!("Unknown provider: {}", other))),
        }
    }
}

/// Entry point for raw SNS payloads.
pub struct NotificationRouter {
    confirmer: Arc<dyn SubscriptionConfirmer>,
    cloudwatch: CloudWatchAlarmParser,
    health: HealthEventParser,
}

impl NotificationRouter {
    pub fn new(confirmer: Arc<dyn SubscriptionConfirmer>) -> Self {
        Self {
            confirmer,
            cloudwatch: CloudWatchAlarmParser::new(),
            health: HealthEventParser::new(),
        }
    }

    /// Confirms subscriptions, otherwise parses the payload with the
    /// provider's parser.
    ///
    /// Only health parse errors are returned; CloudWatch failures arrive as
    /// an ERROR event and confirmation failures are logged.
    pub async fn route(
        &self,
        provider: Provider,
        options: &ParserOptions,
        payload: &Value,
    ) -> Result<Vec<Event>> {
        NOTIFICATIONS_RECEIVED_TOTAL
            .with_label_values(&[provider.as_str()])
            .inc();

        match MessageType::of(payload) {
            MessageType::SubscriptionConfirmation => {
                self.confirm_subscription(payload).await;
                return Ok(Vec::new());
            }
            MessageType::UnsubscribeConfirmation => {
                info!(
                    "Topic {} unsubscribed, nothing to parse",
                    payload.get("TopicArn").and_then(serde_json::Value::as_str).unwrap_or("<unknown>")
                );
                return Ok(Vec::new());
            }
            MessageType::Notification | MessageType::Unknown => {}
        }

        debug!("Routing {} notification: {}", provider, payload);
        let result = match provider {
            Provider::CloudWatch => Ok(self.cloudwatch.parse(options, payload)),
            Provider::Health => self.health.parse(options, payload),
        };

        match &result {
            Ok(events) => {
                for event in events {
                    EVENTS_EMITTED_TOTAL
                        .with_label_values(&[provider.as_str(), event.event_type.as_str()])
                        .inc();
                }
                debug!("{} notification produced {} events", provider, events.len());
            }
            Err(e) => {
                PARSE_FAILURES_TOTAL
                    .with_label_values(&[provider.as_str()])
                    .inc();
                warn!("Rejected {} notification: {}", provider, e);
            }
        }
        result
    }

    async fn confirm_subscription(&self, payload: &Value) {
        let Some(subscribe_url) = payload.get("SubscribeURL").and_then(Value::as_str) else {
            warn!("SubscriptionConfirmation without a SubscribeURL");
            CONFIRMATIONS_TOTAL.with_label_values(&["skipped"]).inc();
            return;
        };

        match self.confirmer.confirm(subscribe_url).await {
            Ok(()) => {
                info!("Confirmed subscription via {}", subscribe_url);
                CONFIRMATIONS_TOTAL.with_label_values(&["sent"]).inc();
            }
            Err(e) => {
                warn!("Subscription confirmation via {} failed: {}", subscribe_url, e);
                CONFIRMATIONS_TOTAL.with_label_values(&["failed"]).inc();
            }
        }
    }
}
