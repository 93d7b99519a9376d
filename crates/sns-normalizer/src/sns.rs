//! SNS envelope handling and subscription confirmation.

use async_trait::async_trait;
use serde_json::Value;
use std::borrow::Cow;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    SubscriptionConfirmation,
    UnsubscribeConfirmation,
    Notification,
    Unknown,
}

impl MessageType {
    /// Reads the `Type` discriminator of an envelope.
    pub fn of(payload: &Value) -> Self {
        match payload.get("Type").and_then(Value::as_str) {
            Some("SubscriptionConfirmation") => MessageType::SubscriptionConfirmation,
            Some("UnsubscribeConfirmation") => MessageType::UnsubscribeConfirmation,
            Some("Notification") => MessageType::Notification,
            _ => MessageType::Unknown,
        }
    }
}

/// Returns the decoded `Message` when the payload is an envelope, or the
/// payload itself when it is already a bare message body.
pub fn unwrap_message(payload: &Value) -> Result<Cow<'_, Value>> {
    if !payload.is_object() {
        return Err(Error::Parse("notification payload is not a JSON object".into()));
    }
    match payload.get("Message") {
        Some(_) => decode_message(payload).map(Cow::Owned),
        None => Ok(Cow::Borrowed(payload)),
    }
}

/// Decodes the JSON text carried in the envelope's `Message` field.
pub fn decode_message(payload: &Value) -> Result<Value> {
    let message = payload
        .get("Message")
        .ok_or_else(|| Error::Parse("envelope has no Message".into()))?;
    let text = message
        .as_str()
        .ok_or_else(|| Error::Parse("envelope Message is not a string".into()))?;

    let decoded: Value = serde_json::from_str(text).map_err(|e| {
        debug!("Undecodable Message: {}", text);
        Error::JsonDecode(e)
    })?;
    if !decoded.is_object() {
        return Err(Error::Parse("envelope Message is not a JSON object".into()));
    }
    Ok(decoded)
}

/// Acknowledges an SNS topic subscription.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionConfirmer: Send + Sync {
    async fn confirm(&self, subscribe_url: &str) -> Result<()>;
}

/// Confirms subscriptions with a GET to the `SubscribeURL`.
pub struct HttpConfirmer {
    client: reqwest::Client,
}

impl HttpConfirmer {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SubscriptionConfirmer for HttpConfirmer {
    async fn confirm(&self, subscribe_url: &str) -> Result<()> {
        let url = Url::parse(subscribe_url)
            .map_err(|e| Error::ConfirmationRequest(format!("invalid SubscribeURL {}: {}", subscribe_url, e)))?;

        debug!("Confirming subscription via {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::ConfirmationRequest(e.to_string()))?;

        // The status is recorded but not acted on.
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        info!("Subscription confirmation answered with {}", status);
        debug!("Subscription confirmation body: {}", body);
        Ok(())
    }
}

/// Logs the confirmation URL without calling it.
pub struct DryRunConfirmer;

#[async_trait]
impl SubscriptionConfirmer for DryRunConfirmer {
    async fn confirm(&self, subscribe_url: &str) -> Result<()> {
        info!("Skipping subscription confirmation for {}", subscribe_url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_type_discriminator() {
        assert_eq!(
            MessageType::of(&json!({ "Type": "SubscriptionConfirmation" })),
            MessageType::SubscriptionConfirmation
        );
        assert_eq!(MessageType::of(&json!({ "Type": "Notification" })), MessageType::Notification);
        assert_eq!(MessageType::of(&json!({ "AlarmName": "x" })), MessageType::Unknown);
        assert_eq!(MessageType::of(&json!({ "Type": 1 })), MessageType::Unknown);
    }

    #[test]
    fn test_unwrap_message_decodes_embedded_json() {
        let payload = json!({ "Type": "Notification", "Message": "{\"AlarmName\":\"cpu-high\"}" });
        let message = unwrap_message(&payload).unwrap();
        assert_eq!(message["AlarmName"], "cpu-high");
    }

    #[test]
    fn test_unwrap_message_passes_bare_body_through() {
        let payload = json!({ "AlarmName": "cpu-high" });
        assert!(matches!(unwrap_message(&payload).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unwrap_message_errors() {
        assert!(matches!(
            unwrap_message(&json!({ "Message": "{not json" })),
            Err(Error::JsonDecode(_))
        ));
        assert!(matches!(unwrap_message(&json!({ "Message": 5 })), Err(Error::Parse(_))));
        assert!(matches!(unwrap_message(&json!({ "Message": "[1, 2]" })), Err(Error::Parse(_))));
        assert!(matches!(unwrap_message(&json!("text")), Err(Error::Parse(_))));
    }

    #[test]
    fn test_decode_message_requires_message() {
        assert!(matches!(decode_message(&json!({ "Type": "Notification" })), Err(Error::Parse(_))));
    }

    #[tokio::test]
    async fn test_http_confirmer_reports_invalid_url() {
        let confirmer = HttpConfirmer::new(Duration::from_secs(1)).unwrap();
        let result = confirmer.confirm("not a url").await;
        assert!(matches!(result, Err(Error::ConfirmationRequest(_))));
    }

    #[tokio::test]
    async fn test_dry_run_confirmer_never_fails() {
        assert!(DryRunConfirmer.confirm("https://sns.example.com/confirm").await.is_ok());
    }
}
