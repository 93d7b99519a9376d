use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use super::classify::HealthCategory;
use super::extract::{allowed_scalars, scalar_string};
use super::timestamp::{self, TimestampFormat};
use super::ParserOptions;
use crate::event::{Event, EventType, Resource};
use crate::sns::{decode_message, MessageType};
use crate::{Error, Result};

const DEFAULT_SOURCE: &str = "aws.health";

const ADDITIONAL_INFO_KEYS: [&str; 5] = ["id", "account", "region", "service", "eventTypeCode"];

/// Parser for Personal Health Dashboard events delivered through SNS.
///
/// Unlike the CloudWatch parser, failures are returned to the caller as
/// [`Error::Parse`] and no events are produced.
#[derive(Debug, Clone, Default)]
pub struct HealthEventParser;

impl HealthEventParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, _options: &ParserOptions, payload: &Value) -> Result<Vec<Event>> {
        if MessageType::of(payload) == MessageType::SubscriptionConfirmation {
            debug!("Subscription confirmation carries no health event");
            return Ok(Vec::new());
        }

        self.try_parse(payload).map_err(|e| match e {
            Error::Parse(_) => e,
            other => Error::Parse(other.to_string()),
        })
    }

    fn try_parse(&self, payload: &Value) -> Result<Vec<Event>> {
        let message = decode_message(payload)?;
        let message = message
            .as_object()
            .ok_or_else(|| Error::Parse("health message is not a JSON object".into()))?;

        let empty = Map::new();
        let detail = match message.get("detail") {
            None | Some(Value::Null) => &empty,
            Some(detail) => detail
                .as_object()
                .ok_or_else(|| Error::Parse("detail is not a JSON object".into()))?,
        };

        let text = |source: &Map<String, Value>, key: &str| {
            source.get(key).and_then(scalar_string).unwrap_or_default()
        };
        let event_arn = text(detail, "eventArn");
        let category = text(detail, "eventTypeCategory");
        let account_id = text(message, "account");
        let resource_type = message
            .get("source")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_SOURCE)
            .to_string();

        let start_time = detail.get("startTime").filter(|t| t.as_str() != Some(""));
        let occurred_at = timestamp::from_field(start_time, TimestampFormat::Health)?;

        let event = Event {
            event_key: event_arn.clone(),
            event_type: EventType::Alert,
            severity: HealthCategory::from_value(&category).severity(),
            resource: Resource {
                resource_id: Some(event_arn),
                resource_type: Some(resource_type),
                name: None,
            },
            description: describe(detail, &account_id)?,
            title: title_case(&text(detail, "eventTypeCode")),
            rule: category,
            occurred_at,
            additional_info: additional_info(message, detail),
        }
        .validated()?;

        debug!("Parsed health event: {:?}", event);
        Ok(vec![event])
    }
}

/// Latest descriptions joined by spaces, followed by the account marker.
fn describe(detail: &Map<String, Value>, account_id: &str) -> Result<String> {
    let entries = match detail.get("eventDescription") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|entry| match entry.as_object().map(|e| e.get("latestDescription")) {
                None => Err(Error::Parse("eventDescription entry is not a JSON object".into())),
                Some(None) => Ok(""),
                Some(Some(Value::String(text))) => Ok(text.as_str()),
                Some(Some(_)) => Err(Error::Parse("latestDescription is not a string".into())),
            })
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(Error::Parse("eventDescription is not a list".into())),
    };

    Ok(format!("{}(Account:{})", entries.join(" "), account_id))
}

/// `AWS_EC2_INSTANCE_ISSUE` becomes `Aws Ec2 Instance Issue`.
fn title_case(code: &str) -> String {
    let mut title = String::with_capacity(code.len());
    let mut previous_is_letter = false;
    for c in code.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if previous_is_letter {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            title.push(c);
            previous_is_letter = false;
        }
    }
    title
}

/// Top-level allow-listed fields, overridden by the same keys under `detail`.
fn additional_info(
    message: &Map<String, Value>,
    detail: &Map<String, Value>,
) -> HashMap<String, String> {
    let mut info = allowed_scalars(message, &ADDITIONAL_INFO_KEYS, true);
    info.extend(allowed_scalars(detail, &ADDITIONAL_INFO_KEYS, false));
    info
}
