use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use super::classify::AlarmState;
use super::dedup::{alarm_event_key, content_hash};
use super::extract::{allowed_strings, dimension_resource};
use super::timestamp::{self, TimestampFormat};
use super::ParserOptions;
use crate::event::{Event, EventType, Resource, Severity};
use crate::sns::unwrap_message;
use crate::{Error, Result};

pub const PARSE_ERROR_TITLE: &str = "AWS SNS Parsing ERROR";

const ADDITIONAL_INFO_KEYS: [&str; 6] = [
    "OldStateValue",
    "AlarmName",
    "Region",
    "AWSAccountId",
    "AlarmDescription",
    "AlarmArn",
];

/// Parser for CloudWatch alarm state-change notifications.
///
/// Never fails: a payload that cannot be parsed becomes a single
/// ERROR/CRITICAL event describing the failure.
#[derive(Debug, Clone, Default)]
pub struct CloudWatchAlarmParser;

/// Fields shared by every event emitted for one alarm notification.
struct AlarmContext {
    account_id: String,
    alarm_name: String,
    state: AlarmState,
    description: String,
    rule: String,
    namespace: Option<String>,
    occurred_at: DateTime<Utc>,
    additional_info: HashMap<String, String>,
}

impl CloudWatchAlarmParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, _options: &ParserOptions, payload: &Value) -> Vec<Event> {
        match self.try_parse(payload) {
            Ok(events) => events,
            Err(e) => {
                warn!("Failed to parse CloudWatch alarm notification: {}", e);
                vec![error_event(&e)]
            }
        }
    }

    fn try_parse(&self, payload: &Value) -> Result<Vec<Event>> {
        let message = unwrap_message(payload)?;
        let alarm = as_object(&message, "alarm notification")?;
        debug!("Parsing CloudWatch alarm: {:?}", alarm.get("AlarmName"));

        let trigger = match alarm.get("Trigger") {
            None | Some(Value::Null) => None,
            Some(trigger) => Some(as_object(trigger, "Trigger")?),
        };
        let dimensions = trigger.and_then(|t| non_null(t.get("Dimensions")));
        let metrics = trigger.and_then(|t| non_null(t.get("Metrics")));

        // (dimension, metric namespace) pairs, one event each
        let mut targets = Vec::new();
        if let Some(dimensions) = dimensions {
            for dimension in as_list(dimensions, "Trigger.Dimensions")? {
                targets.push((as_object(dimension, "dimension")?, None));
            }
        } else if let Some(metrics) = metrics {
            for metric in as_list(metrics, "Trigger.Metrics")? {
                let inner = as_object(metric, "metric")?
                    .get("MetricStat")
                    .and_then(|stat| stat.get("Metric"));
                let namespace = inner.and_then(|m| m.get("Namespace")).and_then(Value::as_str);

                let Some(inner_dimensions) = non_null(inner.and_then(|m| m.get("Dimensions"))) else {
                    continue;
                };
                for dimension in as_list(inner_dimensions, "MetricStat.Metric.Dimensions")? {
                    targets.push((as_object(dimension, "dimension")?, namespace));
                }
            }
        }

        if targets.is_empty() {
            debug!("Alarm has no dimensions to report, no events emitted");
            return Ok(Vec::new());
        }

        let context = AlarmContext::new(alarm, trigger)?;
        targets
            .into_iter()
            .map(|(dimension, namespace)| context.event_for(dimension, namespace))
            .collect()
    }
}

impl AlarmContext {
    fn new(alarm: &Map<String, Value>, trigger: Option<&Map<String, Value>>) -> Result<Self> {
        let text = |key: &str| alarm.get(key).and_then(Value::as_str).unwrap_or_default().to_string();

        Ok(Self {
            account_id: text("AWSAccountId"),
            alarm_name: text("AlarmName"),
            state: AlarmState::from_value(alarm.get("NewStateValue").and_then(Value::as_str)),
            description: text("NewStateReason"),
            rule: trigger.map(rule_for).unwrap_or_default(),
            namespace: trigger
                .and_then(|t| t.get("Namespace"))
                .and_then(Value::as_str)
                .filter(|ns| !ns.is_empty())
                .map(str::to_string),
            occurred_at: timestamp::from_field(alarm.get("StateChangeTime"), TimestampFormat::CloudWatch)?,
            additional_info: allowed_strings(alarm, &ADDITIONAL_INFO_KEYS),
        })
    }

    fn event_for(&self, dimension: &Map<String, Value>, metric_namespace: Option<&str>) -> Result<Event> {
        let resource = dimension_resource(dimension, self.namespace.as_deref().or(metric_namespace));
        let resource_id = resource.resource_id.clone().unwrap_or_default();

        let event = Event {
            event_key: alarm_event_key(&self.account_id, &resource_id, &self.alarm_name, self.occurred_at),
            event_type: self.state.event_type(),
            severity: self.state.severity(),
            resource,
            description: self.description.clone(),
            title: self.alarm_name.clone(),
            rule: self.rule.clone(),
            occurred_at: self.occurred_at,
            additional_info: self.additional_info.clone(),
        }
        .validated()?;

        debug!("Parsed CloudWatch event: {:?}", event);
        Ok(event)
    }
}

/// Threshold when present, otherwise the metric name.
fn rule_for(trigger: &Map<String, Value>) -> String {
    match trigger.get("Threshold") {
        Some(Value::Number(threshold)) => threshold.to_string(),
        Some(Value::String(threshold)) => threshold.clone(),
        _ => trigger
            .get("MetricName")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Diagnostic event standing in for a notification that could not be parsed.
pub fn error_event(error: &Error) -> Event {
    let generated = format!("aws-sns-{}", Uuid::new_v4().simple());
    Event {
        event_key: content_hash(&generated),
        event_type: EventType::Error,
        severity: Severity::Critical,
        resource: Resource::default(),
        description: error.to_string(),
        title: PARSE_ERROR_TITLE.to_string(),
        rule: String::new(),
        occurred_at: Utc::now(),
        additional_info: HashMap::new(),
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::Parse(format!("{} is not a JSON object", what)))
}

fn as_list<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::Parse(format!("{} is not a list", what)))
}
