use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Error, Result};

/// Canonical event handed to the monitoring pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_key: String,
    pub event_type: EventType,
    pub severity: Severity,
    pub resource: Resource,
    pub description: String,
    pub title: String,
    pub rule: String,
    pub occurred_at: DateTime<Utc>,
    pub additional_info: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Alert,
    Recovery,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Error,
    Critical,
    NotAvailable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Alert => "ALERT",
            EventType::Recovery => "RECOVERY",
            EventType::Error => "ERROR",
        }
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
            Severity::NotAvailable => "NOT_AVAILABLE",
        }
    }
}

impl Event {
    /// Checks the fields the pipeline relies on before the event leaves a parser.
    pub fn validated(self) -> Result<Self> {
        if self.event_key.trim().is_empty() {
            return Err(Error::Validation("event_key is required".into()));
        }
        Ok(self)
    }
}
