use crate::event::{EventType, Severity};

/// CloudWatch alarm state as carried in `NewStateValue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    Ok,
    Alarm,
    InsufficientData,
    Unknown,
}

impl AlarmState {
    /// A missing state is treated as `INSUFFICIENT_DATA`.
    pub fn from_value(state: Option<&str>) -> Self {
        match state.unwrap_or("INSUFFICIENT_DATA") {
            "OK" => AlarmState::Ok,
            "ALARM" | "ALERT" => AlarmState::Alarm,
            "INSUFFICIENT_DATA" => AlarmState::InsufficientData,
            _ => AlarmState::Unknown,
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            AlarmState::Ok => Severity::Info,
            AlarmState::Alarm => Severity::Error,
            AlarmState::InsufficientData | AlarmState::Unknown => Severity::NotAvailable,
        }
    }

    pub fn event_type(self) -> EventType {
        match self {
            AlarmState::Ok => EventType::Recovery,
            _ => EventType::Alert,
        }
    }
}

/// Health Dashboard `eventTypeCategory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthCategory {
    Issue,
    ScheduledChange,
    AccountNotification,
    Other,
}

impl HealthCategory {
    pub fn from_value(category: &str) -> Self {
        match category {
            "issue" => HealthCategory::Issue,
            "scheduledChange" => HealthCategory::ScheduledChange,
            "accountNotification" => HealthCategory::AccountNotification,
            _ => HealthCategory::Other,
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            HealthCategory::Issue | HealthCategory::ScheduledChange => Severity::Error,
            HealthCategory::AccountNotification | HealthCategory::Other => Severity::Info,
        }
    }
}
