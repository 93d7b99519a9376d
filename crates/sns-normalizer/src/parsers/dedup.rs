use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Width of the window in which repeated alarm notifications share a key.
pub const BUCKET_SECONDS: i64 = 600;

/// Hex SHA-256 of the input.
pub fn content_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn bucket(at: DateTime<Utc>) -> i64 {
    at.timestamp().div_euclid(BUCKET_SECONDS) * 100
}

/// Fingerprint for an alarm notification about one resource.
///
/// Notifications for the same account, resource and alarm whose state change
/// falls in the same ten minute window produce the same key.
pub fn alarm_event_key(
    account_id: &str,
    resource_id: &str,
    alarm_name: &str,
    state_changed_at: DateTime<Utc>,
) -> String {
    let raw_key = format!(
        "{}:{}:{}:{}",
        account_id,
        resource_id,
        alarm_name,
        bucket(state_changed_at)
    );
    content_hash(&raw_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::timestamp::TimestampFormat;

    fn at(raw: &str) -> DateTime<Utc> {
        TimestampFormat::CloudWatch.parse(raw).unwrap()
    }

    #[test]
    fn test_key_is_deterministic_and_fixed_width() {
        let first = alarm_event_key("123456789012", "i-0abc", "cpu-high", at("2021-08-25T13:29:39.389+0000"));
        let second = alarm_event_key("123456789012", "i-0abc", "cpu-high", at("2021-08-25T13:29:39.389+0000"));
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_same_window_same_key() {
        let early = alarm_event_key("acct", "i-1", "alarm", at("2021-08-25T13:20:00"));
        let late = alarm_event_key("acct", "i-1", "alarm", at("2021-08-25T13:29:59.999"));
        assert_eq!(early, late);
    }

    #[test]
    fn test_window_boundary_changes_key() {
        let before = alarm_event_key("acct", "i-1", "alarm", at("2021-08-25T13:09:59"));
        let after = alarm_event_key("acct", "i-1", "alarm", at("2021-08-25T13:10:00"));
        assert_ne!(before, after);
    }

    #[test]
    fn test_each_component_changes_key() {
        let when = at("2021-08-25T13:29:39");
        let base = alarm_event_key("acct", "i-1", "alarm", when);
        assert_ne!(base, alarm_event_key("other", "i-1", "alarm", when));
        assert_ne!(base, alarm_event_key("acct", "i-2", "alarm", when));
        assert_ne!(base, alarm_event_key("acct", "i-1", "other", when));
    }

    #[test]
    fn test_bucket_value() {
        // 2021-08-25T13:29:39Z is 1629898179 seconds after the epoch
        assert_eq!(bucket(at("2021-08-25T13:29:39")), 1629898179 / 600 * 100);
        assert_eq!(content_hash(""), "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
    }
}
