use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::event::Resource;

/// Resource for one CloudWatch dimension.
///
/// `namespace` is the trigger namespace, or the metric namespace when the
/// trigger has none.
pub fn dimension_resource(dimension: &Map<String, Value>, namespace: Option<&str>) -> Resource {
    let resource_id = dimension
        .get("value")
        .and_then(scalar_string)
        .unwrap_or_default();
    let resource_type = namespace.filter(|ns| !ns.is_empty()).map(str::to_string);

    let name = match &resource_type {
        Some(resource_type) => format!("[{}] {}", resource_type, resource_id),
        None => format!(" {}", resource_id),
    };

    Resource {
        resource_id: Some(resource_id),
        resource_type,
        name: Some(name),
    }
}

/// String-valued allow-listed fields only.
pub fn allowed_strings(source: &Map<String, Value>, keys: &[&str]) -> HashMap<String, String> {
    source
        .iter()
        .filter(|(key, _)| keys.contains(&key.as_str()))
        .filter_map(|(key, value)| value.as_str().map(|s| (key.clone(), s.to_string())))
        .collect()
}

/// Allow-listed scalar fields, stringified. With `skip_empty`, empty strings,
/// zero and `false` are left out.
pub fn allowed_scalars(
    source: &Map<String, Value>,
    keys: &[&str],
    skip_empty: bool,
) -> HashMap<String, String> {
    source
        .iter()
        .filter(|(key, _)| keys.contains(&key.as_str()))
        .filter(|(_, value)| !skip_empty || is_truthy(value))
        .filter_map(|(key, value)| scalar_string(value).map(|s| (key.clone(), s)))
        .collect()
}

/// Strings, numbers and booleans as text; null, arrays and objects yield `None`.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_dimension_resource_with_namespace() {
        let dimension = object(json!({ "name": "InstanceId", "value": "i-0abc" }));
        let resource = dimension_resource(&dimension, Some("AWS/EC2"));
        assert_eq!(resource.resource_id.as_deref(), Some("i-0abc"));
        assert_eq!(resource.resource_type.as_deref(), Some("AWS/EC2"));
        assert_eq!(resource.name.as_deref(), Some("[AWS/EC2] i-0abc"));
    }

    #[test]
    fn test_dimension_resource_without_namespace() {
        let dimension = object(json!({ "name": "InstanceId", "value": "i-0abc" }));
        for namespace in [None, Some("")] {
            let resource = dimension_resource(&dimension, namespace);
            assert_eq!(resource.resource_type, None);
            assert_eq!(resource.name.as_deref(), Some(" i-0abc"));
        }
    }

    #[test]
    fn test_allowed_strings_drops_other_types() {
        let source = object(json!({
            "AlarmName": "cpu-high",
            "Region": "US East (N. Virginia)",
            "AlarmDescription": null,
            "OldStateValue": 3,
            "NewStateValue": "ALARM"
        }));
        let info = allowed_strings(&source, &["AlarmName", "Region", "AlarmDescription", "OldStateValue"]);
        assert_eq!(info.len(), 2);
        assert_eq!(info["AlarmName"], "cpu-high");
        assert!(!info.contains_key("NewStateValue"));
    }

    #[test]
    fn test_allowed_scalars_skips_empty_and_nested() {
        let source = object(json!({
            "id": "7bf73129",
            "account": "",
            "region": ["us-east-1"],
            "version": "0",
            "service": 42
        }));
        let info = allowed_scalars(&source, &["id", "account", "region", "service"], true);
        assert_eq!(info.len(), 2);
        assert_eq!(info["id"], "7bf73129");
        assert_eq!(info["service"], "42");

        let kept = allowed_scalars(&source, &["account"], false);
        assert_eq!(kept["account"], "");
    }
}
