use lazy_static::lazy_static;
use prometheus::{
    register_int_counter_vec_with_registry, Encoder, IntCounterVec, Registry, TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref NOTIFICATIONS_RECEIVED_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
        "sns_normalizer_notifications_received_total",
        "Total number of SNS notifications received.",
        &["provider"],
        REGISTRY
    )
    .expect("Failed to register NOTIFICATIONS_RECEIVED_TOTAL");
    pub static ref EVENTS_EMITTED_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
        "sns_normalizer_events_emitted_total",
        "Total number of canonical events emitted.",
        &["provider", "event_type"],
        REGISTRY
    )
    .expect("Failed to register EVENTS_EMITTED_TOTAL");
    pub static ref PARSE_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
        "sns_normalizer_parse_failures_total",
        "Total number of notifications rejected with a parse error.",
        &["provider"],
        REGISTRY
    )
    .expect("Failed to register PARSE_FAILURES_TOTAL");
    pub static ref CONFIRMATIONS_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
        "sns_normalizer_subscription_confirmations_total",
        "Total number of subscription confirmation attempts by outcome.",
        &["outcome"],
        REGISTRY
    )
    .expect("Failed to register CONFIRMATIONS_TOTAL");
}

/// Text exposition of every registered metric.
pub fn gather_metrics() -> String {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
