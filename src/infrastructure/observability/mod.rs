//! Observability infrastructure - Metrics

mod metrics;

pub use metrics::{
    init_metrics, record_analyzer_call, record_batch_item, record_inference_call,
    record_rate_limit_wait, InferenceMetricParams, PrometheusMetrics,
};
