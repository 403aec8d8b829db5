//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Prometheus metrics handle for rendering collected metrics
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    /// Get the metrics in the Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder
pub fn init_metrics() -> Option<PrometheusMetrics> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            register_default_metrics();
            tracing::info!("Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

fn register_default_metrics() {
    gauge!("enrichment_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record one analyzer call and the path that produced its result
pub fn record_analyzer_call(kind: &str, path: &str, duration: Duration) {
    let labels = [("kind", kind.to_string()), ("path", path.to_string())];

    counter!("enrichment_analyzer_calls_total", &labels).increment(1);
    histogram!("enrichment_analyzer_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record the outcome of one external inference call
pub fn record_inference_call(params: InferenceMetricParams) {
    let labels = [
        ("model", params.model.to_string()),
        ("status", if params.success { "success" } else { "error" }.to_string()),
    ];

    counter!("enrichment_inference_requests_total", &labels).increment(1);

    if params.success {
        let model = [("model", params.model.to_string())];
        counter!("enrichment_inference_input_tokens_total", &model).increment(params.input_tokens);
        counter!("enrichment_inference_output_tokens_total", &model).increment(params.output_tokens);
        // Counters are integral, so spend is tracked in micro-dollars
        counter!("enrichment_inference_cost_usd_total", &model)
            .increment((params.cost_usd * 1_000_000.0).round() as u64);
    }
}

/// Parameters for inference call metrics
pub struct InferenceMetricParams<'a> {
    pub model: &'a str,
    pub success: bool,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
}

/// Record time spent waiting for rate-limit admission
pub fn record_rate_limit_wait(channel: &str, waited: Duration) {
    let labels = [("channel", channel.to_string())];

    counter!("enrichment_rate_limit_waits_total", &labels).increment(1);
    histogram!("enrichment_rate_limit_wait_seconds", &labels).record(waited.as_secs_f64());
}

/// Record the outcome of one batch item
pub fn record_batch_item(status: &str) {
    counter!("enrichment_batch_items_total", "status" => status.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_with<F: FnOnce()>(record: F) -> String {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, record);
        handle.render()
    }

    #[test]
    fn test_analyzer_call_metrics() {
        let rendered = render_with(|| {
            record_analyzer_call("sentiment", "fallback", Duration::from_millis(5));
            record_analyzer_call("sentiment", "fallback", Duration::from_millis(7));
        });

        assert!(rendered.contains("enrichment_analyzer_calls_total"));
        assert!(rendered.contains("kind=\"sentiment\""));
        assert!(rendered.contains("path=\"fallback\""));
    }

    #[test]
    fn test_inference_cost_in_micro_dollars() {
        let rendered = render_with(|| {
            record_inference_call(InferenceMetricParams {
                model: "gpt-4o-mini",
                success: true,
                input_tokens: 100,
                output_tokens: 20,
                cost_usd: 0.000027,
            });
        });

        assert!(rendered.contains("enrichment_inference_cost_usd_total{model=\"gpt-4o-mini\"} 27"));
    }

    #[test]
    fn test_batch_item_metrics() {
        let rendered = render_with(|| {
            record_batch_item("succeeded");
            record_batch_item("failed");
        });

        assert!(rendered.contains("status=\"succeeded\""));
        assert!(rendered.contains("status=\"failed\""));
    }
}
