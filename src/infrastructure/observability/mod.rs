//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    PrometheusMetrics, TranslateOutcome, UpstreamRequestMetricParams, create_metrics_router,
    init_metrics, record_cache_fault, record_http_request, record_reconcile_fallback,
    record_translate_request, record_translated_segments, record_upstream_request,
};
