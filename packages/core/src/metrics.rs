//! Prometheus metrics for the error pipeline.
//!
//! [`ErrorMetrics`] owns all registered metrics and the [`Registry`] they
//! belong to. Construct it once at startup and hand it to
//! [`install`]; the core consults the installed handle on every
//! construction and registry lookup. The error path never fails because
//! metrics are absent; everything here is optional.

use std::sync::OnceLock;

use prometheus::{Counter, CounterVec, Gauge, Opts, Registry};

/// All error-pipeline Prometheus metrics.
pub struct ErrorMetrics {
    /// Total root errors built with `with_code`.
    pub errors_created_total: Counter,
    /// Total wrap operations.
    pub errors_wrapped_total: Counter,
    /// Registry lookups, labelled by result (`hit` / `fallback`).
    pub registry_lookups_total: CounterVec,
    /// Current number of registered coders.
    pub registry_size: Gauge,
    /// The registry that owns all of the above metrics.
    pub registry: Registry,
}

impl ErrorMetrics {
    /// Create and register all metrics. Returns an error if any metric
    /// name is invalid or duplicated (should not happen in practice).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let errors_created_total = Counter::with_opts(Opts::new(
            "coded_errors_created_total",
            "Root errors constructed",
        ))?;

        let errors_wrapped_total = Counter::with_opts(Opts::new(
            "coded_errors_wrapped_total",
            "Wrap operations performed",
        ))?;

        let registry_lookups_total = CounterVec::new(
            Opts::new(
                "coded_errors_registry_lookups_total",
                "Coder registry lookups by result",
            ),
            &["result"],
        )?;

        let registry_size = Gauge::with_opts(Opts::new(
            "coded_errors_registry_size",
            "Registered coder count",
        ))?;

        registry.register(Box::new(errors_created_total.clone()))?;
        registry.register(Box::new(errors_wrapped_total.clone()))?;
        registry.register(Box::new(registry_lookups_total.clone()))?;
        registry.register(Box::new(registry_size.clone()))?;

        Ok(Self {
            errors_created_total,
            errors_wrapped_total,
            registry_lookups_total,
            registry_size,
            registry,
        })
    }

    /// Render all metrics as Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }

    pub(crate) fn record_error_created(&self) {
        self.errors_created_total.inc();
    }

    pub(crate) fn record_error_wrapped(&self) {
        self.errors_wrapped_total.inc();
    }

    pub(crate) fn record_lookup(&self, hit: bool) {
        let result = if hit { "hit" } else { "fallback" };
        self.registry_lookups_total.with_label_values(&[result]).inc();
    }

    pub(crate) fn set_registry_size(&self, len: usize) {
        self.registry_size.set(len as f64);
    }
}

static INSTALLED: OnceLock<ErrorMetrics> = OnceLock::new();

/// Install process-wide metrics. Returns `false` when a set was already
/// installed (the first install wins, matching the registry's lifetime).
pub fn install(metrics: ErrorMetrics) -> bool {
    INSTALLED.set(metrics).is_ok()
}

/// The installed metrics, e.g. for scraping via [`ErrorMetrics::render`].
pub fn handle() -> Option<&'static ErrorMetrics> {
    INSTALLED.get()
}

pub(crate) fn installed() -> Option<&'static ErrorMetrics> {
    INSTALLED.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_metrics_register_without_error() {
        let metrics = ErrorMetrics::new();
        assert!(metrics.is_ok(), "ErrorMetrics::new() failed: {:?}", metrics.err());
    }

    #[test]
    fn counters_increment_through_recorders() {
        let metrics = ErrorMetrics::new().unwrap();
        metrics.record_error_created();
        metrics.record_error_created();
        metrics.record_error_wrapped();
        assert!((metrics.errors_created_total.get() - 2.0).abs() < f64::EPSILON);
        assert!((metrics.errors_wrapped_total.get() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lookup_counter_labels_hit_and_fallback() {
        let metrics = ErrorMetrics::new().unwrap();
        metrics.record_lookup(true);
        metrics.record_lookup(false);
        metrics.record_lookup(false);

        let hit = metrics.registry_lookups_total.with_label_values(&["hit"]).get();
        let fallback = metrics
            .registry_lookups_total
            .with_label_values(&["fallback"])
            .get();
        assert!((hit - 1.0).abs() < f64::EPSILON);
        assert!((fallback - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn registry_size_gauge_tracks_latest_value() {
        let metrics = ErrorMetrics::new().unwrap();
        metrics.set_registry_size(7);
        assert!((metrics.registry_size.get() - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn render_contains_metric_names_after_increment() {
        let metrics = ErrorMetrics::new().unwrap();
        metrics.record_error_created();
        metrics.record_lookup(false);
        metrics.set_registry_size(3);

        let output = metrics.render().unwrap();
        assert!(output.contains("coded_errors_created_total"));
        assert!(output.contains("coded_errors_registry_lookups_total"));
        assert!(output.contains("coded_errors_registry_size"));
    }
}
