//! Metrics collection and export module

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Instant;

/// Global metrics registry
pub struct Metrics {
    registry: Registry,

    // Counters
    pub swaps_started: IntCounter,
    pub swaps_landed: IntCounter,
    pub swaps_failed: IntCounter,
    pub swaps_skipped: IntCounter,
    pub attempts_total: IntCounter,
    pub attempt_failures: IntCounterVec,

    // Fallback / relay counters
    pub simulation_fallbacks: IntCounter,
    pub build_fallbacks: IntCounter,
    pub bundle_submissions: IntCounter,
    pub bundle_resubmissions: IntCounter,

    // Histograms
    pub attempt_latency: Histogram,
    pub bundle_landing_latency: Histogram,
}

impl Metrics {
    /// Create new metrics instance
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let swaps_started =
            IntCounter::with_opts(Opts::new("swaps_started_total", "Swaps requested"))?;

        let swaps_landed = IntCounter::with_opts(Opts::new(
            "swaps_landed_total",
            "Swaps whose bundle landed on-chain",
        ))?;

        let swaps_failed = IntCounter::with_opts(Opts::new(
            "swaps_failed_total",
            "Swaps that exhausted their attempts or hit a fatal error",
        ))?;

        let swaps_skipped = IntCounter::with_opts(Opts::new(
            "swaps_skipped_total",
            "Swaps abandoned because the payer cannot cover rent",
        ))?;

        let attempts_total =
            IntCounter::with_opts(Opts::new("swap_attempts_total", "Outer swap attempts"))?;

        let attempt_failures = IntCounterVec::new(
            Opts::new(
                "swap_attempt_failures_total",
                "Outer attempts abandoned, by error category",
            ),
            &["category"],
        )?;

        let simulation_fallbacks = IntCounter::with_opts(Opts::new(
            "simulation_lookup_table_fallbacks_total",
            "Simulations repeated without address lookup tables",
        ))?;

        let build_fallbacks = IntCounter::with_opts(Opts::new(
            "build_lookup_table_fallbacks_total",
            "Transaction builds repeated without address lookup tables",
        ))?;

        let bundle_submissions = IntCounter::with_opts(Opts::new(
            "bundle_submissions_total",
            "Bundles sent to the relay, including resubmissions",
        ))?;

        let bundle_resubmissions = IntCounter::with_opts(Opts::new(
            "bundle_resubmissions_total",
            "Bundles resubmitted after a Failed status",
        ))?;

        let attempt_latency = Histogram::with_opts(
            HistogramOpts::new("swap_attempt_latency_seconds", "Outer attempt latency")
                .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 45.0, 60.0]),
        )?;

        let bundle_landing_latency = Histogram::with_opts(
            HistogramOpts::new(
                "bundle_landing_latency_seconds",
                "Time from first submission to a Landed status",
            )
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 45.0, 60.0]),
        )?;

        // Register all metrics
        registry.register(Box::new(swaps_started.clone()))?;
        registry.register(Box::new(swaps_landed.clone()))?;
        registry.register(Box::new(swaps_failed.clone()))?;
        registry.register(Box::new(swaps_skipped.clone()))?;
        registry.register(Box::new(attempts_total.clone()))?;
        registry.register(Box::new(attempt_failures.clone()))?;
        registry.register(Box::new(simulation_fallbacks.clone()))?;
        registry.register(Box::new(build_fallbacks.clone()))?;
        registry.register(Box::new(bundle_submissions.clone()))?;
        registry.register(Box::new(bundle_resubmissions.clone()))?;
        registry.register(Box::new(attempt_latency.clone()))?;
        registry.register(Box::new(bundle_landing_latency.clone()))?;

        Ok(Self {
            registry,
            swaps_started,
            swaps_landed,
            swaps_failed,
            swaps_skipped,
            attempts_total,
            attempt_failures,
            simulation_fallbacks,
            build_fallbacks,
            bundle_submissions,
            bundle_resubmissions,
            attempt_latency,
            bundle_landing_latency,
        })
    }

    /// Get the registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn export_text(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Count an abandoned attempt under its error category
    pub fn record_attempt_failure(&self, category: &str) {
        self.attempt_failures.with_label_values(&[category]).inc();
    }
}

/// Global metrics instance
pub fn metrics() -> &'static Metrics {
    static METRICS: once_cell::sync::Lazy<Metrics> =
        once_cell::sync::Lazy::new(|| Metrics::new().expect("Failed to initialize metrics"));
    &METRICS
}

/// Timer helper for measuring operation duration
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn observe_duration(&self, histogram: &Histogram) {
        histogram.observe(self.start.elapsed().as_secs_f64());
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
