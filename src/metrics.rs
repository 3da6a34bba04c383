//! Prometheus metrics collection for bmwatch.
//!
//! Exposed on the HTTP listener at `/metrics`.
//!
//! - `bmwatch_passes_total` - Reconciliation passes completed
//! - `bmwatch_pass_duration_seconds` - Pass latency histogram
//! - `bmwatch_transitions_total{event}` - Transition events fired
//! - `bmwatch_api_errors_total{call, error}` - Stats API failures
//! - `bmwatch_commands_total{command}` / `bmwatch_command_errors_total{command, error}`
//! - `bmwatch_dispatch_failures_total{channel, error}` - Webhook delivery failures
//! - `bmwatch_watched_players` - Current watchlist size

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

pub static PASSES: OnceLock<IntCounter> = OnceLock::new();

pub static TRANSITIONS: OnceLock<IntCounterVec> = OnceLock::new();

pub static API_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

pub static DISPATCH_FAILURES: OnceLock<IntCounterVec> = OnceLock::new();

pub static PERSIST_FAILURES: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges / Histograms
// ========================================================================

pub static WATCHED_PLAYERS: OnceLock<IntGauge> = OnceLock::new();

pub static PASS_DURATION: OnceLock<Histogram> = OnceLock::new();

pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Recording before `init` is a no-op, so unit tests never need to call it.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(PASSES, IntCounter::new("bmwatch_passes_total", "Reconciliation passes completed"));
    register!(TRANSITIONS, IntCounterVec::new(Opts::new("bmwatch_transitions_total", "Transition events fired"), &["event"]));
    register!(API_ERRORS, IntCounterVec::new(Opts::new("bmwatch_api_errors_total", "Stats API failures"), &["call", "error"]));
    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("bmwatch_commands_total", "Commands handled by name"), &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("bmwatch_command_errors_total", "Command errors by name and kind"), &["command", "error"]));
    register!(DISPATCH_FAILURES, IntCounterVec::new(Opts::new("bmwatch_dispatch_failures_total", "Webhook delivery failures"), &["channel", "error"]));
    register!(PERSIST_FAILURES, IntCounterVec::new(Opts::new("bmwatch_persist_failures_total", "Watchlist write failures"), &["error"]));
    register!(WATCHED_PLAYERS, IntGauge::new("bmwatch_watched_players", "Players on the watchlist"));
    register!(PASS_DURATION, Histogram::with_opts(
        HistogramOpts::new("bmwatch_pass_duration_seconds", "Reconciliation pass latency")
            .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0])));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("bmwatch_command_duration_seconds", "Command latency by name")
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0]),
        &["command"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Recording helpers
// ============================================================================

#[inline]
pub fn record_pass(duration_secs: f64) {
    if let Some(m) = PASSES.get() {
        m.inc();
    }
    if let Some(h) = PASS_DURATION.get() {
        h.observe(duration_secs);
    }
}

#[inline]
pub fn record_transition(event: &str) {
    if let Some(m) = TRANSITIONS.get() {
        m.with_label_values(&[event]).inc();
    }
}

#[inline]
pub fn record_api_error(call: &str, error: &str) {
    if let Some(m) = API_ERRORS.get() {
        m.with_label_values(&[call, error]).inc();
    }
}

#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(m) = COMMAND_COUNTER.get() {
        m.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(m) = COMMAND_ERRORS.get() {
        m.with_label_values(&[command, error]).inc();
    }
}

#[inline]
pub fn record_dispatch_failure(channel: &str, error: &str) {
    if let Some(m) = DISPATCH_FAILURES.get() {
        m.with_label_values(&[channel, error]).inc();
    }
}

#[inline]
pub fn record_persist_failure(error: &str) {
    if let Some(m) = PERSIST_FAILURES.get() {
        m.with_label_values(&[error]).inc();
    }
}

#[inline]
pub fn set_watched(count: usize) {
    if let Some(g) = WATCHED_PLAYERS.get() {
        g.set(count as i64);
    }
}
