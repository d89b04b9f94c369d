// Prometheus metrics for submissions

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};

lazy_static! {
    pub static ref SUBMISSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "codesync_submissions_total",
        "Submissions evaluated, by outcome (verdicts or top-level error kind)",
        &["outcome"]
    )
    .expect("submissions counter registers once");
    pub static ref EVALUATION_DURATION: Histogram = register_histogram!(
        "codesync_evaluation_duration_seconds",
        "Wall time of one submission evaluation, oracle round trip included",
        vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0]
    )
    .expect("evaluation histogram registers once");
}

/// Register metrics up front so they are exported before the first submission
pub fn init() {
    lazy_static::initialize(&SUBMISSIONS_TOTAL);
    lazy_static::initialize(&EVALUATION_DURATION);
}

pub fn record_submission(outcome: &str, seconds: f64) {
    SUBMISSIONS_TOTAL.with_label_values(&[outcome]).inc();
    EVALUATION_DURATION.observe(seconds);
}

/// Render the default registry in the text exposition format
pub fn render() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
