// src/metrics.rs
use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("posts_processed_total", "Posts classified and decided.");
        describe_counter!("alerts_sent_total", "Alerts delivered to the chat.");
        describe_counter!(
            "alerts_suppressed_total",
            "Posts that did not alert, by skip reason."
        );
        describe_counter!(
            "delivery_failures_total",
            "Alert deliveries that failed, by outcome kind."
        );
        describe_counter!("feed_errors_total", "Feed fetch/parse errors.");
        describe_histogram!("feed_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("seen_store_entries", "Fingerprints held by the seen store.");
        describe_gauge!("poll_last_run_ts", "Unix ts when the last poll cycle ran.");
    });
}

/// Install the Prometheus recorder with an HTTP listener on `addr`.
/// Without an address metrics calls stay no-ops.
pub fn install_exporter(addr: Option<SocketAddr>) -> Result<()> {
    let Some(addr) = addr else {
        return Ok(());
    };
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .with_context(|| format!("prometheus exporter on {addr}"))?;
    ensure_described();
    tracing::info!(%addr, "prometheus exporter listening");
    Ok(())
}
