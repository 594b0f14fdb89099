use std::net::SocketAddr;

pub fn init_tracing(log_level: &str, log_format: &str) -> Result<(), String> {
    let filter = std::env::var("MOOD_LOG").unwrap_or_else(|_| log_level.to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;

    let format = log_format.trim().to_lowercase();
    match format.as_str() {
        "json" => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .init(),
        "text" => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
        other => return Err(format!("invalid --log-format '{other}' (expected text | json)")),
    }
    Ok(())
}

/// Bucket bounds for stage timings, in milliseconds.
#[cfg(feature = "prometheus")]
const STAGE_MS_BUCKETS: &[f64] = &[
    5.0, 25.0, 100.0, 250.0, 500.0, 1_000.0, 2_500.0, 5_000.0, 10_000.0, 30_000.0,
];

fn parse_metrics_addr(raw: &str) -> Result<SocketAddr, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("invalid --metrics-addr: empty (expected host:port)".to_string());
    }
    let addr: SocketAddr = raw
        .parse()
        .map_err(|err| format!("invalid --metrics-addr '{raw}' (expected host:port): {err}"))?;
    if addr.port() == 0 {
        return Err(format!("invalid --metrics-addr '{raw}': port must be non-zero"));
    }
    Ok(addr)
}

/// Installs the Prometheus exporter for the lifetime of the run. Every series
/// carries an `app` label; `*_ms` histograms get stage-sized buckets.
#[cfg(feature = "prometheus")]
pub fn init_metrics(metrics_addr: Option<&str>) -> Result<Option<SocketAddr>, String> {
    use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
    use mood_application::meta::{engine_name, engine_version};

    let Some(raw) = metrics_addr else {
        return Ok(None);
    };
    let addr = parse_metrics_addr(raw)?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .add_global_label("app", engine_name())
        .set_buckets_for_metric(Matcher::Suffix("_ms".to_string()), STAGE_MS_BUCKETS)
        .map_err(|err| format!("invalid histogram buckets: {err}"))?
        .install()
        .map_err(|err| format!("failed to start metrics exporter on {addr}: {err}"))?;

    metrics::gauge!("mood.cli.build_info", "version" => engine_version()).set(1.0);
    tracing::info!(metrics_addr = %addr, "prometheus metrics exporter enabled");
    Ok(Some(addr))
}

#[cfg(not(feature = "prometheus"))]
pub fn init_metrics(metrics_addr: Option<&str>) -> Result<Option<SocketAddr>, String> {
    let Some(raw) = metrics_addr else {
        return Ok(None);
    };
    let addr = parse_metrics_addr(raw)?;
    Err(format!(
        "cannot serve metrics on {addr}: mood-market was built without the `prometheus` feature"
    ))
}
