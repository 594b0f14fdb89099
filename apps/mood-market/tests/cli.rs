use std::fs;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn unique_tmp_path(name: &str) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("mood_cli_{name}_{}_{}", std::process::id(), now))
}

struct MockServer {
    base_url: String,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl MockServer {
    /// Answers every request with `body` until dropped.
    fn start(body: String) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{}", addr);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = stop.clone();

        let handle = thread::spawn(move || {
            listener.set_nonblocking(true).expect("nonblocking");
            while !stop_clone.load(Ordering::Relaxed) {
                match listener.accept() {
                    Ok((mut stream, _)) => {
                        let _ = handle_connection(&mut stream, &body);
                    }
                    Err(_) => thread::sleep(Duration::from_millis(10)),
                }
            }
        });

        Self {
            base_url,
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn handle_connection(stream: &mut TcpStream, body: &str) -> std::io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(Duration::from_secs(2)))?;
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(response.as_bytes())?;
    stream.flush()
}

fn write_config(root: &Path, extra: &str) -> PathBuf {
    let raw = root.join("raw");
    let processed = root.join("processed");
    fs::create_dir_all(&raw).expect("raw dir");
    let body = format!(
        "[paths]\nraw_dir = {:?}\nprocessed_dir = {:?}\n\n{}",
        raw.display().to_string(),
        processed.display().to_string(),
        extra
    );
    let path = root.join("mood.toml");
    fs::write(&path, body).expect("write config");
    path
}

fn run_cli(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mood-market"))
        .args(args)
        .current_dir(root)
        .env_remove("MOOD_CONFIG")
        .env_remove("MOOD_LOG")
        .env_remove("REDDIT_CLIENT_ID")
        .env_remove("REDDIT_CLIENT_SECRET")
        .env_remove("REDDIT_USER_AGENT")
        .output()
        .expect("run mood-market")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().last().expect("json line");
    serde_json::from_str(line).expect("valid json")
}

#[test]
fn check_config_with_defaults_succeeds() {
    let root = unique_tmp_path("check_defaults");
    fs::create_dir_all(&root).unwrap();

    let output = run_cli(&root, &["check-config", "--json"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json = stdout_json(&output);
    assert_eq!(json["command"], "check-config");
    assert_eq!(json["comments_auth"], "public");
    assert_eq!(json["config"]["paths"]["price_series"], "crypto_prices");
    fs::remove_dir_all(&root).ok();
}

#[test]
fn unknown_config_field_exits_with_error() {
    let root = unique_tmp_path("check_unknown");
    fs::create_dir_all(&root).unwrap();
    let config = write_config(&root, "[filter]\nmin_length = 3\n");

    let output = run_cli(&root, &["check-config", "--config", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: invalid config"), "stderr: {stderr}");
    fs::remove_dir_all(&root).ok();
}

#[test]
fn merge_writes_joined_dataset() {
    let root = unique_tmp_path("merge");
    fs::create_dir_all(&root).unwrap();
    let config = write_config(&root, "");
    fs::write(
        root.join("raw").join("crypto_prices.csv"),
        "timestamp_utc,entity,price_usd\n\
         2025-06-06T17:05:00+00:00,BTC,68000\n\
         2025-06-06T18:05:00+00:00,BTC,68100\n",
    )
    .unwrap();
    fs::write(
        root.join("raw").join("reddit_sentiment.csv"),
        "timestamp_utc,sentiment\n2025-06-06T17:00:00+00:00,0.42\n",
    )
    .unwrap();

    let output = run_cli(
        &root,
        &["merge", "--config", config.to_str().unwrap(), "--json"],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json = stdout_json(&output);
    assert_eq!(json["joined_rows"], 1);
    assert_eq!(json["price_only_hours"], 1);
    assert_eq!(json["sha256"].as_str().map(str::len), Some(64));

    let joined = fs::read_to_string(root.join("processed").join("mood_market.csv")).unwrap();
    assert_eq!(
        joined,
        "timestamp_utc,entity,price_usd,sentiment\n2025-06-06T17:00:00+00:00,BTC,68000,0.42\n"
    );
    fs::remove_dir_all(&root).ok();
}

#[test]
fn merge_without_sentiment_series_fails() {
    let root = unique_tmp_path("merge_missing");
    fs::create_dir_all(&root).unwrap();
    let config = write_config(&root, "");
    fs::write(
        root.join("raw").join("crypto_prices.csv"),
        "timestamp_utc,entity,price_usd\n2025-06-06T17:05:00+00:00,BTC,68000\n",
    )
    .unwrap();

    let output = run_cli(&root, &["merge", "--config", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("reddit_sentiment.csv"), "stderr: {stderr}");
    assert!(!root.join("processed").join("mood_market.csv").exists());
    fs::remove_dir_all(&root).ok();
}

#[test]
fn prices_appends_snapshot_from_price_api() {
    let server = MockServer::start(r#"{"bitcoin":{"usd":68000},"ethereum":{"usd":2500.5}}"#.to_string());
    let root = unique_tmp_path("prices");
    fs::create_dir_all(&root).unwrap();
    let config = write_config(
        &root,
        &format!("[prices]\nbase_url = \"{}\"\ntimeout_ms = 2000\n", server.base_url),
    );

    for _ in 0..2 {
        let output = run_cli(
            &root,
            &["prices", "--config", config.to_str().unwrap(), "--json"],
        );
        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        let json = stdout_json(&output);
        assert_eq!(json["outcome"], "appended");
        assert_eq!(json["rows"], 2);
    }

    let contents = fs::read_to_string(root.join("raw").join("crypto_prices.csv")).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "timestamp_utc,entity,price_usd");
    assert!(lines[1].ends_with(",BTC,68000"));
    assert!(lines[2].ends_with(",ETH,2500.5"));
    assert!(lines[1].contains(":00+00:00,"));
    fs::remove_dir_all(&root).ok();
}

#[test]
fn sentiment_with_only_stale_comments_is_a_noop() {
    let listing = r#"{"kind":"Listing","data":{"after":null,"children":[
        {"kind":"t1","data":{"body":"this is a great long comment from long ago","created_utc":1000000000.0,"score":10}}
    ]}}"#;
    let server = MockServer::start(listing.to_string());
    let root = unique_tmp_path("sentiment_noop");
    fs::create_dir_all(&root).unwrap();
    let config = write_config(
        &root,
        &format!(
            "[comments]\npublic_base_url = \"{0}\"\nbase_url = \"{0}\"\nauth_url = \"{0}/token\"\ntimeout_ms = 2000\n",
            server.base_url
        ),
    );

    let output = run_cli(&root, &["sentiment", "--config", config.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("nothing to do"), "stdout: {stdout}");
    assert!(stdout.contains("outside_window=1"), "stdout: {stdout}");
    assert!(!root.join("raw").join("reddit_sentiment.csv").exists());
    fs::remove_dir_all(&root).ok();
}

#[test]
fn invalid_log_format_is_rejected() {
    let root = unique_tmp_path("log_format");
    fs::create_dir_all(&root).unwrap();
    let output = run_cli(&root, &["check-config", "--log-format", "xml"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--log-format"));
    fs::remove_dir_all(&root).ok();
}

#[test]
fn sentiment_with_oversized_window_fails_cleanly() {
    let root = unique_tmp_path("window_overflow");
    fs::create_dir_all(&root).unwrap();
    let config = write_config(&root, "[comments]\nwindow_minutes = 1000000000000\n");

    let output = run_cli(&root, &["sentiment", "--config", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("window_minutes"), "stderr: {stderr}");
    assert!(!stderr.contains("panicked"), "stderr: {stderr}");
    fs::remove_dir_all(&root).ok();
}

#[test]
fn malformed_metrics_addr_is_rejected() {
    let root = unique_tmp_path("metrics_addr");
    fs::create_dir_all(&root).unwrap();
    let output = run_cli(&root, &["check-config", "--metrics-addr", "localhost"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--metrics-addr"));
    fs::remove_dir_all(&root).ok();
}
