use super::GlobalOpts;
use mood_application::config::{self, Config};
use mood_application::meta::{engine_name, engine_version};
use mood_application::outcome::IngestOutcome;
use serde_json::Value;

pub(super) fn load(opts: &GlobalOpts) -> Result<Config, String> {
    config::load_config(opts.config.as_deref()).map_err(|err| err.to_string())
}

pub(super) fn print_config_summary(command: &str, config: &Config, opts: &GlobalOpts) {
    if opts.json {
        return;
    }
    println!(
        "{} {} cli: {} (config={})",
        engine_name(),
        engine_version(),
        command,
        opts.config
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string())
    );
    println!(
        "paths: raw_dir={}, processed_dir={}, prices={}, sentiment={}, joined={}",
        config.paths.raw_dir,
        config.paths.processed_dir,
        config.paths.price_series,
        config.paths.sentiment_series,
        config.paths.joined_dataset
    );
}

/// Emits the one-line JSON summary used by `--json`.
pub(super) fn print_json(command: &str, body: Value) -> Result<(), String> {
    let mut line = serde_json::json!({ "command": command });
    if let (Some(target), Value::Object(fields)) = (line.as_object_mut(), body) {
        target.extend(fields);
    }
    let text = serde_json::to_string(&line)
        .map_err(|err| format!("failed to serialize summary: {err}"))?;
    println!("{text}");
    Ok(())
}

pub(super) fn print_outcome(outcome: &IngestOutcome) {
    match outcome {
        IngestOutcome::Appended { path, rows, .. } => {
            println!("appended {} row(s) to {}", rows, path.display())
        }
        IngestOutcome::NothingToDo { reason } => println!("nothing to do: {reason}"),
    }
}
