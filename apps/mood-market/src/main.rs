mod commands;
mod infra;
mod obs;

use clap::{Parser, Subcommand};
use commands::{Command, GlobalOpts};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mood-market")]
#[command(about = "Mood Market CLI", version, arg_required_else_help = true)]
#[command(
    after_help = "Examples:\n  mood-market prices --config configs/mood.toml\n  mood-market sentiment --config configs/mood.toml\n  mood-market merge --config configs/mood.toml --json\n  mood-market check-config --config configs/mood.toml\n"
)]
struct Cli {
    /// Config file path (TOML). Built-in defaults apply when omitted.
    #[arg(long, global = true, env = "MOOD_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter (overridden by env MOOD_LOG).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format: text | json
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    /// Expose Prometheus metrics on host:port while the command runs.
    #[arg(long, global = true)]
    metrics_addr: Option<String>,

    /// Print a single JSON summary line instead of human output.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Fetch current prices and append one row per tracked asset.
    Prices,
    /// Sample recent comments and append hourly mean polarity.
    Sentiment,
    /// Rebuild the joined dataset from both series.
    Merge,
    /// Validate the configuration and print the effective settings.
    CheckConfig,
}

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let command = match cli.command {
        CliCommand::Prices => Command::Prices,
        CliCommand::Sentiment => Command::Sentiment,
        CliCommand::Merge => Command::Merge,
        CliCommand::CheckConfig => Command::CheckConfig,
    };
    let opts = GlobalOpts {
        config: cli.config,
        json: cli.json,
    };

    let result = obs::init_tracing(&cli.log_level, &cli.log_format)
        .and_then(|_| obs::init_metrics(cli.metrics_addr.as_deref()))
        .and_then(|_| commands::run(command, &opts));
    if let Err(err) = result {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
