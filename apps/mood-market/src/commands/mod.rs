mod check_config;
mod common;
mod merge;
mod prices;
mod sentiment;

use std::path::PathBuf;

pub enum Command {
    Prices,
    Sentiment,
    Merge,
    CheckConfig,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Prices => "prices",
            Self::Sentiment => "sentiment",
            Self::Merge => "merge",
            Self::CheckConfig => "check-config",
        }
    }
}

pub struct GlobalOpts {
    pub config: Option<PathBuf>,
    pub json: bool,
}

pub fn run(command: Command, opts: &GlobalOpts) -> Result<(), String> {
    metrics::counter!("mood.cli.invocations", "command" => command.name()).increment(1);
    match command {
        Command::Prices => prices::run_prices(opts),
        Command::Sentiment => sentiment::run_sentiment(opts),
        Command::Merge => merge::run_merge(opts),
        Command::CheckConfig => check_config::run_check_config(opts),
    }
}
