use super::common;
use super::GlobalOpts;
use chrono::Utc;
use mood_application::sentiment::ingest_sentiment;

pub(super) fn run_sentiment(opts: &GlobalOpts) -> Result<(), String> {
    let config = common::load(opts)?;
    common::print_config_summary("sentiment", &config, opts);

    let crate::infra::SentimentDeps {
        source,
        scorer,
        store,
    } = crate::infra::build_sentiment_deps(&config)?;
    let run = ingest_sentiment(
        &config,
        source.as_ref(),
        scorer.as_ref(),
        store.as_ref(),
        Utc::now(),
    )
    .map_err(|err| err.to_string())?;

    if opts.json {
        let body = serde_json::to_value(&run)
            .map_err(|err| format!("failed to serialize outcome: {err}"))?;
        return common::print_json("sentiment", body);
    }
    println!(
        "comments: seen={}, outside_window={}, too_short={}, low_score={}, scored={}",
        run.report.seen,
        run.report.outside_window,
        run.report.too_short,
        run.report.low_score,
        run.report.scored
    );
    common::print_outcome(&run.outcome);
    Ok(())
}
