use super::common;
use super::GlobalOpts;
use chrono::Utc;
use mood_application::prices::ingest_prices;

pub(super) fn run_prices(opts: &GlobalOpts) -> Result<(), String> {
    let config = common::load(opts)?;
    common::print_config_summary("prices", &config, opts);

    let crate::infra::PriceDeps { source, store } = crate::infra::build_price_deps(&config)?;
    let outcome = ingest_prices(&config, source.as_ref(), store.as_ref(), Utc::now())
        .map_err(|err| err.to_string())?;

    if opts.json {
        let body = serde_json::to_value(&outcome)
            .map_err(|err| format!("failed to serialize outcome: {err}"))?;
        return common::print_json("prices", body);
    }
    common::print_outcome(&outcome);
    Ok(())
}
