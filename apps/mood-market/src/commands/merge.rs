use super::common;
use super::GlobalOpts;

pub(super) fn run_merge(opts: &GlobalOpts) -> Result<(), String> {
    let config = common::load(opts)?;
    common::print_config_summary("merge", &config, opts);

    let crate::infra::MergeDeps { store, writer } = crate::infra::build_merge_deps(&config);
    let summary = mood_application::merge::run_merge(&config, store.as_ref(), writer.as_ref())
        .map_err(|err| err.to_string())?;

    if opts.json {
        let body = serde_json::to_value(&summary)
            .map_err(|err| format!("failed to serialize summary: {err}"))?;
        return common::print_json("merge", body);
    }
    let report = &summary.report;
    println!(
        "inputs: price_rows={}, sentiment_rows={}",
        report.price_rows, report.sentiment_rows
    );
    println!(
        "hours: matched={}, price_only={}, sentiment_only={}",
        report.matched_hours, report.price_only_hours, report.sentiment_only_hours
    );
    println!(
        "wrote {} row(s) to {} (sha256={})",
        report.joined_rows,
        summary.path.display(),
        summary.sha256
    );
    Ok(())
}
