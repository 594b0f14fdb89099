use super::common;
use super::GlobalOpts;
use mood_application::config::to_toml_pretty;

pub(super) fn run_check_config(opts: &GlobalOpts) -> Result<(), String> {
    let config = common::load(opts)?;
    let auth = if crate::infra::resolve_reddit_credentials().is_some() {
        "oauth"
    } else {
        "public"
    };

    if opts.json {
        let body = serde_json::json!({
            "valid": true,
            "comments_auth": auth,
            "user_agent": crate::infra::resolve_user_agent(&config),
            "config": config,
        });
        return common::print_json("check-config", body);
    }

    common::print_config_summary("check-config", &config, opts);
    println!(
        "comments: r/{} auth={} user_agent={}",
        config.comments.subreddit,
        auth,
        crate::infra::resolve_user_agent(&config)
    );
    let effective = to_toml_pretty(&config).map_err(|err| err.to_string())?;
    println!("effective config:\n{effective}");
    Ok(())
}
