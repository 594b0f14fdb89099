pub fn engine_name() -> &'static str {
    "mood-market"
}

pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
