use crate::errors::PipelineError;
use std::collections::BTreeMap;

pub trait PriceSource {
    /// Current USD price per requested source id. Any transport, status or
    /// payload problem is `PipelineError::SourceUnavailable`.
    fn fetch_prices(&self, ids: &[String]) -> Result<BTreeMap<String, f64>, PipelineError>;
}
