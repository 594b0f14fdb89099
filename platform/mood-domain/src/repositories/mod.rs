pub mod comment_source;
pub mod dataset;
pub mod price_source;
pub mod scorer;
pub mod series_store;
