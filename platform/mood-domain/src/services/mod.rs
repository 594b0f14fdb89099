pub mod alignment;
pub mod bucketing;
pub mod prices;
pub mod sentiment;
