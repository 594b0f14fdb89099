pub mod config;
pub mod merge;
pub mod meta;
pub mod outcome;
pub mod prices;
pub mod sentiment;
