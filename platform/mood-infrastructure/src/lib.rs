pub mod comments;
pub mod http;
pub mod persistence;
pub mod prices;
pub mod scoring;
