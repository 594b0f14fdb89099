pub mod asset;
pub mod bucket_key;
pub mod observation;
pub mod rows;
pub mod timestamp;
