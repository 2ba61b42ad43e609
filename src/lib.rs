pub mod config;
pub mod matcher;
pub mod model;
pub mod monitor;
pub mod normalizer;
pub mod optimize;
pub mod source;
pub mod storage;
pub mod utils;
pub mod validate;
