pub mod catalog;
pub mod config;
pub mod detail;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod infra;
pub mod normalize;
pub mod output;
pub mod risk;
pub mod server;
pub mod services;
