pub mod neo_api;
pub mod sync;
