//! Result storage adapters.

mod json_result_store;

pub use json_result_store::JsonFileResultStore;
