//! File-backed stores.

pub mod quiz_store;
