//! Storage abstractions for service layer
//!
//! Reusable file-backed helpers shared by the concrete stores.

pub mod json_dir_store;
