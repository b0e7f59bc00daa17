//! In-process stores, used by tests and the `memory` storage backend.

pub mod quiz_store;
