//! Service layer for the quiz store.
//! - `quiz`: domain types, the storage trait and the quiz service.
//! - `file` / `memory`: repository implementations.
//! - `errors`: the error taxonomy shared with the HTTP layer.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod file;
pub mod memory;
pub mod quiz;
