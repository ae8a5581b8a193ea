//! Storage backends implementing [`GameStore`](crate::domain::ports::GameStore).
//!
//! `in_memory` and `rocksdb` commit multi-record operations natively;
//! `document` only offers single-document atomicity and relies on the
//! engine's compensating actions.

pub mod document;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
