//! # Storage Module
//!
//! Persistence abstraction for daily habit records. The domain layer depends
//! only on the [`RecordStore`] trait; the implementation can be swapped
//! (hosted row store, in-memory fake) without touching domain logic.

pub mod memory;
pub mod rest;
pub mod traits;

pub use memory::MemoryRecordStore;
pub use rest::RestRecordStore;
pub use traits::RecordStore;
