//! Folio Store Library
//!
//! This crate provides the document store abstraction used by the editing services
//! and the public catalog, with an in-memory backend and a Firestore REST backend.
//!
//! # Document model
//!
//! A document is a flat JSON object (`Fields`) addressed by `collection/id`. Every
//! call is atomic on its own; nothing spans several documents. Writes with
//! `SetOptions::overwrite()` replace the whole document.

pub mod factory;
#[cfg(feature = "store-firestore")]
pub mod firestore;
#[cfg(feature = "store-memory")]
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use factory::create_store;
#[cfg(feature = "store-firestore")]
pub use firestore::FirestoreStore;
pub use folio_core::StoreBackend;
#[cfg(feature = "store-memory")]
pub use memory::MemoryStore;
pub use traits::{to_fields, Document, DocumentStore, Fields, SetOptions, StoreError, StoreResult};
