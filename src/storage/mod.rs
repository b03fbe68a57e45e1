//! Persistence adapters for processed documents and run artifacts

pub mod blob_store;
pub mod document_store;
pub mod in_memory;

pub use blob_store::{processed_key, report_key, FsBlobStore};
pub use document_store::JsonFileDocumentStore;
pub use in_memory::InMemoryDocumentStore;
