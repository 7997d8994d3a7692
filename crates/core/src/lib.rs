//! Core types for Trellis.
//!
//! This crate holds what every other Trellis crate agrees on:
//! - [`TrellisError`] / [`TrellisResult`]: the one error type
//! - [`DocumentId`], [`Document`] and write options: the document model
//! - [`CollectionStore`]: the store contract the graph engine consumes

#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{TrellisError, TrellisResult};
pub use traits::{CollectionStore, StoreTransaction};
pub use types::{
    endpoints_of, into_body, Body, CollectionType, Document, DocumentId, DocumentMeta,
    EdgeDirection, RemoveOptions, Revision, WriteOptions, HANDLE_SEP,
};
