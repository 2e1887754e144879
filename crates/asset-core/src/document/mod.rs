//! Host document model.
//!
//! The asset system does not own the document it works for. This module
//! holds the slice of the host's document model it relies on:
//! - `IdType` / `LocalId`: data-blocks and non-owning handles to them
//! - `Document`: file path and contained data-blocks
//! - `IdRemapper`: how handles follow merges and deletions
//! - `SaveHandlerRegistry`: post-save notifications

mod events;
mod id;
mod open_document;
mod remap;

pub use events::{SaveHandler, SaveHandlerId, SaveHandlerRegistry};
pub use id::{IdType, LocalId, SessionUid};
pub use open_document::Document;
pub use remap::{IdRemapper, RemapOutcome};
