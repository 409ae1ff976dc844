//! `revdesk-core` — shared domain primitives.
//!
//! This crate contains the strongly-typed identifiers and the error taxonomy
//! every other crate resolves its failures into. No IO, no transport.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult, ErrorKind};
pub use id::{RecordId, UserId};
