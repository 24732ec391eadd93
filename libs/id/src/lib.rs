//! # flotilla-id
//!
//! Typed ID newtypes for the cluster objects the scheduler tracks.
//!
//! ## Design Principles
//!
//! - IDs are issued by the cluster state store; this crate treats them as
//!   opaque strings and never generates them
//! - IDs are typed to prevent mixing different object kinds (a `TaskId`
//!   cannot be passed where a `ServiceId` is expected)
//! - Parsing is strict: empty or whitespace-bearing strings are rejected,
//!   including on the serde path
//! - IDs support roundtrip serialization (parse → format → parse)

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;
