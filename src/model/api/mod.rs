//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - IDs are serialised as hex strings.
//! - Passwords only ever appear in requests, never in responses.

pub mod auth;
pub mod id;
pub mod message;
pub mod response;
pub mod survey;
pub mod user;
