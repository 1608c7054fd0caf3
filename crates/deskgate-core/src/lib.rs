//! Deskgate Core — domain models, repository trait definitions and the
//! shared error taxonomy for the multi-tenant helpdesk permission core.
//!
//! Nothing in this crate touches a database or a network. The resolution
//! engine and the SurrealDB layer both build on the traits defined here.

pub mod defaults;
pub mod detect;
pub mod error;
pub mod models;
pub mod repository;

pub use error::{CoreError, CoreResult};
