//! # huddle-core
//!
//! Shared foundation for the Huddle call-signaling coordinator:
//!
//! - Configuration schemas loaded from layered TOML + environment
//! - The unified [`error::AppError`] type used across all crates
//! - Domain identifier newtypes and the opaque profile summary

pub mod config;
pub mod error;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use types::id::{CallId, UserId};
pub use types::profile::ProfileSummary;
