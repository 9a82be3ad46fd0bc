//! # huddle-api
//!
//! HTTP surface for the coordinator: the authenticated `/ws` upgrade
//! carrying the signaling protocol, and the liveness endpoints used for
//! operational checks.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
