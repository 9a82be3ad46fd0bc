//! # huddle-signaling
//!
//! The real-time presence and call-signaling coordinator. Provides:
//!
//! - Connection gate attaching a verified identity to each socket
//! - Presence registry: the authoritative map of who is reachable
//! - Call session manager: the two-party request/accept/reject/hangup
//!   state machine, race-safe under a single critical section
//! - Signal relay: opaque peer-negotiation payload forwarding
//! - Broadcast emitter: presence snapshot fan-out to every connection

pub mod broadcast;
pub mod call;
pub mod connection;
pub mod coordinator;
pub mod gate;
pub mod message;
pub mod presence;
pub mod relay;

pub use connection::{ConnectionHandle, ConnectionId, SocketPool};
pub use coordinator::{Coordinator, CoordinatorStats};
pub use gate::ConnectionGate;
pub use message::{ClientEvent, ServerEvent};
pub use presence::{Availability, PresenceRegistry, PresenceSummary};
