//! Inbound and outbound wire event definitions.
//!
//! Events are JSON objects tagged by a kebab-case `type` field, carried
//! over the per-client WebSocket.

use serde::{Deserialize, Serialize};

use huddle_core::error::AppError;
use huddle_core::types::id::UserId;
use huddle_core::types::profile::ProfileSummary;

use crate::presence::PresenceSummary;

/// Events sent by the client to the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Opt into the presence directory. The optional profile overrides the
    /// summary carried by the connection token.
    DeclareAvailable {
        /// Replacement profile summary.
        #[serde(default)]
        profile: Option<ProfileSummary>,
    },
    /// Opt out of the presence directory.
    DeclareUnavailable,
    /// Ring another user.
    RequestCall {
        /// The callee.
        target_user_id: UserId,
    },
    /// Accept a ring from `target_user_id`.
    AcceptCall {
        /// The original caller.
        target_user_id: UserId,
    },
    /// Decline a ring from `target_user_id`.
    RejectCall {
        /// The original caller.
        target_user_id: UserId,
    },
    /// Forward an opaque negotiation payload to the other party.
    RelaySignal {
        /// The recipient.
        target_user_id: UserId,
        /// Opaque payload; never interpreted by the coordinator.
        payload: serde_json::Value,
    },
    /// Hang up the call with `target_user_id`.
    EndCall {
        /// The peer being hung up on.
        target_user_id: UserId,
    },
}

/// Events emitted by the coordinator to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Full presence directory, pushed to every connection on each change.
    PresenceSnapshot {
        /// All currently-available users with their availability.
        users: Vec<PresenceSummary>,
    },
    /// Another user is ringing this client.
    IncomingCall {
        /// The caller.
        from_user_id: UserId,
        /// The caller's public profile summary.
        profile: ProfileSummary,
    },
    /// A previously-sent ring was accepted; the call is live.
    CallAccepted {
        /// The accepting callee.
        from_user_id: UserId,
    },
    /// A previously-sent ring was declined.
    CallRejected {
        /// The declining callee.
        from_user_id: UserId,
    },
    /// The active call (or an incoming ring) was terminated.
    CallEnded {
        /// Who ended it.
        by_user_id: UserId,
    },
    /// A request failed; reported only on the originating connection.
    CallError {
        /// Machine-readable code from the error taxonomy.
        code: String,
        /// Human-readable message.
        message: String,
    },
    /// An opaque negotiation payload from the other party.
    RelaySignal {
        /// The sender.
        from_user_id: UserId,
        /// Opaque payload, forwarded unmodified.
        payload: serde_json::Value,
    },
}

impl ServerEvent {
    /// Builds a `call-error` event from an application error.
    pub fn error(err: &AppError) -> Self {
        Self::CallError {
            code: err.kind.to_string(),
            message: err.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_tags() {
        let event: ClientEvent = serde_json::from_str(
            r#"{"type":"request-call","target_user_id":"8c7f9e7a-5f7d-4f4e-9d2a-1f2b3c4d5e6f"}"#,
        )
        .expect("deserialize");
        assert!(matches!(event, ClientEvent::RequestCall { .. }));
    }

    #[test]
    fn test_declare_available_profile_is_optional() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"type":"declare-available"}"#).expect("deserialize");
        assert!(matches!(
            event,
            ClientEvent::DeclareAvailable { profile: None }
        ));
    }

    #[test]
    fn test_relay_payload_is_opaque() {
        let raw = r#"{"type":"relay-signal","target_user_id":"8c7f9e7a-5f7d-4f4e-9d2a-1f2b3c4d5e6f","payload":{"sdp":"v=0...","kind":"offer"}}"#;
        let event: ClientEvent = serde_json::from_str(raw).expect("deserialize");
        match event {
            ClientEvent::RelaySignal { payload, .. } => {
                assert_eq!(payload["kind"], "offer");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_server_event_tag_is_kebab_case() {
        let event = ServerEvent::CallEnded {
            by_user_id: UserId::new(),
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "call-ended");
    }

    #[test]
    fn test_error_event_carries_taxonomy_code() {
        let err = AppError::target_busy("User is currently busy");
        let json = serde_json::to_value(ServerEvent::error(&err)).expect("serialize");
        assert_eq!(json["type"], "call-error");
        assert_eq!(json["code"], "TARGET_BUSY");
    }
}
