//! Presence and call-signaling configuration.

use serde::{Deserialize, Serialize};

/// How a connecting user enters the presence directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresenceMode {
    /// Mark the user available immediately after the authenticated connect,
    /// when the token's networking flag permits it.
    OnConnect,
    /// Wait for an explicit `declare-available` event.
    Explicit,
}

/// Coordinator behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalingConfig {
    /// Presence entry creation mode.
    #[serde(default = "default_presence_mode")]
    pub presence_mode: PresenceMode,
    /// Outbound per-connection channel buffer size.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Seconds before an unanswered ring auto-resolves as timed out.
    /// `0` disables the timeout.
    #[serde(default = "default_ring_timeout")]
    pub ring_timeout_seconds: u64,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            presence_mode: default_presence_mode(),
            channel_buffer_size: default_channel_buffer(),
            ring_timeout_seconds: default_ring_timeout(),
        }
    }
}

fn default_presence_mode() -> PresenceMode {
    PresenceMode::OnConnect
}

fn default_channel_buffer() -> usize {
    256
}

fn default_ring_timeout() -> u64 {
    30
}
