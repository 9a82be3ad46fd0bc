//! Token verification configuration.

use serde::{Deserialize, Serialize};

/// Shared secrets for the two token issuance paths.
///
/// The coordinator verifies tokens but never mints them; both secrets must
/// match what the external identity service signs with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret for the short-lived realtime token (HMAC-SHA256).
    #[serde(default = "default_realtime_secret")]
    pub realtime_secret: String,
    /// Secret for the general session token (HMAC-SHA256).
    #[serde(default = "default_session_secret")]
    pub session_secret: String,
    /// Clock-skew leeway for expiry checks, in seconds.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            realtime_secret: default_realtime_secret(),
            session_secret: default_session_secret(),
            leeway_seconds: default_leeway(),
        }
    }
}

fn default_realtime_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_session_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_leeway() -> u64 {
    5
}
