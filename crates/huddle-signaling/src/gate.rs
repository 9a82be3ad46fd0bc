//! Connection gate — authenticates each inbound connection before any
//! message is processed.

use std::sync::Arc;

use huddle_auth::claims::Identity;
use huddle_auth::verifier::TokenVerifier;
use huddle_core::error::AppError;

/// Authenticates inbound connections using the caller-supplied token.
///
/// The gate only produces a trusted [`Identity`] for later components to
/// consume; it never touches the presence registry. A failed verification
/// refuses the connection outright — the client must reconnect with a
/// fresh token.
#[derive(Clone)]
pub struct ConnectionGate {
    verifier: Arc<TokenVerifier>,
}

impl std::fmt::Debug for ConnectionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGate").finish()
    }
}

impl ConnectionGate {
    /// Creates a new gate.
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// Verifies a connection token and returns the identity to attach.
    pub fn authenticate(&self, token: &str) -> Result<Identity, AppError> {
        let identity = self.verifier.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Connection refused: token verification failed");
            e
        })?;

        tracing::debug!(user_id = %identity.user_id, "Connection authenticated");
        Ok(identity)
    }
}
