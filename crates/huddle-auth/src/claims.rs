//! Claim payloads for the two accepted token forms.

use serde::{Deserialize, Serialize};

use huddle_core::types::id::UserId;
use huddle_core::types::profile::ProfileSummary;

/// Claims carried by the short-lived realtime token.
///
/// Minted per WebSocket session by the identity service; includes the full
/// profile summary so the coordinator never has to query a user store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeClaims {
    /// Subject — the user ID.
    pub sub: UserId,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Short bio.
    #[serde(default)]
    pub bio: Option<String>,
    /// Industry label.
    #[serde(default)]
    pub industry: Option<String>,
    /// Skill tags.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Whether the user opted into networking availability.
    #[serde(default)]
    pub networking_available: bool,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Claims carried by the general session token.
///
/// This is the longer-lived credential other parts of the platform use; it
/// carries only the core identity, so a connection authenticated this way
/// starts without a profile-rich presence payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject — the user ID.
    pub sub: UserId,
    /// Display name.
    pub name: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Which token form authenticated the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived realtime token.
    Realtime,
    /// General session token.
    Session,
}

/// Trusted identity context produced by the connection gate and attached to
/// a connection for its lifetime.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Stable user identity.
    pub user_id: UserId,
    /// Profile summary to publish when the user becomes available.
    pub profile: ProfileSummary,
    /// Networking opt-in carried by the token, when present.
    pub networking_available: bool,
    /// Which token form was presented.
    pub token_kind: TokenKind,
}

impl From<RealtimeClaims> for Identity {
    fn from(claims: RealtimeClaims) -> Self {
        Self {
            user_id: claims.sub,
            profile: ProfileSummary {
                name: claims.name,
                image: claims.image,
                bio: claims.bio,
                industry: claims.industry,
                skills: claims.skills,
            },
            networking_available: claims.networking_available,
            token_kind: TokenKind::Realtime,
        }
    }
}

impl From<SessionClaims> for Identity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            profile: ProfileSummary::named(claims.name),
            // The session token carries no networking flag; the client must
            // opt in explicitly after connecting.
            networking_available: false,
            token_kind: TokenKind::Session,
        }
    }
}
