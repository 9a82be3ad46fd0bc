//! # huddle-auth
//!
//! Verification of the signed tokens presented at connection time.
//!
//! Two issuance paths exist in the surrounding system: a short-lived
//! realtime token carrying the full profile summary, and a longer-lived
//! general session token carrying only the core identity. The
//! [`verifier::TokenVerifier`] accepts whichever form is presented.
//! Token issuance itself lives in the external identity service.

pub mod claims;
pub mod verifier;

pub use claims::{Identity, RealtimeClaims, SessionClaims, TokenKind};
pub use verifier::TokenVerifier;
