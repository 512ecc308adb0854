//! Session token handling
//!
//! Tokens are signed JWTs issued by the backend. The client never verifies
//! them: it only reads the claims in the payload segment to learn who is
//! logged in. Expiry and signature are the backend's concern.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::Deserialize;

use crate::models::{Identity, ObjectId, Role};

mod storage;

pub use storage::{FileTokenStorage, MemoryTokenStorage, StorageError, TokenStorage};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("token is not a three-part JWT")]
    Malformed,

    #[error("token payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("token claims are unreadable: {0}")]
    Claims(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct Claims {
    id: ObjectId,
    email: String,
    role: Role,
}

/// Read the identity claims (`id`, `email`, `role`) out of a session token.
pub fn decode_identity(token: &str) -> Result<Identity, SessionError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(SessionError::Malformed),
    };

    let payload = payload.trim_end_matches('=');
    // Backend tokens are base64url; accept the standard alphabet too.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))?;
    let claims: Claims = serde_json::from_slice(&bytes)?;

    Ok(Identity {
        id: claims.id,
        email: claims.email,
        role: claims.role,
    })
}

#[cfg(test)]
pub(crate) fn encode_test_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}
