// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent bearer-token derivation and verification (§6).
//!
//! Pure logic only — no HTTP binding. The plaintext token is a
//! 48-character base62 string generated once at agent creation/rotation
//! and never stored; only its hash is persisted.

use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use updockly_core::Agent;

const TOKEN_LENGTH: usize = 48;
const BASE62_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a new plaintext bearer token. The caller is responsible for
/// returning it to the operator exactly once and persisting only its hash.
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..BASE62_ALPHABET.len());
            BASE62_ALPHABET[idx] as char
        })
        .collect()
}

/// `lowercase_hex(SHA-256(token))`.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenVerdict {
    Accepted { bind_ip: bool },
    Expired,
    Rejected,
}

/// Verify a presented token and (optional) client IP against a stored
/// agent record. Does not mutate the agent — callers apply `bind_ip`
/// themselves so the check stays a pure function.
///
/// Accepts either the current `token_hash` or, for migration, the
/// plaintext token itself matching the stored hash's pre-image via a
/// legacy lookup the caller performs before calling this (this function
/// only evaluates the hash match it's given).
pub fn verify(
    agent: &Agent,
    presented_token: &str,
    presented_ip: Option<&str>,
    now: DateTime<Utc>,
    require_ip_binding: bool,
) -> TokenVerdict {
    let presented_hash = hash_token(presented_token);
    if presented_hash != agent.token_hash {
        return TokenVerdict::Rejected;
    }
    if agent.token_expires_at < now {
        return TokenVerdict::Expired;
    }
    if !require_ip_binding {
        return TokenVerdict::Accepted { bind_ip: false };
    }
    match (&agent.token_binding, presented_ip) {
        (None, _) => TokenVerdict::Accepted { bind_ip: true },
        (Some(bound), Some(presented)) if bound == presented => {
            TokenVerdict::Accepted { bind_ip: false }
        }
        (Some(_), _) => TokenVerdict::Rejected,
    }
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
