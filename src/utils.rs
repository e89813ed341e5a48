use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::Page;

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// PKCE code verifier: 128 alphanumeric characters, the maximum RFC 7636 allows.
pub fn generate_code_verifier() -> String {
    random_alphanumeric(128)
}

/// S256 PKCE challenge for `verifier`: URL-safe base64 of its SHA-256 digest.
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Anti-forgery `state` value sent with the authorize redirect.
pub fn generate_state() -> String {
    random_alphanumeric(32)
}

/// Opaque identifier of a browser session.
pub fn generate_session_id() -> String {
    random_alphanumeric(48)
}

/// Reads `offset` and `limit` from query parameters.
///
/// `offset` defaults to 0 and `limit` to `max_limit`. Values that are not
/// non-negative integers, a zero limit, or a limit above `max_limit` are
/// rejected with a message suitable for the response body.
pub fn parse_page(params: &HashMap<String, String>, max_limit: u32) -> Result<Page, String> {
    let offset = match params.get("offset").map(|v| v.trim()) {
        None | Some("") => 0,
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| format!("offset must be a non-negative integer, got '{raw}'"))?,
    };

    let limit = match params.get("limit").map(|v| v.trim()) {
        None | Some("") => max_limit,
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| format!("limit must be a positive integer, got '{raw}'"))?,
    };

    if limit == 0 || limit > max_limit {
        return Err(format!("limit must be between 1 and {max_limit}"));
    }

    Ok(Page { offset, limit })
}
