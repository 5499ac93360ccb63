//! OAuth `state` token encoding and decoding.
//!
//! The state token binds an authorization request to the user who started
//! it: a random nonce joined to the user's UUID with a `:` delimiter
//! (neither hex nor UUIDs can contain one). The provider echoes the token
//! back unchanged at callback time, where [`parse`] recovers the user id.
//!
//! Validation is structural only. The nonce is not checked against a
//! server-side record, so the binding is round-trip trust, not
//! cryptographic authorization.

use rand::RngCore;

use crate::types::DbId;

/// Nonce length in bytes before hex encoding.
const NONCE_LEN: usize = 32;

/// Delimiter between the nonce and the user id segments.
const DELIMITER: char = ':';

/// Errors from parsing a callback state token.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateParseError {
    #[error("State token has no user segment")]
    MissingUserSegment,

    #[error("State token nonce segment is empty")]
    EmptyNonce,

    #[error("State token user segment is not a valid UUID")]
    InvalidUserId,
}

/// The fields recovered from a valid state token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedState {
    /// The user who initiated the OAuth flow.
    pub user_id: DbId,
}

/// Issue a fresh state token for the given user.
pub fn issue(user_id: DbId) -> String {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);

    let nonce_hex: String = nonce.iter().map(|b| format!("{b:02x}")).collect();
    format!("{nonce_hex}{DELIMITER}{user_id}")
}

/// Parse a state token received at the OAuth callback.
///
/// Splits on the first delimiter; a missing, empty, or non-UUID user
/// segment is rejected so no token exchange happens for an unbindable
/// callback.
pub fn parse(token: &str) -> Result<ParsedState, StateParseError> {
    let (nonce, user) = token
        .split_once(DELIMITER)
        .ok_or(StateParseError::MissingUserSegment)?;

    if nonce.is_empty() {
        return Err(StateParseError::EmptyNonce);
    }
    if user.is_empty() {
        return Err(StateParseError::MissingUserSegment);
    }

    let user_id = user.parse().map_err(|_| StateParseError::InvalidUserId)?;
    Ok(ParsedState { user_id })
}
