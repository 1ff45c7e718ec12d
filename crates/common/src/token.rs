//! Structural checks for bearer tokens issued by the admin API.
//!
//! The portal never holds the admin API's signing keys, so it cannot verify
//! a token. What it can do is reject values that are obviously not a JWT
//! before they are stored or forwarded:
//! - Tokens are size-checked BEFORE any decoding
//! - A token must be exactly three non-empty, dot-separated segments
//! - Each segment must decode as unpadded base64url
//!
//! None of this is a signature or claims check. [`peek_claim`] reads the
//! payload without verification and its result must only be used for
//! coarse routing decisions, never as proof of identity.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum accepted token size in bytes (8KB).
///
/// Larger values are rejected before base64 decoding.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// Number of dot-separated segments in a JWT (header.payload.signature).
pub const TOKEN_SEGMENTS: usize = 3;

/// Unpadded base64url engine that, like a browser's `atob`, tolerates
/// non-zero trailing bits in the last quantum.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

// =============================================================================
// Error Types
// =============================================================================

/// Reasons a token fails the structural check.
///
/// All variants share one client-facing message; the variant itself is only
/// logged at debug level.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFormatError {
    /// Token is empty.
    #[error("The access token is invalid")]
    Empty,

    /// Token size exceeds [`MAX_TOKEN_SIZE_BYTES`].
    #[error("The access token is invalid")]
    TooLarge,

    /// Token does not have exactly three segments.
    #[error("The access token is invalid")]
    WrongSegmentCount,

    /// One of the segments is empty.
    #[error("The access token is invalid")]
    EmptySegment,

    /// One of the segments is not unpadded base64url.
    #[error("The access token is invalid")]
    InvalidEncoding,
}

// =============================================================================
// Functions
// =============================================================================

/// Check the structure of a bearer token.
///
/// # Errors
///
/// Returns the first [`TokenFormatError`] encountered.
pub fn check_format(token: &str) -> Result<(), TokenFormatError> {
    if token.is_empty() {
        return Err(TokenFormatError::Empty);
    }

    if token.len() > MAX_TOKEN_SIZE_BYTES {
        tracing::debug!(
            target: "common.token",
            token_size = token.len(),
            max_size = MAX_TOKEN_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(TokenFormatError::TooLarge);
    }

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != TOKEN_SEGMENTS {
        tracing::debug!(
            target: "common.token",
            segments = segments.len(),
            "Token rejected: wrong segment count"
        );
        return Err(TokenFormatError::WrongSegmentCount);
    }

    for segment in segments {
        if segment.is_empty() {
            return Err(TokenFormatError::EmptySegment);
        }
        URL_SAFE_LENIENT.decode(segment).map_err(|e| {
            tracing::debug!(target: "common.token", error = %e, "Token rejected: segment is not base64url");
            TokenFormatError::InvalidEncoding
        })?;
    }

    Ok(())
}

/// Returns `true` iff [`check_format`] accepts the token.
#[must_use]
pub fn has_valid_format(token: &str) -> bool {
    check_format(token).is_ok()
}

/// Read a string claim from the token payload WITHOUT verifying it.
///
/// Returns `None` if the token is malformed, the payload is not a JSON
/// object, or the claim is missing, empty, or not a string.
#[must_use]
pub fn peek_claim(token: &str, claim: &str) -> Option<String> {
    check_format(token).ok()?;

    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_LENIENT.decode(payload).ok()?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;

    value
        .get(claim)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

// =============================================================================
// Tests
// =============================================================================
