//! Share and extract code generation for supplier self-service links.
//!
//! This module lives in `core` (zero internal deps) so it can be used by both
//! the API/repository layer and any future worker or CLI tooling.

use rand::Rng;

/// Length of a generated share code (alphanumeric characters).
///
/// Share codes are the public capability in portal URLs and must be long
/// enough to resist enumeration. Twelve alphanumeric characters give
/// 62^12 ≈ 3×10^21 possibilities.
pub const SHARE_CODE_LENGTH: usize = 12;

/// Length of a generated extract code (alphanumeric characters).
///
/// Extract codes are a weak secondary factor, comparable to a document
/// PIN. They must never be relied on as the sole gate.
pub const EXTRACT_CODE_LENGTH: usize = 4;

/// Maximum attempts to find a non-colliding share code before giving up.
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

/// Generate a new random share code.
pub fn generate_share_code() -> String {
    random_alphanumeric(SHARE_CODE_LENGTH)
}

/// Generate a new random extract code.
pub fn generate_extract_code() -> String {
    random_alphanumeric(EXTRACT_CODE_LENGTH)
}

/// Validate a caller-supplied extract code: exactly
/// [`EXTRACT_CODE_LENGTH`] alphanumeric characters.
pub fn validate_extract_code(code: &str) -> Result<(), String> {
    if code.len() != EXTRACT_CODE_LENGTH || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!(
            "Extract code must be exactly {EXTRACT_CODE_LENGTH} alphanumeric characters"
        ));
    }
    Ok(())
}

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
