//! Content fingerprinting for dedup keys
//!
//! A fingerprint is the SHA-256 digest of the exact UTF-8 bytes of a string,
//! rendered as lowercase hex. It is a pure function of its input: no
//! normalization, trimming, or case folding happens here, so two strings
//! differing only in whitespace fingerprint differently. Repeated calls with
//! identical input return identical output across process restarts, which is
//! what makes the dedup store's insert-or-increment well-defined.
//!
//! Collisions are assumed negligible at this digest width; the store performs
//! no collision detection.

use sha2::{Digest, Sha256};

/// Compute the content fingerprint of a string.
///
/// # Examples
///
/// ```
/// use siebwerk::fingerprint::fingerprint;
///
/// let a = fingerprint("Wien bleibt Wien");
/// let b = fingerprint("Wien bleibt Wien");
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
///
/// // Exact bytes: whitespace matters.
/// assert_ne!(fingerprint("Wien"), fingerprint("Wien "));
/// ```
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
