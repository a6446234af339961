//! Hashing helpers.

use sha2::{Digest, Sha256};

/// Length of an email fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 12;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Short, stable identifier for an email, safe to put in logs.
///
/// The input should already be normalized; different spellings of the same
/// address otherwise produce different fingerprints.
pub fn email_fingerprint(email: &str) -> String {
    let mut digest = sha256_hex(email);
    digest.truncate(FINGERPRINT_LEN);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex("test"),
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_email_fingerprint_is_prefix_of_digest() {
        let fp = email_fingerprint("test");
        assert_eq!(fp, "9f86d081884c");
        assert_eq!(fp.len(), FINGERPRINT_LEN);
    }

    #[test]
    fn test_email_fingerprint_distinguishes_addresses() {
        assert_ne!(
            email_fingerprint("a@example.com"),
            email_fingerprint("b@example.com")
        );
        assert_eq!(
            email_fingerprint("a@example.com"),
            email_fingerprint("a@example.com")
        );
    }
}
