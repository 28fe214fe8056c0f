//! Password-hash format checks.
//!
//! Latch never computes password hashes. The schema only asks whether the
//! value it is about to store looks like one, so that a plaintext password
//! cannot end up in the database by mistake.

use bcrypt::HashParts;

/// Decides whether a string is an acceptable stored password hash.
pub trait PasswordHashPredicate: Send + Sync {
    fn is_password_hash(&self, candidate: &str) -> bool;
}

impl<F> PasswordHashPredicate for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_password_hash(&self, candidate: &str) -> bool {
        self(candidate)
    }
}

/// Accepts bcrypt modular-crypt strings (`$2a$`, `$2b$`, `$2x$`, `$2y$`) with a
/// cost between 4 and 31.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptHash;

impl PasswordHashPredicate for BcryptHash {
    fn is_password_hash(&self, candidate: &str) -> bool {
        candidate
            .parse::<HashParts>()
            .is_ok_and(|parts| (4..=31).contains(&parts.get_cost()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcrypt_accepts_real_hash() {
        let hash = bcrypt::hash("correct horse", 4).unwrap();
        assert!(BcryptHash.is_password_hash(&hash));
    }

    #[test]
    fn test_bcrypt_accepts_known_prefixes() {
        for prefix in ["2a", "2b", "2x", "2y"] {
            let hash = format!("${prefix}$10$abcdefghijklmnopqrstuuH2rWx3j6CwWZOWZ4eSRhvrqDNNLWOOe");
            assert!(BcryptHash.is_password_hash(&hash), "{hash}");
        }
    }

    #[test]
    fn test_bcrypt_rejects_plaintext_and_malformed() {
        assert!(!BcryptHash.is_password_hash("hunter2"));
        assert!(!BcryptHash.is_password_hash(""));
        // wrong prefix
        assert!(!BcryptHash.is_password_hash(
            "$1$10$abcdefghijklmnopqrstuuH2rWx3j6CwWZOWZ4eSRhvrqDNNLWOOe"
        ));
        // truncated
        assert!(!BcryptHash.is_password_hash("$2b$10$abcdefghijklmnopqrstuu"));
        // non-numeric cost
        assert!(!BcryptHash.is_password_hash(
            "$2b$xx$abcdefghijklmnopqrstuuH2rWx3j6CwWZOWZ4eSRhvrqDNNLWOOe"
        ));
    }

    #[test]
    fn test_closures_are_predicates() {
        let starts_with_hash = |s: &str| s.starts_with("hash:");
        assert!(starts_with_hash.is_password_hash("hash:abc"));
        assert!(!starts_with_hash.is_password_hash("abc"));
    }
}
