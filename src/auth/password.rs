use argon2::{Argon2, Params};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};

use crate::error::{Error, Result};

/// Argon2id hashing with a fresh salt per call, output as a PHC string.
///
/// Verification goes through `password-hash`, whose output comparison is
/// constant-time.
#[derive(Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Custom cost parameters (memory in KiB, iterations, lanes).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| Error::Internal(format!("invalid argon2 params: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        })
    }

    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| Error::Internal(format!("failed to hash password: {e}")))
    }

    /// False on mismatch and on a stored hash that does not parse.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hashed) else {
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) fn fast_hasher() -> PasswordHasher {
    PasswordHasher::with_params(8, 1, 1).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_not_plaintext_and_verifies() {
        let hasher = fast_hasher();
        let hashed = hasher.hash("pw123").unwrap();

        assert_ne!(hashed, "pw123");
        assert!(hashed.starts_with("$argon2id$"));
        assert!(hasher.verify("pw123", &hashed));
        assert!(!hasher.verify("pw124", &hashed));
        assert!(!hasher.verify("", &hashed));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = fast_hasher();
        let a = hasher.hash("hunter2").unwrap();
        let b = hasher.hash("hunter2").unwrap();

        assert_ne!(a, b);
        assert!(hasher.verify("hunter2", &a));
        assert!(hasher.verify("hunter2", &b));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        let hasher = fast_hasher();
        assert!(!hasher.verify("pw123", "pw123"));
        assert!(!hasher.verify("pw123", ""));
        assert!(!hasher.verify("pw123", "$argon2id$v=19$garbage"));
    }

    #[test]
    fn hashes_from_other_params_still_verify() {
        let stored = PasswordHasher::default().hash("correct horse").unwrap();
        assert!(fast_hasher().verify("correct horse", &stored));
    }
}
