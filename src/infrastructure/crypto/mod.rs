use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;

use crate::application::ports::credential_hasher::CredentialHasher;

/// Argon2id digests in PHC string format (`$argon2id$v=19$...`).
#[derive(Clone)]
pub struct Argon2CredentialHasher {
    params: Params,
}

impl Default for Argon2CredentialHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl Argon2CredentialHasher {
    /// Memory cost in KiB, iterations, lanes.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> anyhow::Result<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {}", e))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        // Cost parameters come from the digest itself.
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Argon2CredentialHasher {
        Argon2CredentialHasher::with_params(64, 1, 1).unwrap()
    }

    #[test]
    fn digest_is_salted_and_verifies() {
        let h = hasher();
        let a = h.hash("password").unwrap();
        let b = h.hash("password").unwrap();
        assert!(a.starts_with("$argon2id$"));
        assert_ne!(a, "password");
        assert_ne!(a, b);
        assert!(h.verify("password", &a));
        assert!(!h.verify("INVALID", &a));
    }

    #[test]
    fn malformed_digest_never_verifies() {
        let h = hasher();
        assert!(!h.verify("password", ""));
        assert!(!h.verify("password", "HASHED_PASSWORD"));
    }

    #[test]
    fn rejects_bad_params() {
        assert!(Argon2CredentialHasher::with_params(1, 1, 1).is_err());
    }
}
