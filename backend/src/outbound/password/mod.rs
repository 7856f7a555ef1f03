//! Argon2id implementation of [`PasswordHasher`].

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier, SaltString,
};

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// Hashes passwords into PHC strings with the crate's default Argon2id
/// parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
        Ok(PasswordHash::new(phc.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError> {
        let parsed =
            PhcString::new(hash.as_str()).map_err(|err| PasswordHasherError::hash(err.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hashes_verify_only_for_the_hashed_password() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash("hunter2").expect("hash");
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify("hunter2", &hash).expect("verify"));
        assert!(!hasher.verify("hunter3", &hash).expect("verify"));
    }

    #[rstest]
    fn salts_differ_between_hashes() {
        let hasher = Argon2PasswordHasher;
        let first = hasher.hash("same").expect("hash");
        let second = hasher.hash("same").expect("hash");
        assert_ne!(first.as_str(), second.as_str());
    }

    #[rstest]
    fn corrupt_stored_hash_is_an_error() {
        let hasher = Argon2PasswordHasher;
        let result = hasher.verify("hunter2", &PasswordHash::new("plaintext"));
        assert!(matches!(result, Err(PasswordHasherError::Hash { .. })));
    }
}
