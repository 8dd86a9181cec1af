//! Argon2 password hashing and the signup password policy.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use yatube_core::ports::{AuthError, PasswordService};

/// Shortest password accepted at signup.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Argon2-based password service.
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
    min_len: usize,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
            min_len: MIN_PASSWORD_LEN,
        }
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn validate(&self, password: &str, username: &str) -> Vec<String> {
        let mut problems = Vec::new();
        if password.chars().count() < self.min_len {
            problems.push(format!(
                "This password is too short. It must contain at least {} characters.",
                self.min_len
            ));
        }
        if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            problems.push("This password is entirely numeric.".to_string());
        }
        if !username.is_empty() && password.to_lowercase() == username.to_lowercase() {
            problems.push("The password is too similar to the username.".to_string());
        }
        problems
    }
}
