//! Password hashing and verification using Argon2id

use crate::{
    config::SecurityConfig,
    error::{AppError, RegistrationFailure},
};
use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};

/// Fixed salt for the throwaway hash computed when a username is unknown.
const DUMMY_SALT: &[u8] = b"hms-auth-unknown-user";

/// Password hasher with configurable parameters
///
/// Hashes are PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`), so the
/// salt travels with the hash. bcrypt hashes written by the previous system
/// are still accepted by [`PasswordHasher::verify`].
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    params: Params,
}

impl PasswordHasher {
    /// Create hasher with the argon2 crate defaults (m=19MiB, t=2, p=1)
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    pub fn with_params(params: Params) -> Self {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone());
        Self { argon2, params }
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AppError::Config(format!("Invalid Argon2 params: {}", e)))?;

        Ok(Self::with_params(params))
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash.
    ///
    /// Malformed or unsupported hashes yield `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if is_bcrypt(hash) {
            return bcrypt::verify(password, hash).unwrap_or_else(|e| {
                tracing::debug!("Failed to verify bcrypt hash: {:?}", e);
                false
            });
        }

        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Failed to parse password hash: {:?}", e);
                return false;
            }
        };

        // Parameters are read from the hash itself, so rows written with older
        // settings keep verifying.
        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Spend roughly one verification worth of work without a stored hash.
    pub fn verify_dummy(&self, password: &str) {
        if let Ok(salt) = SaltString::encode_b64(DUMMY_SALT) {
            let _ = self.argon2.hash_password(password.as_bytes(), &salt);
        }
    }

    /// Whether a stored hash should be replaced on the next successful login.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        if is_bcrypt(hash) {
            return true;
        }

        let Ok(parsed) = PasswordHash::new(hash) else {
            return true;
        };

        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }

        match Params::try_from(&parsed) {
            Ok(stored) => {
                stored.m_cost() != self.params.m_cost()
                    || stored.t_cost() != self.params.t_cost()
                    || stored.p_cost() != self.params.p_cost()
            }
            Err(_) => true,
        }
    }

    /// Validate a registration password pair against policy.
    ///
    /// Mismatch is reported before length. Length counts characters, not bytes.
    pub fn validate_password_policy(
        password: &str,
        confirm_password: &str,
        min_length: usize,
    ) -> Result<(), RegistrationFailure> {
        if password != confirm_password {
            return Err(RegistrationFailure::Mismatch);
        }

        if password.chars().count() < min_length {
            return Err(RegistrationFailure::TooShort { min_length });
        }

        Ok(())
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

fn is_bcrypt(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}
