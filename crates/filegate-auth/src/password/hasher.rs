//! Password hashing capability with a closed set of algorithms.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use filegate_core::config::share::{HasherAlgorithm, ShareConfig};
use filegate_core::error::AppError;

/// Hashes and verifies share passwords.
///
/// The algorithm is picked at construction time. Verification follows the
/// format of the stored hash, so links hashed before an algorithm switch
/// keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordHasher {
    /// bcrypt with the given work factor.
    Bcrypt { cost: u32 },
    /// Argon2id with default parameters.
    Argon2,
}

impl PasswordHasher {
    /// Hashes a plaintext password.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        match self {
            Self::Bcrypt { cost } => bcrypt::hash(password, *cost)
                .map_err(|e| AppError::internal(format!("Password hashing failed: {e}"))),
            Self::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
            }
        }
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        if hash.starts_with("$argon2") {
            let parsed = PasswordHash::new(hash)
                .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;
            return match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(AppError::internal(format!(
                    "Password verification failed: {e}"
                ))),
            };
        }
        bcrypt::verify(password, hash)
            .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))
    }
}

impl From<&ShareConfig> for PasswordHasher {
    fn from(config: &ShareConfig) -> Self {
        match config.password_hasher {
            HasherAlgorithm::Bcrypt => Self::Bcrypt {
                cost: config.bcrypt_cost,
            },
            HasherAlgorithm::Argon2 => Self::Argon2,
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::Bcrypt {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}
