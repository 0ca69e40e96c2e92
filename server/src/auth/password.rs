use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::{CollegeMapError, Result};

/// Separates the salt from the digest in a legacy credential.
pub const CREDENTIAL_DELIMITER: char = ':';

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

/// Algorithm used for newly created credentials.
///
/// Verification always understands both formats, so switching the scheme
/// never locks out existing accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    #[default]
    Bcrypt,
    /// `salt:hex(sha256(salt + password))`, kept for compatibility with
    /// credentials written before bcrypt was introduced.
    Sha256,
}

/// A stored, salted password credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_bcrypt(&self) -> bool {
        self.0.starts_with("$2")
    }
}

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    scheme: PasswordScheme,
    cost: u32,
    /// Credential no password is known for, checked when the account is
    /// missing so both failure paths cost one full verification.
    decoy: Arc<Credential>,
}

impl PasswordHasher {
    pub fn new(scheme: PasswordScheme, cost: u32) -> Result<Self> {
        if scheme == PasswordScheme::Bcrypt && !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost)
        {
            return Err(CollegeMapError::Config(format!(
                "bcrypt cost must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}, got {cost}"
            )));
        }

        let mut hasher = Self {
            scheme,
            cost,
            decoy: Arc::new(Credential(String::new())),
        };
        let secret = Uuid::new_v4().to_string();
        hasher.decoy = Arc::new(hasher.hash(&secret)?);
        Ok(hasher)
    }

    pub fn scheme(&self) -> PasswordScheme {
        self.scheme
    }

    /// Creates a fresh credential for `password` with a new random salt.
    ///
    /// Password policy is the caller's concern; an empty password hashes fine.
    pub fn hash(&self, password: &str) -> Result<Credential> {
        match self.scheme {
            PasswordScheme::Bcrypt => Ok(Credential(bcrypt::hash(password, self.cost)?)),
            PasswordScheme::Sha256 => {
                let salt = Uuid::new_v4().to_string();
                let digest = salted_digest(&salt, password);
                Ok(Credential(format!("{salt}{CREDENTIAL_DELIMITER}{digest}")))
            }
        }
    }

    /// Checks `password` against `credential`. Malformed credentials never
    /// verify.
    pub fn verify(&self, password: &str, credential: &Credential) -> bool {
        if credential.is_bcrypt() {
            return bcrypt::verify(password, credential.as_str()).unwrap_or(false);
        }

        let Some((salt, stored)) = credential.as_str().split_once(CREDENTIAL_DELIMITER) else {
            return false;
        };
        if salt.is_empty() || stored.is_empty() {
            return false;
        }

        let computed = salted_digest(salt, password);
        computed.as_bytes().ct_eq(stored.as_bytes()).into()
    }

    /// Stand-in for [`verify`](Self::verify) when no account matched. Does
    /// the same work against the decoy and always fails.
    pub fn verify_missing(&self, password: &str) -> bool {
        self.verify(password, &self.decoy);
        false
    }
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
