use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const MIN_SECRET_LEN: usize = 32;
const TOKEN_DELIMITER: char = ':';

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("session secret is too short (min {MIN_SECRET_LEN} bytes)")]
    SecretTooShort,

    #[error("session token is not valid base64 text")]
    InvalidEncoding,

    #[error("invalid session token format")]
    InvalidFormat,

    #[error("session token signature is invalid")]
    InvalidSignature,
}

/// Signs user ids into opaque session tokens and verifies them again.
///
/// Token layout: `base64(user_id ":" hex(sha256(user_id ++ secret)))`.
/// The secret is fixed for the lifetime of the codec; every token issued
/// under it stops verifying once a codec with another secret takes over.
#[derive(Clone)]
pub struct SessionCodec {
    secret: Arc<[u8]>,
}

impl SessionCodec {
    pub fn new(secret: Vec<u8>) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::SecretTooShort);
        }

        Ok(Self {
            secret: Arc::<[u8]>::from(secret),
        })
    }

    /// Codec keyed by a secret that exists only in this process.
    pub fn generate() -> Self {
        let bytes: [u8; 32] = rand::rng().random();
        Self {
            secret: Arc::<[u8]>::from(hex::encode(bytes).into_bytes()),
        }
    }

    /// Ids containing the delimiter encode, but such tokens never decode.
    pub fn encode(&self, user_id: &str) -> String {
        let signature = self.sign(user_id);
        STANDARD.encode(format!("{user_id}{TOKEN_DELIMITER}{signature}"))
    }

    pub fn decode(&self, token: &str) -> Result<String, TokenError> {
        let raw = STANDARD
            .decode(token)
            .map_err(|_| TokenError::InvalidEncoding)?;
        let payload = String::from_utf8(raw).map_err(|_| TokenError::InvalidEncoding)?;

        let mut parts = payload.split(TOKEN_DELIMITER);
        let (user_id, signature) = match (parts.next(), parts.next(), parts.next()) {
            (Some(user_id), Some(signature), None)
                if !user_id.is_empty() && !signature.is_empty() =>
            {
                (user_id, signature)
            }
            _ => return Err(TokenError::InvalidFormat),
        };

        let expected = self.sign(user_id);
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return Err(TokenError::InvalidSignature);
        }

        Ok(user_id.to_string())
    }

    /// Like [`decode`](Self::decode), with every failure collapsed to `None`.
    pub fn verify(&self, token: &str) -> Option<String> {
        match self.decode(token) {
            Ok(user_id) => Some(user_id),
            Err(err) => {
                log::debug!("Rejected session token: {}", err);
                None
            }
        }
    }

    fn sign(&self, user_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(user_id.as_bytes());
        hasher.update(&*self.secret);
        hex::encode(hasher.finalize())
    }
}
