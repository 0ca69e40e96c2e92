pub mod password;
pub mod token;

pub use password::{Credential, PasswordHasher, PasswordScheme};
pub use token::{SessionCodec, TokenError};
