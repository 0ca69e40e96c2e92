use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum CollegeMapError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Invalid name or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthorized,

    #[error("An account with this name already exists")]
    UserExists,

    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal server error")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl ResponseError for CollegeMapError {
    fn status_code(&self) -> StatusCode {
        match self {
            CollegeMapError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            CollegeMapError::Unauthorized => StatusCode::UNAUTHORIZED,
            CollegeMapError::UserExists => StatusCode::CONFLICT,
            CollegeMapError::Validation(_) => StatusCode::BAD_REQUEST,
            CollegeMapError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            CollegeMapError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CollegeMapError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CollegeMapError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CollegeMapError::Serialization(_) => StatusCode::BAD_REQUEST,
            CollegeMapError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {:?}", self);
        }

        let error_response = ErrorResponse {
            success: false,
            error: self.to_string(),
        };

        HttpResponse::build(status).json(error_response)
    }
}

impl From<actix_web::error::BlockingError> for CollegeMapError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        CollegeMapError::Internal(format!("Blocking task failed: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, CollegeMapError>;
