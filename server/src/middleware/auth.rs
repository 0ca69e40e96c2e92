use std::future::{ready, Ready};

use actix_web::{
    body::MessageBody,
    dev::{Payload, ServiceRequest, ServiceResponse},
    middleware::Next,
    web, FromRequest, HttpMessage, HttpRequest,
};

use crate::{
    db::{Store, User},
    error::CollegeMapError,
    session::SessionManager,
};

/// Request-scoped result of session resolution.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

/// Resolves the session cookie once per request and stores the outcome as
/// [`CurrentUser`] in the request extensions.
pub async fn session_middleware(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let session_manager = req
        .app_data::<web::Data<SessionManager>>()
        .cloned()
        .ok_or_else(|| CollegeMapError::Internal("Session manager not available".to_string()))?;
    let store = req
        .app_data::<web::Data<Store>>()
        .cloned()
        .ok_or_else(|| CollegeMapError::Internal("Store not available".to_string()))?;

    let cookie = req.cookie(session_manager.cookie_name());
    let user = session_manager
        .resolve(cookie.as_ref(), store.get_ref())
        .await?;

    req.extensions_mut().insert(CurrentUser(user));

    next.call(req).await
}

/// Extractor for handlers that require a signed-in user; rejects with
/// `401 Unauthorized` otherwise.
#[derive(Debug, Clone)]
pub struct Authenticated(pub User);

impl FromRequest for Authenticated {
    type Error = CollegeMapError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req
            .extensions()
            .get::<CurrentUser>()
            .and_then(|current| current.0.clone());

        ready(user.map(Authenticated).ok_or(CollegeMapError::Unauthorized))
    }
}

impl FromRequest for CurrentUser {
    type Error = CollegeMapError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(req
            .extensions()
            .get::<CurrentUser>()
            .cloned()
            .unwrap_or_default()))
    }
}
