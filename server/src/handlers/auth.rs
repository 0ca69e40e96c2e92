use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::{
    auth::PasswordHasher,
    db::{Store, User, UserStore},
    error::{CollegeMapError, Result},
    session::SessionManager,
};

const MIN_PASSWORD_LEN: usize = 4;
const MAX_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialsRequest {
    fn names(&self) -> Result<(&str, &str)> {
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(CollegeMapError::Validation(
                "First name and last name are required".to_string(),
            ));
        }
        Ok((first_name, last_name))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub has_college: bool,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            has_college: user.has_college(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: SessionUser,
}

#[post("/signup")]
pub async fn signup(
    req: web::Json<CredentialsRequest>,
    store: web::Data<Store>,
    hasher: web::Data<PasswordHasher>,
    session_manager: web::Data<SessionManager>,
) -> Result<HttpResponse> {
    let (first_name, last_name) = req.names()?;

    let password_len = req.password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&password_len) {
        return Err(CollegeMapError::Validation(format!(
            "Password must be {MIN_PASSWORD_LEN}-{MAX_PASSWORD_LEN} characters"
        )));
    }

    if store.get_user_by_name(first_name, last_name).await?.is_some() {
        return Err(CollegeMapError::UserExists);
    }

    let password = req.password.clone();
    let hasher = hasher.into_inner();
    let credential = web::block(move || hasher.hash(&password)).await??;

    let user = store.insert_user(first_name, last_name, credential).await?;

    log::info!("Created account {} for {} {}", user.id, first_name, last_name);

    Ok(HttpResponse::Ok()
        .cookie(session_manager.issue(&user.id))
        .json(AuthResponse {
            success: true,
            user: SessionUser::from(&user),
        }))
}

#[post("/login")]
pub async fn login(
    req: web::Json<CredentialsRequest>,
    store: web::Data<Store>,
    hasher: web::Data<PasswordHasher>,
    session_manager: web::Data<SessionManager>,
) -> Result<HttpResponse> {
    let (first_name, last_name) = req.names()?;
    if req.password.is_empty() {
        return Err(CollegeMapError::Validation("Password is required".to_string()));
    }

    log::info!("Login attempt for {} {}", first_name, last_name);

    let user = store.get_user_by_name(first_name, last_name).await?;

    let password = req.password.clone();
    let credential = user.as_ref().map(|user| user.password_hash.clone());
    let hasher = hasher.into_inner();
    let valid = web::block(move || match credential {
        Some(credential) => hasher.verify(&password, &credential),
        None => hasher.verify_missing(&password),
    })
    .await?;

    let user = match user {
        Some(user) if valid => user,
        _ => {
            log::warn!("Failed login attempt for {} {}", first_name, last_name);
            return Err(CollegeMapError::InvalidCredentials);
        }
    };

    log::info!("Successful login for user {}", user.id);

    Ok(HttpResponse::Ok()
        .cookie(session_manager.issue(&user.id))
        .json(AuthResponse {
            success: true,
            user: SessionUser::from(&user),
        }))
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

#[post("/logout")]
pub async fn logout(session_manager: web::Data<SessionManager>) -> Result<HttpResponse> {
    let response = LogoutResponse {
        success: true,
        message: "Logout successful".to_string(),
    };

    Ok(HttpResponse::Ok()
        .cookie(session_manager.revoke())
        .json(response))
}
