use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};

use crate::auth::SessionCodec;
use crate::config::SessionConfig;
use crate::db::{User, UserStore};
use crate::error::Result;

/// Binds the session codec to the session cookie.
///
/// Holds no mutable state; clones share the codec's secret and can serve
/// any number of concurrent requests.
#[derive(Clone)]
pub struct SessionManager {
    codec: SessionCodec,
    cookie_name: String,
    max_age: CookieDuration,
    secure: bool,
}

impl SessionManager {
    pub fn new(codec: SessionCodec, config: &SessionConfig) -> Self {
        Self {
            codec,
            cookie_name: config.cookie_name.clone(),
            max_age: CookieDuration::days(i64::from(config.max_age_days)),
            secure: config.secure,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Session cookie for `user_id`, to be attached to the response.
    pub fn issue(&self, user_id: &str) -> Cookie<'static> {
        Cookie::build(self.cookie_name.clone(), self.codec.encode(user_id))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(self.max_age)
            .finish()
    }

    /// Looks up the user behind a session cookie.
    ///
    /// A missing cookie, a token that fails verification and a user that no
    /// longer exists all resolve to `Ok(None)`. Only storage failures are
    /// errors.
    pub async fn resolve<S: UserStore>(
        &self,
        cookie: Option<&Cookie<'_>>,
        store: &S,
    ) -> Result<Option<User>> {
        let Some(cookie) = cookie else {
            return Ok(None);
        };
        let Some(user_id) = self.codec.verify(cookie.value()) else {
            return Ok(None);
        };

        let user = store.get_user_by_id(&user_id).await?;
        if user.is_none() {
            log::debug!("Session refers to unknown user {}", user_id);
        }
        Ok(user)
    }

    /// Removal cookie for the session. Safe to send any number of times.
    pub fn revoke(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(self.cookie_name.clone(), "")
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .finish();
        cookie.make_removal();
        cookie
    }
}
