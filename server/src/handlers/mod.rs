use actix_web::web;

use crate::error::CollegeMapError;

pub mod auth;
pub mod events;
pub mod health;
pub mod map;
pub mod profile;

pub use auth::{login, logout, signup};
pub use events::event_stream;
pub use health::health_check;
pub use map::map_view;
pub use profile::{claim_college, get_profile};

/// Routes JSON body rejections through the same `{success, error}` envelope
/// as every other client error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        CollegeMapError::Validation(format!("Invalid request body: {err}")).into()
    })
}
