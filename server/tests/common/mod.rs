#![allow(dead_code)]

use std::pin::Pin;
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::web::Bytes;
use college_map::auth::{PasswordHasher, PasswordScheme, SessionCodec};
use college_map::config::{EventsConfig, MapConfig, SessionConfig};
use college_map::db::{MemoryStore, Store};
use college_map::events::EventBroadcaster;
use college_map::session::SessionManager;
use futures_util::future::poll_fn;

pub const TEST_SECRET: &[u8] = b"01234567890123456789012345678901";

#[derive(Clone)]
pub struct TestState {
    pub store: Store,
    pub sessions: SessionManager,
    pub hasher: PasswordHasher,
    pub broadcaster: EventBroadcaster,
    pub events: EventsConfig,
    pub map: MapConfig,
}

impl TestState {
    pub fn new() -> Self {
        let codec = SessionCodec::new(TEST_SECRET.to_vec()).expect("codec");
        Self {
            store: Store::Memory(MemoryStore::new()),
            sessions: SessionManager::new(codec, &SessionConfig::default()),
            hasher: PasswordHasher::new(PasswordScheme::Bcrypt, 4).expect("hasher"),
            broadcaster: EventBroadcaster::new(16),
            events: EventsConfig {
                channel_capacity: 16,
                keep_alive_secs: 3600,
            },
            map: MapConfig {
                name: "Test Map".to_string(),
            },
        }
    }
}

/// Builds the full application around a [`TestState`].
macro_rules! college_app {
    ($state:expr) => {{
        let state: &$crate::common::TestState = &$state;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(state.store.clone()))
                .app_data(actix_web::web::Data::new(state.sessions.clone()))
                .app_data(actix_web::web::Data::new(state.hasher.clone()))
                .app_data(actix_web::web::Data::new(state.broadcaster.clone()))
                .app_data(actix_web::web::Data::new(state.events.clone()))
                .app_data(actix_web::web::Data::new(state.map.clone()))
                .app_data(college_map::handlers::json_config())
                .wrap(actix_web::middleware::from_fn(
                    college_map::middleware::session_middleware,
                ))
                .service(college_map::handlers::health_check)
                .service(college_map::handlers::event_stream)
                .service(college_map::handlers::map_view)
                .service(college_map::handlers::signup)
                .service(college_map::handlers::login)
                .service(college_map::handlers::logout)
                .service(college_map::handlers::get_profile)
                .service(college_map::handlers::claim_college),
        )
        .await
    }};
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned())
}

/// Next chunk of a streaming body, or `None` when the stream ended or
/// nothing arrived in time.
pub async fn next_chunk<B: MessageBody>(body: &mut Pin<Box<B>>) -> Option<Bytes> {
    let chunk = tokio::time::timeout(
        Duration::from_secs(2),
        poll_fn(|cx| body.as_mut().poll_next(cx)),
    )
    .await
    .ok()??;
    chunk.ok()
}
