use actix_web::{middleware as actix_middleware, web, App, HttpServer};
use anyhow::Context;
use std::time::Duration;
use tokio::time;

use college_map::auth::{PasswordHasher, SessionCodec};
use college_map::config::AppConfig;
use college_map::db::Store;
use college_map::events::EventBroadcaster;
use college_map::handlers;
use college_map::middleware::{rate_limit_middleware, session_middleware, RateLimiter};
use college_map::session::SessionManager;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (for development)
    // Try loading from current directory first, then from server/ directory
    if dotenvy::dotenv().is_err() {
        dotenvy::from_filename("server/.env").ok();
    }

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    log::info!("Starting College Map server...");

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "server/config/app.toml".to_string());

    let mut config = match AppConfig::load_from_file(&config_path) {
        Ok(config) => config,
        Err(err) => {
            log::warn!(
                "Failed to load configuration from '{}': {}. Falling back to defaults.",
                config_path,
                err
            );
            AppConfig::default()
        }
    };
    config
        .apply_env_overrides()
        .context("invalid environment configuration")?;

    let codec = match std::env::var("SESSION_SECRET") {
        Ok(secret) => SessionCodec::new(secret.into_bytes()).context("invalid SESSION_SECRET")?,
        Err(_) => {
            log::warn!("SESSION_SECRET not set; generated a process-local secret, sessions will not survive a restart");
            SessionCodec::generate()
        }
    };

    let hasher = PasswordHasher::new(config.password.scheme, config.password.cost)
        .context("invalid password configuration")?;
    log::info!("Password scheme: {:?}", hasher.scheme());

    let session_manager = SessionManager::new(codec, &config.session);
    log::info!(
        "Session cookie '{}' lifetime {} days",
        session_manager.cookie_name(),
        config.session.max_age_days
    );

    let broadcaster = EventBroadcaster::new(config.events.channel_capacity);
    let rate_limiter = RateLimiter::from_config(&config.rate_limit);

    let store = Store::connect(&config.storage)
        .await
        .context("failed to open storage")?;

    let rate_limiter_clone = rate_limiter.clone();
    let cleanup_every = config.rate_limit.window().max(Duration::from_secs(60));
    tokio::spawn(async move {
        let mut interval = time::interval(cleanup_every);
        loop {
            interval.tick().await;
            let removed = rate_limiter_clone.cleanup_old_entries();
            if removed > 0 {
                log::debug!("Background cleanup: dropped {} idle rate limit entries", removed);
            }
        }
    });

    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    log::info!("Starting HTTP server at {}:{}...", server_host, server_port);

    HttpServer::new(move || {
        App::new()
            // Shared state
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(session_manager.clone()))
            .app_data(web::Data::new(hasher.clone()))
            .app_data(web::Data::new(broadcaster.clone()))
            .app_data(web::Data::new(rate_limiter.clone()))
            .app_data(web::Data::new(config.events.clone()))
            .app_data(web::Data::new(config.map.clone()))
            .app_data(handlers::json_config())
            // Middleware
            .wrap(actix_middleware::from_fn(session_middleware))
            .wrap(actix_middleware::Logger::default())
            .service(handlers::health_check)
            .service(handlers::event_stream)
            .service(handlers::map_view)
            .service(handlers::logout)
            .service(handlers::get_profile)
            .service(handlers::claim_college)
            .service(
                web::scope("")
                    .wrap(actix_middleware::from_fn(rate_limit_middleware))
                    .service(handlers::signup)
                    .service(handlers::login),
            )
    })
    .bind((server_host, server_port))?
    .run()
    .await?;

    log::info!("Server stopped");
    Ok(())
}
