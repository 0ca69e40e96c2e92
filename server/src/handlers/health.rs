use actix_web::{get, web, HttpResponse};
use serde::Serialize;

use crate::{error::Result, events::EventBroadcaster};

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub subscribers: usize,
}

#[get("/health")]
pub async fn health_check(
    broadcaster: Option<web::Data<EventBroadcaster>>,
) -> Result<HttpResponse> {
    let subscribers = broadcaster
        .map(|broadcaster| broadcaster.subscriber_count())
        .unwrap_or(0);

    let response = HealthCheckResponse {
        status: "healthy".to_string(),
        subscribers,
    };

    Ok(HttpResponse::Ok().json(response))
}
