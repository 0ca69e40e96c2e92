use actix_web::{
    get,
    http::header::{self, CacheControl, CacheDirective},
    web, HttpResponse,
};

use crate::{
    config::EventsConfig,
    events::{EventBroadcaster, StreamConnection},
};

/// Long-lived server-sent event stream of map updates.
#[get("/api/events")]
pub async fn event_stream(
    broadcaster: web::Data<EventBroadcaster>,
    events: web::Data<EventsConfig>,
) -> HttpResponse {
    let connection = StreamConnection::open(broadcaster.get_ref(), events.keep_alive());
    log::debug!("Opened event stream {}", connection.id());

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(CacheControl(vec![CacheDirective::NoCache]))
        .insert_header((header::CONNECTION, "keep-alive"))
        .streaming(connection)
}
