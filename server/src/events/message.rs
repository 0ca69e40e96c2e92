use actix_web::web::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::db::{College, User};
use crate::error::{CollegeMapError, Result};

/// Published after a user claims a college.
pub const USER_ADDED: &str = "user-added";

/// SSE comment frame; clients ignore it, but writing it surfaces dead peers.
pub const KEEP_ALIVE_FRAME: &[u8] = b": keep-alive\n\n";

/// A named event about to be framed for the wire.
#[derive(Debug)]
pub struct Event<'a, T: Serialize> {
    pub name: &'a str,
    pub data: &'a T,
}

impl<'a, T: Serialize> Event<'a, T> {
    pub fn new(name: &'a str, data: &'a T) -> Self {
        Self { name, data }
    }

    /// Renders `event: <name>\ndata: <json>\n\n`.
    pub fn to_frame(&self) -> Result<Bytes> {
        if self.name.is_empty() || self.name.contains(['\n', '\r']) {
            return Err(CollegeMapError::Validation(format!(
                "invalid event name {:?}",
                self.name
            )));
        }

        let data = serde_json::to_string(self.data)?;
        Ok(Bytes::from(format!("event: {}\ndata: {}\n\n", self.name, data)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAddedEvent {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: String,
    pub college: CollegeSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollegeSummary {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&College> for CollegeSummary {
    fn from(college: &College) -> Self {
        Self {
            id: college.id.clone(),
            name: college.name.clone(),
            latitude: college.latitude,
            longitude: college.longitude,
        }
    }
}

impl UserAddedEvent {
    pub fn new(user: &User, college: &College) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            created_at: iso_timestamp(&user.created_at),
            college: CollegeSummary::from(college),
        }
    }
}

/// ISO-8601 with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub fn iso_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
