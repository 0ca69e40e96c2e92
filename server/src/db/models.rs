use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Credential;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: Credential,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(first_name: String, last_name: String, password_hash: Credential) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            first_name,
            last_name,
            password_hash,
            college_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn has_college(&self) -> bool {
        self.college_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct College {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub is_custom: bool,
}

impl College {
    pub fn new(name: String, latitude: f64, longitude: f64, is_custom: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            latitude,
            longitude,
            is_custom,
        }
    }
}
