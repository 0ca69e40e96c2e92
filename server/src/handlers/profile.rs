use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::{
    db::{College, CollegeStore, Store, UserStore},
    error::{CollegeMapError, Result},
    events::{message::CollegeSummary, EventBroadcaster, UserAddedEvent, USER_ADDED},
    middleware::Authenticated,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub first_name: String,
    pub last_name: String,
    pub current_college: Option<CollegeSummary>,
}

#[get("/profile")]
pub async fn get_profile(
    Authenticated(user): Authenticated,
    store: web::Data<Store>,
) -> Result<HttpResponse> {
    let current_college = match &user.college_id {
        Some(college_id) => store
            .get_college_by_id(college_id)
            .await?
            .as_ref()
            .map(CollegeSummary::from),
        None => None,
    };

    Ok(HttpResponse::Ok().json(ProfileResponse {
        first_name: user.first_name,
        last_name: user.last_name,
        current_college,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimCollegeRequest {
    #[serde(default)]
    pub college_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub is_custom: bool,
}

impl ClaimCollegeRequest {
    fn validate(&self) -> Result<&str> {
        let name = self.college_name.trim();
        let latitude_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let longitude_ok =
            self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);

        if name.is_empty() || !latitude_ok || !longitude_ok {
            return Err(CollegeMapError::Validation(
                "Please select a college".to_string(),
            ));
        }
        Ok(name)
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimCollegeResponse {
    pub success: bool,
    pub college: CollegeSummary,
}

/// Assigns a college to the signed-in user, then announces the placement to
/// every open event stream.
#[post("/profile/college")]
pub async fn claim_college(
    Authenticated(user): Authenticated,
    req: web::Json<ClaimCollegeRequest>,
    store: web::Data<Store>,
    broadcaster: web::Data<EventBroadcaster>,
) -> Result<HttpResponse> {
    let name = req.validate()?;

    let college = match store.find_college_by_name(name).await? {
        Some(existing) => existing,
        None => {
            let college = College::new(
                name.to_string(),
                req.latitude,
                req.longitude,
                req.is_custom,
            );
            store.insert_college(college).await?
        }
    };

    store.update_user_college(&user.id, &college.id).await?;

    let updated = store.get_user_by_id(&user.id).await?.unwrap_or(user);

    log::info!(
        "User {} claimed college {} ({})",
        updated.id,
        college.name,
        college.id
    );

    let event = UserAddedEvent::new(&updated, &college);
    if let Err(err) = broadcaster.publish(USER_ADDED, &event) {
        log::error!("Failed to publish {} for user {}: {}", USER_ADDED, updated.id, err);
    }

    Ok(HttpResponse::Ok().json(ClaimCollegeResponse {
        success: true,
        college: CollegeSummary::from(&college),
    }))
}
