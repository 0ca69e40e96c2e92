use std::collections::HashMap;

use actix_web::{get, web, HttpResponse};
use serde::Serialize;

use crate::{
    config::MapConfig,
    db::{College, CollegeStore, Store, UserStore},
    error::Result,
    events::{
        message::{iso_timestamp, CollegeSummary},
        UserAddedEvent,
    },
    handlers::auth::SessionUser,
    middleware::CurrentUser,
};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CollegeRanking {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapResponse {
    pub map_name: String,
    pub users: Vec<UserAddedEvent>,
    pub college_rankings: Vec<CollegeRanking>,
    pub user: Option<SessionUser>,
}

/// Everyone placed on the map, in the same shape the live `user-added`
/// events use, so clients can merge the two.
#[get("/api/map")]
pub async fn map_view(
    current: CurrentUser,
    store: web::Data<Store>,
    map: web::Data<MapConfig>,
) -> Result<HttpResponse> {
    let users = store.list_users_with_college().await?;

    let mut colleges: HashMap<String, College> = HashMap::new();
    let mut placements = Vec::with_capacity(users.len());
    for user in &users {
        let Some(college_id) = &user.college_id else {
            continue;
        };
        if !colleges.contains_key(college_id) {
            match store.get_college_by_id(college_id).await? {
                Some(college) => {
                    colleges.insert(college_id.clone(), college);
                }
                None => {
                    log::warn!("User {} refers to missing college {}", user.id, college_id);
                    continue;
                }
            }
        }
        if let Some(college) = colleges.get(college_id) {
            placements.push(UserAddedEvent {
                id: user.id.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                created_at: iso_timestamp(&user.created_at),
                college: CollegeSummary::from(college),
            });
        }
    }

    let response = MapResponse {
        map_name: map.name.clone(),
        college_rankings: rank_colleges(&placements),
        users: placements,
        user: current.0.as_ref().map(SessionUser::from),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Student count per college, largest first, ties by name.
pub fn rank_colleges(placements: &[UserAddedEvent]) -> Vec<CollegeRanking> {
    let mut counts: HashMap<&str, CollegeRanking> = HashMap::new();
    for placement in placements {
        counts
            .entry(placement.college.id.as_str())
            .or_insert_with(|| CollegeRanking {
                name: placement.college.name.clone(),
                count: 0,
            })
            .count += 1;
    }

    let mut rankings: Vec<CollegeRanking> = counts.into_values().collect();
    rankings.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    rankings
}
