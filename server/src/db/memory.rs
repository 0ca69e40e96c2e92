use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::models::{College, User};
use super::store::{CollegeStore, UserStore};
use crate::auth::Credential;
use crate::error::{CollegeMapError, Result};

/// Process-local storage backend for development and tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    // user id -> user
    users: Arc<DashMap<String, User>>,
    // (first_name, last_name) -> user id
    user_names: Arc<DashMap<(String, String), String>>,
    // college id -> college
    colleges: Arc<DashMap<String, College>>,
    // college name -> college id
    college_names: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryStore {
    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.get(id).map(|user| user.clone()))
    }

    async fn get_user_by_name(&self, first_name: &str, last_name: &str) -> Result<Option<User>> {
        let key = (first_name.to_string(), last_name.to_string());
        let Some(id) = self.user_names.get(&key).map(|id| id.clone()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|user| user.clone()))
    }

    async fn insert_user(
        &self,
        first_name: &str,
        last_name: &str,
        credential: Credential,
    ) -> Result<User> {
        let key = (first_name.to_string(), last_name.to_string());
        match self.user_names.entry(key) {
            Entry::Occupied(_) => Err(CollegeMapError::UserExists),
            Entry::Vacant(slot) => {
                let user = User::new(first_name.to_string(), last_name.to_string(), credential);
                self.users.insert(user.id.clone(), user.clone());
                slot.insert(user.id.clone());
                Ok(user)
            }
        }
    }

    async fn update_user_college(&self, id: &str, college_id: &str) -> Result<()> {
        if let Some(mut user) = self.users.get_mut(id) {
            user.college_id = Some(college_id.to_string());
        }
        Ok(())
    }

    async fn list_users_with_college(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|entry| entry.value().has_college())
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }
}

impl CollegeStore for MemoryStore {
    async fn get_college_by_id(&self, id: &str) -> Result<Option<College>> {
        Ok(self.colleges.get(id).map(|college| college.clone()))
    }

    async fn find_college_by_name(&self, name: &str) -> Result<Option<College>> {
        let Some(id) = self.college_names.get(name).map(|id| id.clone()) else {
            return Ok(None);
        };
        Ok(self.colleges.get(&id).map(|college| college.clone()))
    }

    async fn insert_college(&self, college: College) -> Result<College> {
        match self.college_names.entry(college.name.clone()) {
            Entry::Occupied(existing) => {
                let id = existing.get().clone();
                drop(existing);
                self.colleges
                    .get(&id)
                    .map(|college| college.clone())
                    .ok_or_else(|| CollegeMapError::Internal(format!("college index out of sync for {id}")))
            }
            Entry::Vacant(slot) => {
                self.colleges.insert(college.id.clone(), college.clone());
                slot.insert(college.id.clone());
                Ok(college)
            }
        }
    }
}
