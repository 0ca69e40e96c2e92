use std::future::Future;

use super::memory::MemoryStore;
use super::models::{College, User};
use super::repository::MongoDbContext;
use crate::auth::Credential;
use crate::error::Result;

/// User persistence as seen by the session layer and the handlers.
pub trait UserStore: Send + Sync {
    fn get_user_by_id(&self, id: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    fn get_user_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Fails with `UserExists` when the name is already taken.
    fn insert_user(
        &self,
        first_name: &str,
        last_name: &str,
        credential: Credential,
    ) -> impl Future<Output = Result<User>> + Send;

    fn update_user_college(
        &self,
        id: &str,
        college_id: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    fn list_users_with_college(&self) -> impl Future<Output = Result<Vec<User>>> + Send;
}

pub trait CollegeStore: Send + Sync {
    fn get_college_by_id(&self, id: &str) -> impl Future<Output = Result<Option<College>>> + Send;

    fn find_college_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<College>>> + Send;

    /// Returns the stored college, which is the pre-existing one when a
    /// college with the same name won a concurrent insert.
    fn insert_college(&self, college: College) -> impl Future<Output = Result<College>> + Send;
}

/// The configured storage backend.
#[derive(Clone)]
pub enum Store {
    Mongo(MongoDbContext),
    Memory(MemoryStore),
}

impl UserStore for Store {
    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        match self {
            Store::Mongo(db) => db.get_user_by_id(id).await,
            Store::Memory(mem) => mem.get_user_by_id(id).await,
        }
    }

    async fn get_user_by_name(&self, first_name: &str, last_name: &str) -> Result<Option<User>> {
        match self {
            Store::Mongo(db) => db.get_user_by_name(first_name, last_name).await,
            Store::Memory(mem) => mem.get_user_by_name(first_name, last_name).await,
        }
    }

    async fn insert_user(
        &self,
        first_name: &str,
        last_name: &str,
        credential: Credential,
    ) -> Result<User> {
        match self {
            Store::Mongo(db) => db.insert_user(first_name, last_name, credential).await,
            Store::Memory(mem) => mem.insert_user(first_name, last_name, credential).await,
        }
    }

    async fn update_user_college(&self, id: &str, college_id: &str) -> Result<()> {
        match self {
            Store::Mongo(db) => db.update_user_college(id, college_id).await,
            Store::Memory(mem) => mem.update_user_college(id, college_id).await,
        }
    }

    async fn list_users_with_college(&self) -> Result<Vec<User>> {
        match self {
            Store::Mongo(db) => db.list_users_with_college().await,
            Store::Memory(mem) => mem.list_users_with_college().await,
        }
    }
}

impl CollegeStore for Store {
    async fn get_college_by_id(&self, id: &str) -> Result<Option<College>> {
        match self {
            Store::Mongo(db) => db.get_college_by_id(id).await,
            Store::Memory(mem) => mem.get_college_by_id(id).await,
        }
    }

    async fn find_college_by_name(&self, name: &str) -> Result<Option<College>> {
        match self {
            Store::Mongo(db) => db.find_college_by_name(name).await,
            Store::Memory(mem) => mem.find_college_by_name(name).await,
        }
    }

    async fn insert_college(&self, college: College) -> Result<College> {
        match self {
            Store::Mongo(db) => db.insert_college(college).await,
            Store::Memory(mem) => mem.insert_college(college).await,
        }
    }
}
