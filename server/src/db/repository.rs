use futures_util::stream::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    Client, Collection, Database,
};

use super::models::{College, User};
use super::store::{CollegeStore, UserStore};
use crate::auth::Credential;
use crate::error::{CollegeMapError, Result};

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoDbContext {
    db: Database,
}

impl MongoDbContext {
    pub fn new(client: Client, database_name: &str) -> Self {
        Self {
            db: client.database(database_name),
        }
    }

    fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    fn colleges(&self) -> Collection<College> {
        self.db.collection("colleges")
    }

    pub async fn init_indexes(&self) -> Result<()> {
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        // One account per full name
        let name_index = IndexModel::builder()
            .keys(doc! { "first_name": 1, "last_name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users().create_index(name_index).await?;

        let college_ref_index = IndexModel::builder().keys(doc! { "college_id": 1 }).build();
        self.users().create_index(college_ref_index).await?;

        let college_name_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.colleges().create_index(college_name_index).await?;

        log::info!("Database indexes created successfully");
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

impl UserStore for MongoDbContext {
    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users().find_one(doc! { "_id": id }).await?)
    }

    async fn get_user_by_name(&self, first_name: &str, last_name: &str) -> Result<Option<User>> {
        let user = self
            .users()
            .find_one(doc! { "first_name": first_name, "last_name": last_name })
            .await?;
        Ok(user)
    }

    async fn insert_user(
        &self,
        first_name: &str,
        last_name: &str,
        credential: Credential,
    ) -> Result<User> {
        let user = User::new(first_name.to_string(), last_name.to_string(), credential);
        match self.users().insert_one(&user).await {
            Ok(_) => Ok(user),
            Err(err) if is_duplicate_key(&err) => Err(CollegeMapError::UserExists),
            Err(err) => Err(err.into()),
        }
    }

    async fn update_user_college(&self, id: &str, college_id: &str) -> Result<()> {
        self.users()
            .update_one(doc! { "_id": id }, doc! { "$set": { "college_id": college_id } })
            .await?;
        Ok(())
    }

    async fn list_users_with_college(&self) -> Result<Vec<User>> {
        let mut cursor = self
            .users()
            .find(doc! { "college_id": { "$exists": true, "$ne": null } })
            .sort(doc! { "created_at": 1 })
            .await?;

        let mut users = Vec::new();
        while let Some(user) = cursor.try_next().await? {
            users.push(user);
        }

        Ok(users)
    }
}

impl CollegeStore for MongoDbContext {
    async fn get_college_by_id(&self, id: &str) -> Result<Option<College>> {
        Ok(self.colleges().find_one(doc! { "_id": id }).await?)
    }

    async fn find_college_by_name(&self, name: &str) -> Result<Option<College>> {
        Ok(self.colleges().find_one(doc! { "name": name }).await?)
    }

    async fn insert_college(&self, college: College) -> Result<College> {
        match self.colleges().insert_one(&college).await {
            Ok(_) => Ok(college),
            Err(err) if is_duplicate_key(&err) => {
                log::debug!("College '{}' was inserted concurrently", college.name);
                self.find_college_by_name(&college.name)
                    .await?
                    .ok_or_else(|| {
                        CollegeMapError::Internal(format!(
                            "college '{}' vanished after duplicate insert",
                            college.name
                        ))
                    })
            }
            Err(err) => Err(err.into()),
        }
    }
}
