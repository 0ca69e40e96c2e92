pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use memory::MemoryStore;
pub use models::{College, User};
pub use repository::MongoDbContext;
pub use store::{CollegeStore, Store, UserStore};

use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;

impl Store {
    /// Opens the backend selected in `config`.
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        match config.backend {
            StorageBackend::Memory => {
                log::warn!("Using in-memory storage; data is lost on restart");
                Ok(Store::Memory(MemoryStore::new()))
            }
            StorageBackend::Mongodb => {
                log::info!("Connecting to MongoDB at {}...", config.mongodb_uri);
                let client = mongodb::Client::with_uri_str(&config.mongodb_uri).await?;
                let db_context = MongoDbContext::new(client, &config.database);

                log::info!("Initializing database indexes...");
                db_context.init_indexes().await?;

                Ok(Store::Mongo(db_context))
            }
        }
    }
}
