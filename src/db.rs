use crate::config::Config;
use crate::error::StoreError;
use anyhow::Result;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::{Client, Collection};

pub fn parse_object_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(format!("malformed id: {}", id)))
}

pub struct Database {
    client: Client,
    name: String,
}

impl Database {
    pub async fn new(cfg: &Config) -> Result<Self> {
        let client = Client::with_uri_str(cfg.app.get_database_url()).await?;
        let db = Self {
            client,
            name: cfg.app.get_database_name().to_owned(),
        };

        // The driver connects lazily; ping so a bad URL surfaces at startup.
        db.handle()
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| anyhow::anyhow!("failed to reach mongodb: {}", e))?;

        Ok(db)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn handle(&self) -> mongodb::Database {
        self.client.database(&self.name)
    }

    pub fn authors(&self) -> Collection<Document> {
        self.handle().collection("authors")
    }

    pub fn books(&self) -> Collection<Document> {
        self.handle().collection("books")
    }
}
