//! In-memory client storage.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use adopti_core::{ClientStorage, Result, StorageKey};

use crate::document::Document;

/// Client storage that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    doc: Mutex<Document>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStorage for MemoryStorage {
    async fn get(&self, key: StorageKey) -> Result<Option<String>> {
        Ok(self.doc.lock().await.get(key))
    }

    async fn set(&self, key: StorageKey, value: &str) -> Result<()> {
        self.doc.lock().await.set(key, value);
        Ok(())
    }

    async fn remove(&self, key: StorageKey) -> Result<()> {
        self.doc.lock().await.remove(key);
        Ok(())
    }

    async fn cookie(&self, name: &str) -> Result<Option<String>> {
        Ok(self.doc.lock().await.cookie(name, Utc::now()))
    }

    async fn set_cookie(&self, name: &str, value: &str, max_age: Option<Duration>) -> Result<()> {
        self.doc
            .lock()
            .await
            .set_cookie(name, value, max_age, Utc::now());
        Ok(())
    }

    async fn expire_cookie(&self, name: &str) -> Result<()> {
        self.doc.lock().await.expire_cookie(name);
        Ok(())
    }
}
