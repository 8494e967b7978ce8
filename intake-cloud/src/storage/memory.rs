use std::collections::HashMap;
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Bucket, ObjectStore, join_url};
use crate::error::BoxError;

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// In-process object store for local development and tests
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<(Bucket, String), StoredObject>>,
    public_base_url: String,
}

impl MemoryObjectStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            public_base_url: public_base_url.into(),
        }
    }

    pub async fn get(&self, bucket: Bucket, key: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .get(&(bucket, key.to_string()))
            .cloned()
    }

    /// Number of stored objects across both buckets
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        bucket: Bucket,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BoxError> {
        match self.objects.write().await.entry((bucket, key.to_string())) {
            Entry::Occupied(_) => Err(format!("object already exists: {bucket}/{key}").into()),
            Entry::Vacant(slot) => {
                slot.insert(StoredObject {
                    data,
                    content_type: content_type.to_string(),
                });
                Ok(())
            }
        }
    }

    fn public_url(&self, bucket: Bucket, key: &str) -> String {
        join_url(&self.public_base_url, bucket, key)
    }
}
