//! Object storage for uploaded files
//!
//! Two logical buckets (`profile-pictures`, `source-code`). Rows only keep
//! the key; [`ObjectStore::public_url`] turns it into a fetchable URL at
//! read time.

pub mod memory;
pub mod s3;

use async_trait::async_trait;

use crate::error::BoxError;

pub use memory::MemoryObjectStore;
pub use s3::S3Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    ProfilePictures,
    SourceCode,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::ProfilePictures => "profile-pictures",
            Bucket::SourceCode => "source-code",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a new object; fails if the key is already taken
    async fn put(
        &self,
        bucket: Bucket,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BoxError>;

    /// Public URL for a stored key (no existence check)
    fn public_url(&self, bucket: Bucket, key: &str) -> String;
}

/// `{base}/{bucket}/{key}` with exactly one slash between parts
pub(crate) fn join_url(base: &str, bucket: Bucket, key: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), bucket, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_cleanly() {
        assert_eq!(
            join_url("http://cdn.local/", Bucket::SourceCode, "source-code-1.zip"),
            "http://cdn.local/source-code/source-code-1.zip"
        );
        assert_eq!(
            join_url("http://cdn.local", Bucket::ProfilePictures, "profile-pic-1"),
            "http://cdn.local/profile-pictures/profile-pic-1"
        );
    }
}
