use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;

use super::{Bucket, ObjectStore, join_url};
use crate::error::BoxError;

/// S3 backend: both logical buckets live under prefixes of one S3 bucket
/// (`s3://{bucket}/profile-pictures/...`, `s3://{bucket}/source-code/...`).
#[derive(Clone)]
pub struct S3Store {
    client: S3Client,
    bucket: String,
    public_base_url: String,
}

impl S3Store {
    pub fn new(client: S3Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
        }
    }

    fn object_key(bucket: Bucket, key: &str) -> String {
        format!("{bucket}/{key}")
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(
        &self,
        bucket: Bucket,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BoxError> {
        let object_key = Self::object_key(bucket, key);
        let size = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .body(data.into())
            .content_type(content_type)
            .if_none_match("*")
            .send()
            .await
            .map_err(|e| {
                tracing::error!(key = %object_key, error = %e, "S3 upload failed");
                e
            })?;

        tracing::info!(key = %object_key, size, "Object uploaded to S3");
        Ok(())
    }

    fn public_url(&self, bucket: Bucket, key: &str) -> String {
        join_url(&self.public_base_url, bucket, key)
    }
}
