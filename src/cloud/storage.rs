use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::primitives::ByteStream;

/// Object storage scoped to the stack's bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;

    async fn upload_file(&self, path: &Path, key: &str, content_type: Option<&str>) -> Result<()>;
}

pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket_name: String,
}

impl S3Storage {
    pub fn new(config: &SdkConfig, bucket_name: &str) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
            bucket_name: bucket_name.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket_name)
                .prefix(prefix);
            if let Some(t) = token.as_deref() {
                req = req.continuation_token(t);
            }
            let resp = req.send().await.with_context(|| {
                format!("error listing s3 objects (bucket: {}, prefix: {})", self.bucket_name, prefix)
            })?;

            keys.extend(
                resp.contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(String::from),
            );

            match resp.next_continuation_token() {
                Some(next) if resp.is_truncated().unwrap_or(false) => token = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(keys)
    }

    async fn upload_file(&self, path: &Path, key: &str, content_type: Option<&str>) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .with_context(|| format!("error reading {}", path.display()))?;

        let mut req = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(body);
        if let Some(content_type) = content_type {
            req = req.content_type(content_type);
        }
        req.send()
            .await
            .with_context(|| format!("error uploading file {} to {}", path.display(), key))?;
        Ok(())
    }
}
