//! Local-directory blob store for uploaded images.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::infrastructure::ports::{BlobError, BlobStorePort};

/// Writes blobs into `dir`; URLs are `public_base_url/name`.
pub struct LocalBlobStore {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStorePort for LocalBlobStore {
    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<String, BlobError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), "Stored blob");
        Ok(format!("{}/{}", self.public_base_url, name))
    }
}
