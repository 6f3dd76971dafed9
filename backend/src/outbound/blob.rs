//! Local filesystem image store built on `cap-std`.
//!
//! Writes are confined to the configured upload directory. Each image gets a
//! random file name and is served from `{base_url}/{name}`.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{BlobStore, BlobStoreError, ImageKind};

/// Image store backed by a local directory.
#[derive(Clone)]
pub struct LocalBlobStore {
    dir: Arc<Dir>,
    base_url: String,
}

impl LocalBlobStore {
    /// Open (creating if needed) `root` and serve its files under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] when the directory cannot be created or
    /// opened.
    pub fn open(root: &Path, base_url: &str) -> std::io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            dir: Arc::new(dir),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put_image(&self, kind: ImageKind, bytes: Vec<u8>) -> Result<String, BlobStoreError> {
        let name = format!("{}.{}", Uuid::new_v4().simple(), kind.extension());
        let dir = Arc::clone(&self.dir);
        let target = name.clone();
        tokio::task::spawn_blocking(move || dir.write(&target, &bytes))
            .await
            .map_err(|err| BlobStoreError::unavailable(err.to_string()))?
            .map_err(|err| {
                debug!(error = %err, file = %name, "image write failed");
                BlobStoreError::write(err.to_string())
            })?;
        Ok(format!("{}/{name}", self.base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_upload_dir;

    #[tokio::test]
    async fn stored_image_is_readable_under_public_url() {
        let root = temp_upload_dir();
        let store = LocalBlobStore::open(root.path(), "http://localhost:8080/uploads/")
            .expect("open store");

        let url = store
            .put_image(ImageKind::Png, vec![0x89, b'P', b'N', b'G'])
            .await
            .expect("stored");

        let name = url
            .strip_prefix("http://localhost:8080/uploads/")
            .expect("public prefix");
        assert!(name.ends_with(".png"));
        let written = std::fs::read(root.path().join(name)).expect("file on disk");
        assert_eq!(written, vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn missing_root_is_created() {
        let root = temp_upload_dir();
        let nested = root.path().join("a").join("b");
        LocalBlobStore::open(&nested, "/uploads").expect("open store");
        assert!(nested.is_dir());
    }
}
