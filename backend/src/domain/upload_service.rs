//! Image upload service backed by a [`BlobStore`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::port_error_mapping::map_blob_error;
use crate::domain::ports::{BlobStore, ImageKind, ImageUploadCommand};
use crate::domain::{Caller, Error};

#[derive(Clone)]
pub struct ImageUploadService<B> {
    store: Arc<B>,
}

impl<B> ImageUploadService<B> {
    pub fn new(store: Arc<B>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<B: BlobStore> ImageUploadCommand for ImageUploadService<B> {
    async fn upload(
        &self,
        caller: &Caller,
        kind: ImageKind,
        bytes: Vec<u8>,
    ) -> Result<String, Error> {
        if bytes.is_empty() {
            return Err(Error::invalid_request("no image provided"));
        }
        let size = bytes.len();
        let url = self
            .store
            .put_image(kind, bytes)
            .await
            .map_err(map_blob_error)?;
        info!(user_id = %caller.user_id, size, url = %url, "image stored");
        Ok(url)
    }
}
