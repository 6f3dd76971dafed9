//! Driving port for image uploads.

use async_trait::async_trait;

use crate::domain::{Caller, Error};

use super::ImageKind;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageUploadCommand: Send + Sync {
    /// Store an image body and return its public URL.
    async fn upload(&self, caller: &Caller, kind: ImageKind, bytes: Vec<u8>)
    -> Result<String, Error>;
}
