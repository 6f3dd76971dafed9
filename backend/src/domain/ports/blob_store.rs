//! Port for storing uploaded images.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by blob storage adapters.
    pub enum BlobStoreError {
        /// The backing store is unreachable or refused the write.
        Unavailable { message: String } => "blob store unavailable: {message}",
        /// Writing the object failed.
        Write { message: String } => "blob write failed: {message}",
    }
}

/// Accepted image encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// Map a `Content-Type` essence to an accepted kind.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under a fresh random name and return its public URL.
    async fn put_image(&self, kind: ImageKind, bytes: Vec<u8>) -> Result<String, BlobStoreError>;
}
