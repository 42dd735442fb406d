//! The media-store seam.
//!
//! Image hosting is an external capability. Upload failure never fails the
//! enclosing operation: callers substitute [`PLACEHOLDER_IMAGE_URL`] and
//! carry on, so a broken media backend degrades the experience instead of
//! blocking contributions.

use std::future::Future;

use thiserror::Error;

/// Sentinel URL substituted when an upload cannot be completed.
pub const PLACEHOLDER_IMAGE_URL: &str =
  "https://placehold.co/300x300?text=Image+Unavailable";

#[derive(Debug, Error)]
pub enum MediaError {
  #[error("media store is not configured")]
  NotConfigured,

  #[error("upload failed: {0}")]
  Upload(String),
}

/// Abstraction over an image host. Implementations return a public URL for
/// the stored bytes.
pub trait MediaStore: Send + Sync {
  fn upload(
    &self,
    filename: &str,
    bytes: &[u8],
  ) -> impl Future<Output = Result<String, MediaError>> + Send;
}

/// The no-backend implementation: every upload fails with
/// [`MediaError::NotConfigured`], which callers degrade to the placeholder
/// URL. Useful in tests and in deployments without an image host.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderMediaStore;

impl MediaStore for PlaceholderMediaStore {
  async fn upload(
    &self,
    _filename: &str,
    _bytes: &[u8],
  ) -> Result<String, MediaError> {
    Err(MediaError::NotConfigured)
  }
}
