//! Texture asset loading.
//!
//! An image load is started with [`TextureLoader::load`], which returns a
//! [`PendingTexture`] right away and decodes on a worker thread. Consumers
//! block on [`PendingTexture::wait`] before the first draw that samples the
//! texture, so the GPU never receives a half-loaded image.

mod image_data;
mod loader;

pub use image_data::TextureImage;
pub use loader::{PendingTexture, TextureLoader};

/// Errors from texture asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("{width}x{height} RGBA image needs {expected} bytes, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("texture loader for '{0}' exited without a result")]
    LoaderGone(String),
}
