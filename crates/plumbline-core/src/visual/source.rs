// ─────────────────────────────────────────────────────────────────────
// Plumbline: Image Source Interface
// ─────────────────────────────────────────────────────────────────────
//! Where rendered images come from.
//!
//! The visual validator only needs decoded pixels. Renders may arrive as
//! encoded bytes from a generator, as files on disk, or already decoded.

use std::path::PathBuf;

use image::DynamicImage;
use plumbline_types::{PlumblineError, PlumblineResult};

/// Trait for image sources.
pub trait ImageSource: Send + Sync {
    fn load(&self) -> PlumblineResult<DynamicImage>;
}

/// Encoded image bytes (PNG, JPEG or WebP).
pub struct EncodedImage {
    bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl ImageSource for EncodedImage {
    fn load(&self) -> PlumblineResult<DynamicImage> {
        if self.bytes.is_empty() {
            return Err(PlumblineError::Decode("empty image buffer".to_string()));
        }
        image::load_from_memory(&self.bytes).map_err(|e| PlumblineError::Decode(e.to_string()))
    }
}

/// Image file on disk; format is inferred from the contents.
pub struct ImageFile {
    path: PathBuf,
}

impl ImageFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSource for ImageFile {
    fn load(&self) -> PlumblineResult<DynamicImage> {
        image::open(&self.path)
            .map_err(|e| PlumblineError::Image(format!("{}: {e}", self.path.display())))
    }
}

impl ImageSource for DynamicImage {
    fn load(&self) -> PlumblineResult<DynamicImage> {
        Ok(self.clone())
    }
}
