//! gfxutil loads image files into textures for wgpu, and caches them by path so every caller
//! shares the same texture.
//!
//! ```no_run
//! let texture = gfxutil::open_texture("assets/grass.png")?;
//! assert_eq!(texture.format, gfxutil::Format::Dxt1);
//! # Ok::<(), gfxutil::Error>(())
//! ```
//!
//! Which image formats can be opened depends on the enabled cargo features (`png` by default,
//! plus `jpeg`, `gif`, `bmp`, `tga` and `webp`).

use std::sync::Arc;

use glam::*;

mod cache;
pub mod dxt;
mod gpu;
mod texture;

pub use cache::{Decode, Sniff, TextureCache};
pub use texture::{Filter, Format, Texture, Wrap};

/// An axis-aligned rectangle in texel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub offset: IVec2,
    pub size: UVec2,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            offset: IVec2::new(x, y),
            size: UVec2::new(width, height),
        }
    }
    pub const fn left(&self) -> i32 {
        self.offset.x
    }
    pub const fn top(&self) -> i32 {
        self.offset.y
    }
}

/// Errors that can occur.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The file could not be opened or read.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The file's contents are not an image in any enabled format.
    #[error(transparent)]
    Decode(#[from] image::ImageError),

    /// DXT1 textures must be a whole number of 4x4 blocks.
    #[error("{width}x{height} texture is not a multiple of the 4x4 DXT1 block size")]
    UnalignedBlocks { width: u32, height: u32 },

    /// The device lacks a feature the texture's format requires.
    #[error("device is missing required features {0:?}")]
    MissingFeature(wgpu::Features),
}

lazy_static::lazy_static! {
    static ref TEXTURES: TextureCache = TextureCache::new();
}

/// Opens the image file at `path` and returns it as a texture, using a process-wide cache.
///
/// The texture has [`Filter::LinearMipmapLinear`] minification, [`Filter::Linear`]
/// magnification and [`Format::Dxt1`] storage. Calling this again with the exact same path
/// returns the same texture. Errors are IO or image decoding errors.
///
/// See [`TextureCache::get_or_load`].
pub fn open_texture(path: &str) -> Result<Arc<Texture>, Error> {
    TEXTURES.get_or_load(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let rect = Rect::new(-2, 3, 4, 5);
        assert_eq!(rect.left(), -2);
        assert_eq!(rect.top(), 3);
        assert_eq!(rect.size, UVec2::new(4, 5));
    }

    #[test]
    fn open_texture_shares_across_calls() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("global.png");
        image::RgbaImage::new(4, 4).save(&path).unwrap();
        let path = path.to_str().unwrap();

        let a = open_texture(path).unwrap();
        let b = open_texture(path).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(TEXTURES.contains(path));
    }

    #[test]
    fn open_texture_missing_is_io_error() {
        let err = open_texture("definitely/missing.png").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!TEXTURES.contains("definitely/missing.png"));
    }
}
