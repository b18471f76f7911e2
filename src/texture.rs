use crate::Rect;

/// Texture sampling filter.
///
/// The mipmap variants only make sense as a minification filter; as a
/// magnification filter they behave like their non-mipmapped counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    /// Nearest texel.
    Nearest,
    /// Bilinear interpolation.
    #[default]
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    /// Trilinear filtering: bilinear within a level, linear between levels.
    LinearMipmapLinear,
}

impl Filter {
    /// Whether sampling with this filter reads from more than the base level.
    pub fn uses_mipmaps(self) -> bool {
        !matches!(self, Filter::Nearest | Filter::Linear)
    }
}

/// Storage format of the texture on the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// Uncompressed 8-bit RGBA.
    #[default]
    Rgba8,
    /// DXT1 (BC1) block compression, 8 bytes per 4x4 block.
    Dxt1,
}

/// Texture coordinate wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Wrap {
    #[default]
    Repeat,
    Clamp,
    Mirror,
}

/// A decoded image together with the options a renderer needs to sample it.
///
/// Textures are plain CPU-side records. Nothing touches the GPU until
/// [`Texture::upload_to_wgpu`] is called.
#[derive(Debug, Clone)]
pub struct Texture {
    /// The pixel source.
    pub source: image::DynamicImage,
    /// The region of `source` the texture covers.
    pub bounds: Rect,
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub format: Format,
    pub wrap_u: Wrap,
    pub wrap_v: Wrap,
}

impl Texture {
    /// Creates a texture covering the whole of `source`, with every option at
    /// its default.
    pub fn new(source: image::DynamicImage) -> Self {
        let bounds = Rect::new(0, 0, source.width(), source.height());
        Self {
            source,
            bounds,
            min_filter: Filter::default(),
            mag_filter: Filter::default(),
            format: Format::default(),
            wrap_u: Wrap::default(),
            wrap_v: Wrap::default(),
        }
    }

    /// The size of the texture in texels.
    pub fn size(&self) -> glam::UVec2 {
        self.bounds.size
    }

    /// Number of mip levels the texture is uploaded with.
    pub fn mip_level_count(&self) -> u32 {
        if self.min_filter.uses_mipmaps() {
            crate::dxt::mip_level_count(self.bounds.size)
        } else {
            1
        }
    }

    /// The pixels inside `bounds` as tightly packed RGBA.
    pub(crate) fn to_rgba8(&self) -> image::RgbaImage {
        let full = self.source.to_rgba8();
        if self.bounds.offset == glam::IVec2::ZERO && self.bounds.size == self.source_size() {
            return full;
        }
        image::imageops::crop_imm(
            &full,
            self.bounds.left().max(0) as u32,
            self.bounds.top().max(0) as u32,
            self.bounds.size.x,
            self.bounds.size.y,
        )
        .to_image()
    }

    fn source_size(&self) -> glam::UVec2 {
        glam::UVec2::new(self.source.width(), self.source.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> image::DynamicImage {
        image::DynamicImage::ImageRgba8(image::RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([0xff, 0xff, 0xff, 0xff])
            } else {
                image::Rgba([0, 0, 0, 0xff])
            }
        }))
    }

    #[test]
    fn new_covers_whole_source() {
        let texture = Texture::new(checkerboard(5, 3));
        assert_eq!(texture.bounds, Rect::new(0, 0, 5, 3));
        assert_eq!(texture.size(), glam::UVec2::new(5, 3));
        assert_eq!(texture.min_filter, Filter::Linear);
        assert_eq!(texture.mag_filter, Filter::Linear);
        assert_eq!(texture.format, Format::Rgba8);
        assert_eq!(texture.wrap_u, Wrap::Repeat);
        assert_eq!(texture.wrap_v, Wrap::Repeat);
    }

    #[test]
    fn mip_levels_follow_min_filter() {
        let mut texture = Texture::new(checkerboard(16, 4));
        assert_eq!(texture.mip_level_count(), 1);
        texture.min_filter = Filter::LinearMipmapLinear;
        assert_eq!(texture.mip_level_count(), 5);
    }

    #[test]
    fn to_rgba8_crops_to_bounds() {
        let mut texture = Texture::new(checkerboard(4, 4));
        texture.bounds = Rect::new(1, 0, 2, 2);
        let pixels = texture.to_rgba8();
        assert_eq!(pixels.dimensions(), (2, 2));
        assert_eq!(pixels.get_pixel(0, 0).0, [0, 0, 0, 0xff]);
        assert_eq!(pixels.get_pixel(1, 0).0, [0xff, 0xff, 0xff, 0xff]);
    }
}
