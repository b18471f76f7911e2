//! DXT1 (BC1) block compression and mipmap generation.
//!
//! The encoder is a straightforward range fit: each 4x4 block takes the
//! per-channel minimum and maximum as its endpoints and picks the closest of
//! the four interpolated colours for every texel. Alpha is discarded.

use rgb::RGB8;

/// Width and height of a compressed block in texels.
pub const BLOCK_DIM: u32 = 4;

/// Bytes per compressed block.
pub const BLOCK_SIZE: usize = std::mem::size_of::<Block>();

#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct Block {
    color0: u16,
    color1: u16,
    indices: u32,
}

impl Block {
    fn new(color0: u16, color1: u16, indices: u32) -> Self {
        // Stored little-endian regardless of host order.
        Self {
            color0: color0.to_le(),
            color1: color1.to_le(),
            indices: indices.to_le(),
        }
    }
}

/// Number of bytes [`encode`] produces for an image of the given size.
pub fn encoded_len(width: u32, height: u32) -> usize {
    width.div_ceil(BLOCK_DIM) as usize * height.div_ceil(BLOCK_DIM) as usize * BLOCK_SIZE
}

/// Number of levels in a full mip chain for a texture of the given size.
pub fn mip_level_count(size: glam::UVec2) -> u32 {
    let largest = size.x.max(size.y).max(1);
    u32::BITS - largest.leading_zeros()
}

/// Compresses an RGBA image into DXT1 blocks, row-major.
///
/// Images whose dimensions are not a multiple of four are padded by repeating
/// the last row and column.
pub fn encode(img: &image::RgbaImage) -> Vec<u8> {
    let (width, height) = img.dimensions();
    let mut blocks = Vec::with_capacity(encoded_len(width, height) / BLOCK_SIZE);
    for by in (0..height).step_by(BLOCK_DIM as usize) {
        for bx in (0..width).step_by(BLOCK_DIM as usize) {
            let mut texels = [RGB8::default(); 16];
            for (i, texel) in texels.iter_mut().enumerate() {
                let x = (bx + i as u32 % BLOCK_DIM).min(width - 1);
                let y = (by + i as u32 / BLOCK_DIM).min(height - 1);
                let [r, g, b, _] = img.get_pixel(x, y).0;
                *texel = RGB8::new(r, g, b);
            }
            blocks.push(encode_block(&texels));
        }
    }
    bytemuck::cast_slice(&blocks).to_vec()
}

fn encode_block(texels: &[RGB8; 16]) -> Block {
    let mut min = RGB8::new(0xff, 0xff, 0xff);
    let mut max = RGB8::new(0, 0, 0);
    for t in texels {
        min = RGB8::new(min.r.min(t.r), min.g.min(t.g), min.b.min(t.b));
        max = RGB8::new(max.r.max(t.r), max.g.max(t.g), max.b.max(t.b));
    }

    let color0 = to_565(max);
    let color1 = to_565(min);
    if color0 == color1 {
        return Block::new(color0, color1, 0);
    }
    // Every channel of max is >= min, so color0 > color1 and the block is in
    // the opaque four-colour mode.
    debug_assert!(color0 > color1);

    let c0 = from_565(color0);
    let c1 = from_565(color1);
    let palette = [c0, c1, lerp_third(c0, c1), lerp_third(c1, c0)];

    let mut indices = 0u32;
    for (i, t) in texels.iter().enumerate() {
        let best = palette
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| distance(**p, *t))
            .map(|(index, _)| index as u32)
            .unwrap_or(0);
        indices |= best << (2 * i);
    }
    Block::new(color0, color1, indices)
}

fn to_565(c: RGB8) -> u16 {
    ((c.r as u16 >> 3) << 11) | ((c.g as u16 >> 2) << 5) | (c.b as u16 >> 3)
}

fn from_565(c: u16) -> RGB8 {
    let r = ((c >> 11) & 0x1f) as u8;
    let g = ((c >> 5) & 0x3f) as u8;
    let b = (c & 0x1f) as u8;
    RGB8::new((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
}

/// `(2a + b) / 3`
fn lerp_third(a: RGB8, b: RGB8) -> RGB8 {
    let mix = |a: u8, b: u8| ((2 * a as u16 + b as u16) / 3) as u8;
    RGB8::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
}

fn distance(a: RGB8, b: RGB8) -> u32 {
    let d = |a: u8, b: u8| (a as i32 - b as i32).unsigned_abs().pow(2);
    d(a.r, b.r) + d(a.g, b.g) + d(a.b, b.b)
}

/// Builds a full mip chain, starting with `base` and halving down to 1x1.
pub fn mip_chain(base: image::RgbaImage) -> Vec<image::RgbaImage> {
    let levels = mip_level_count(glam::UVec2::new(base.width(), base.height()));
    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(base);
    for _ in 1..levels {
        let prev = &chain[chain.len() - 1];
        let width = (prev.width() / 2).max(1);
        let height = (prev.height() / 2).max(1);
        let next =
            image::imageops::resize(prev, width, height, image::imageops::FilterType::Triangle);
        chain.push(next);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> image::RgbaImage {
        image::RgbaImage::from_pixel(width, height, image::Rgba(rgba))
    }

    #[test]
    fn solid_block_uses_single_endpoint() {
        let bytes = encode(&solid(4, 4, [0xff, 0, 0, 0xff]));
        assert_eq!(bytes, [0x00, 0xf8, 0x00, 0xf8, 0, 0, 0, 0]);
    }

    #[test]
    fn two_colour_block_picks_endpoints() {
        let img = image::RgbaImage::from_fn(4, 4, |x, _| {
            if x < 2 {
                image::Rgba([0xff, 0xff, 0xff, 0xff])
            } else {
                image::Rgba([0, 0, 0, 0xff])
            }
        });
        let bytes = encode(&img);
        assert_eq!(&bytes[..4], &[0xff, 0xff, 0x00, 0x00]);
        // Columns 0 and 1 are white (index 0), columns 2 and 3 black (index 1).
        let row = 0b01_01_00_00u32;
        let indices = row | row << 8 | row << 16 | row << 24;
        assert_eq!(&bytes[4..], &indices.to_le_bytes());
    }

    #[test]
    fn encoded_size_rounds_up_to_blocks() {
        assert_eq!(encoded_len(4, 4), 8);
        assert_eq!(encoded_len(5, 4), 16);
        assert_eq!(encoded_len(1, 1), 8);
        assert_eq!(encode(&solid(6, 9, [1, 2, 3, 4])).len(), encoded_len(6, 9));
    }

    #[test]
    fn endpoints_are_ordered_for_opaque_mode() {
        let img = image::RgbaImage::from_fn(4, 4, |x, y| {
            image::Rgba([(x * 60) as u8, (y * 60) as u8, 0x80, 0xff])
        });
        let bytes = encode(&img);
        let color0 = u16::from_le_bytes([bytes[0], bytes[1]]);
        let color1 = u16::from_le_bytes([bytes[2], bytes[3]]);
        assert!(color0 > color1);
    }

    #[test]
    fn mip_chain_halves_to_one() {
        let chain = mip_chain(solid(8, 4, [0x10, 0x20, 0x30, 0xff]));
        let sizes: Vec<_> = chain.iter().map(|level| level.dimensions()).collect();
        assert_eq!(sizes, [(8, 4), (4, 2), (2, 1), (1, 1)]);
    }

    #[test]
    fn mip_level_count_of_degenerate_sizes() {
        assert_eq!(mip_level_count(glam::UVec2::new(1, 1)), 1);
        assert_eq!(mip_level_count(glam::UVec2::new(0, 0)), 1);
        assert_eq!(mip_level_count(glam::UVec2::new(256, 17)), 9);
    }
}
