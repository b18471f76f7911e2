//! Translation of [`Texture`]s into wgpu resources.

use wgpu::util::DeviceExt;

use crate::dxt;
use crate::texture::{Filter, Format, Texture, Wrap};
use crate::Error;

impl Filter {
    /// The filter used within a single mip level.
    pub fn wgpu_filter_mode(self) -> wgpu::FilterMode {
        match self {
            Filter::Nearest | Filter::NearestMipmapNearest | Filter::NearestMipmapLinear => {
                wgpu::FilterMode::Nearest
            }
            Filter::Linear | Filter::LinearMipmapNearest | Filter::LinearMipmapLinear => {
                wgpu::FilterMode::Linear
            }
        }
    }

    /// The filter used between mip levels.
    pub fn wgpu_mipmap_filter_mode(self) -> wgpu::FilterMode {
        match self {
            Filter::NearestMipmapLinear | Filter::LinearMipmapLinear => wgpu::FilterMode::Linear,
            _ => wgpu::FilterMode::Nearest,
        }
    }
}

impl Format {
    pub fn wgpu_texture_format(self) -> wgpu::TextureFormat {
        match self {
            Format::Rgba8 => wgpu::TextureFormat::Rgba8UnormSrgb,
            Format::Dxt1 => wgpu::TextureFormat::Bc1RgbaUnormSrgb,
        }
    }
}

impl Wrap {
    pub fn wgpu_address_mode(self) -> wgpu::AddressMode {
        match self {
            Wrap::Repeat => wgpu::AddressMode::Repeat,
            Wrap::Clamp => wgpu::AddressMode::ClampToEdge,
            Wrap::Mirror => wgpu::AddressMode::MirrorRepeat,
        }
    }
}

impl Texture {
    /// Describes the GPU texture [`Texture::upload_to_wgpu`] creates.
    pub fn texture_descriptor(&self) -> wgpu::TextureDescriptor<'static> {
        wgpu::TextureDescriptor {
            label: Some("gfxutil: Texture"),
            size: wgpu::Extent3d {
                width: self.bounds.size.x,
                height: self.bounds.size.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: self.mip_level_count(),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format.wgpu_texture_format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        }
    }

    /// Describes a sampler honoring the texture's filters and wrap modes.
    pub fn sampler_descriptor(&self) -> wgpu::SamplerDescriptor<'static> {
        wgpu::SamplerDescriptor {
            label: Some("gfxutil: Sampler"),
            address_mode_u: self.wrap_u.wgpu_address_mode(),
            address_mode_v: self.wrap_v.wgpu_address_mode(),
            mag_filter: self.mag_filter.wgpu_filter_mode(),
            min_filter: self.min_filter.wgpu_filter_mode(),
            mipmap_filter: self.min_filter.wgpu_mipmap_filter_mode(),
            ..Default::default()
        }
    }

    pub fn create_sampler(&self, device: &wgpu::Device) -> wgpu::Sampler {
        device.create_sampler(&self.sampler_descriptor())
    }

    /// Uploads the texture to the GPU, generating mip levels if the
    /// minification filter samples them.
    ///
    /// DXT1 textures need a device with [`wgpu::Features::TEXTURE_COMPRESSION_BC`]
    /// and dimensions that are multiples of four.
    pub fn upload_to_wgpu(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<wgpu::Texture, Error> {
        if self.format == Format::Dxt1
            && !device
                .features()
                .contains(wgpu::Features::TEXTURE_COMPRESSION_BC)
        {
            return Err(Error::MissingFeature(
                wgpu::Features::TEXTURE_COMPRESSION_BC,
            ));
        }
        let desc = self.texture_descriptor();
        let data = self.texel_data()?;
        log::debug!(
            "uploading {}x{} texture ({:?}, {} mip levels)",
            desc.size.width,
            desc.size.height,
            self.format,
            desc.mip_level_count
        );
        Ok(device.create_texture_with_data(
            queue,
            &desc,
            wgpu::util::TextureDataOrder::LayerMajor,
            &data,
        ))
    }

    /// Every mip level of the texture, encoded in its storage format and
    /// concatenated from largest to smallest.
    pub fn texel_data(&self) -> Result<Vec<u8>, Error> {
        let size = self.bounds.size;
        if self.format == Format::Dxt1
            && (size.x % dxt::BLOCK_DIM != 0 || size.y % dxt::BLOCK_DIM != 0)
        {
            return Err(Error::UnalignedBlocks {
                width: size.x,
                height: size.y,
            });
        }

        let base = self.to_rgba8();
        let levels = if self.min_filter.uses_mipmaps() {
            dxt::mip_chain(base)
        } else {
            vec![base]
        };

        let mut data = vec![];
        for level in levels.iter() {
            match self.format {
                Format::Rgba8 => data.extend_from_slice(level.as_raw()),
                Format::Dxt1 => data.extend(dxt::encode(level)),
            }
        }
        Ok(data)
    }
}
