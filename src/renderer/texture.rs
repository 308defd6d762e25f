use std::path::Path;

/// Color texture plus its default view. Depth targets (main depth buffer,
/// shadow atlas) have their own wrappers; this type is for sampled images.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Texture {
    pub fn from_pixels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view }
    }

    /// Decode an image file. Soft failure: a missing or broken file logs a
    /// warning and falls back to flat white.
    pub fn from_path(device: &wgpu::Device, queue: &wgpu::Queue, path: &Path) -> Self {
        match image::open(path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let (width, height) = rgba.dimensions();
                Self::from_pixels(
                    device,
                    queue,
                    &path.display().to_string(),
                    width,
                    height,
                    &rgba,
                )
            }
            Err(err) => {
                log::warn!("Failed to load texture {:?} ({}), using white", path, err);
                Self::white(device, queue)
            }
        }
    }

    /// 1×1 white, the fallback for absent color-like textures.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_pixels(device, queue, "WhiteTexture", 1, 1, &[255, 255, 255, 255])
    }

    /// 1×1 black, the fallback for absent emissive textures.
    pub fn black(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_pixels(device, queue, "BlackTexture", 1, 1, &[0, 0, 0, 255])
    }

    /// 1×1 flat normal (+Z), the fallback normal map.
    pub fn flat_normal(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_pixels(device, queue, "FlatNormalTexture", 1, 1, &[128, 128, 255, 255])
    }
}
