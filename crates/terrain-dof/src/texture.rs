//! Named textures the pipelines bind
//!
//! The host fills the library before building the renderer. Textures are
//! looked up by name once, at initialization; a missing name is fatal.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::{Error, Result};

/// How the texel values are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    /// Colour data, decoded from sRGB when sampled
    Color,
    /// Linear data such as a height map
    Data,
}

impl TextureKind {
    fn format(self) -> wgpu::TextureFormat {
        match self {
            TextureKind::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureKind::Data => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: (u32, u32),
}

impl GpuTexture {
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
        kind: TextureKind,
        label: Option<&str>,
    ) -> Self {
        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: kind.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view, size: (width, height) }
    }

    /// Size of one texel in UV units along X
    pub fn texel_size(&self) -> f32 {
        1.0 / self.size.0.max(1) as f32
    }
}

/// Name to texture map
#[derive(Default)]
pub struct TextureLibrary {
    textures: HashMap<String, Arc<GpuTexture>>,
}

impl TextureLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload tightly packed RGBA8 pixels under `name`, replacing any previous entry
    pub fn insert_rgba8(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
        kind: TextureKind,
    ) -> Result<Arc<GpuTexture>> {
        check_rgba8_len(name, width, height, pixels.len())?;
        let texture = Arc::new(GpuTexture::from_rgba8(
            device, queue, pixels, width, height, kind, Some(name),
        ));
        log::debug!("Texture '{}' uploaded ({}x{}, {:?})", name, width, height, kind);
        self.textures.insert(name.to_string(), texture.clone());
        Ok(texture)
    }

    /// Decode an image file and upload it under `name`
    pub fn load(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        path: impl AsRef<Path>,
        kind: TextureKind,
    ) -> Result<Arc<GpuTexture>> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| Error::Texture(format!("failed to open {}: {}", path.display(), e)))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        self.insert_rgba8(device, queue, name, width, height, img.as_raw(), kind)
    }

    pub fn get(&self, name: &str) -> Option<Arc<GpuTexture>> {
        self.textures.get(name).cloned()
    }

    /// Look up a texture the renderer cannot start without
    pub fn require(&self, name: &str) -> Result<Arc<GpuTexture>> {
        self.get(name)
            .ok_or_else(|| Error::Texture(format!("texture '{}' is not loaded", name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

fn check_rgba8_len(name: &str, width: u32, height: u32, len: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::Texture(format!("texture '{}' has an empty size", name)));
    }
    let expected = width as usize * height as usize * 4;
    if len != expected {
        return Err(Error::Texture(format!(
            "texture '{}' is {}x{} but got {} bytes, expected {}",
            name, width, height, len, expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_texture_is_fatal() {
        let library = TextureLibrary::new();
        let err = library.require("heightMap").err().unwrap();
        assert!(matches!(err, Error::Texture(_)));
    }

    #[test]
    fn pixel_length_must_match_size() {
        assert!(check_rgba8_len("brick", 2, 2, 16).is_ok());
        assert!(check_rgba8_len("brick", 2, 2, 12).is_err());
        assert!(check_rgba8_len("brick", 0, 2, 0).is_err());
    }
}
