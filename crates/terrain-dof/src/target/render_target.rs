//! Screen-sized offscreen colour target

use glam::Mat4;

/// Offscreen colour texture with its own depth buffer
///
/// Written by one pass and sampled by later ones. Screen quads drawn into or
/// from it use [`ortho_for`] with the target's size.
pub struct RenderTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl RenderTarget {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
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
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{} Depth", label)),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: super::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            depth_view: depth_texture.create_view(&wgpu::TextureViewDescriptor::default()),
            texture,
            _depth_texture: depth_texture,
        }
    }

    /// Colour and depth attachments, colour cleared to `color` and depth to 1.0
    pub fn set_as_color_target_and_clear(
        &self,
        color: [f32; 4],
    ) -> (
        wgpu::RenderPassColorAttachment<'_>,
        wgpu::RenderPassDepthStencilAttachment<'_>,
    ) {
        let [r, g, b, a] = color;
        (
            wgpu::RenderPassColorAttachment {
                view: &self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: r as f64,
                        g: g as f64,
                        b: b as f64,
                        a: a as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            },
            wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            },
        )
    }

    pub fn shader_view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Backing texture, also a copy source for readback
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }
}

/// Orthographic projection of a `width` x `height` pixel screen
pub fn ortho_for(width: u32, height: u32, near: f32, far: f32) -> Mat4 {
    let (hw, hh) = (width as f32 * 0.5, height as f32 * 0.5);
    Mat4::orthographic_lh(-hw, hw, -hh, hh, near, far)
}
