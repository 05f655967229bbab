//! Depth-only shadow map

/// Square depth texture a light renders into and the lit passes sample
pub struct ShadowMap {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl ShadowMap {
    pub fn new(device: &wgpu::Device, label: &str, size: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: super::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { _texture: texture, view }
    }

    /// Depth attachment cleared to the far plane; shadow passes bind no colour target
    pub fn bind_depth_target_and_clear(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }
    }

    /// View the lit pipelines sample through the comparison sampler
    pub fn shader_view(&self) -> &wgpu::TextureView {
        &self.view
    }
}
