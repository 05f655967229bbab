//! Offscreen targets: the two shadow maps and the screen-sized render targets

mod render_target;
mod shadow_map;

pub use render_target::{ortho_for, RenderTarget};
pub use shadow_map::ShadowMap;

use crate::config::RendererConfig;
use crate::light::MAX_SHADOW_CASTERS;

/// Depth format of every depth attachment
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Format of the screen and blur targets
pub const COLOR_TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Format the camera depth pass writes `z / w` into
pub const DEPTH_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;

/// All fixed-size offscreen targets of the frame
pub struct OffscreenTargets {
    pub shadow_maps: [ShadowMap; MAX_SHADOW_CASTERS],
    pub camera_depth: RenderTarget,
    pub screen: RenderTarget,
    pub blur: RenderTarget,
}

impl OffscreenTargets {
    pub fn new(device: &wgpu::Device, config: &RendererConfig) -> Self {
        let shadow_maps = [
            ShadowMap::new(device, "Shadow Map 0", config.shadow_map_size),
            ShadowMap::new(device, "Shadow Map 1", config.shadow_map_size),
        ];
        let target = |label, format| RenderTarget::new(device, label, config.width, config.height, format);
        let targets = Self {
            shadow_maps,
            camera_depth: target("Camera Depth Target", DEPTH_COLOR_FORMAT),
            screen: target("Screen Target", COLOR_TARGET_FORMAT),
            blur: target("Blur Target", COLOR_TARGET_FORMAT),
        };
        log::info!(
            "Offscreen targets created: {} shadow maps at {}x{}, screen targets at {}x{}",
            MAX_SHADOW_CASTERS,
            config.shadow_map_size,
            config.shadow_map_size,
            config.width,
            config.height
        );
        targets
    }
}
