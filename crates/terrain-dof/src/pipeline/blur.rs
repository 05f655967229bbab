//! Combined horizontal + vertical gaussian blur

use super::{TransformBlock, Transforms};

/// Centre tap, then the taps one and two texels out on each side
pub const BLUR_WEIGHTS: [f32; 3] = [0.4062, 0.2442, 0.0545];

#[derive(Debug, Clone, PartialEq)]
pub struct BlurParams {
    pub transforms: Transforms,
    /// Pixel size of the sampled texture
    pub screen_width: f32,
    pub screen_height: f32,
}

impl BlurParams {
    pub fn uniforms(&self) -> BlurUniforms {
        BlurUniforms {
            transforms: self.transforms.block(),
            screen_size: [self.screen_width, self.screen_height],
            _pad: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlurUniforms {
    pub transforms: TransformBlock,
    pub screen_size: [f32; 2],
    pub _pad: [f32; 2],
}
