//! Depth-of-field composite
//!
//! The focus distance is the camera depth under the centre of the screen.
//! Pixels whose linear depth differs from it by more than `percentage` of the
//! far plane fade towards the blurred image, reaching it fully `cutoff`
//! further out (scaled by `weighting`). When disabled the sharp image passes
//! through untouched.

use glam::Vec4;

use super::{TransformBlock, Transforms};
use crate::frame::DepthOfFieldSettings;

const MIN_CUTOFF: f32 = 1e-5;

#[derive(Debug, Clone, PartialEq)]
pub struct DepthOfFieldParams {
    pub transforms: Transforms,
    pub settings: DepthOfFieldSettings,
    /// Camera clip planes, used to linearise the stored depth
    pub near: f32,
    pub far: f32,
}

impl DepthOfFieldParams {
    pub fn uniforms(&self) -> DepthOfFieldUniforms {
        DepthOfFieldUniforms {
            transforms: self.transforms.block(),
            percentage: self.settings.percentage,
            cutoff: self.settings.cutoff,
            weighting: self.settings.weighting,
            active: self.settings.enabled as u32,
            near: self.near,
            far: self.far,
            _pad: [0.0; 2],
        }
    }

    /// Stored `z / w` depth as a fraction of the far plane
    pub fn linear_depth(&self, depth: f32) -> f32 {
        self.near / (self.far - depth * (self.far - self.near))
    }

    /// How far a pixel leans towards the blurred image, mirrors the shader
    pub fn blend_factor(&self, depth: f32, focus_depth: f32) -> f32 {
        if !self.settings.enabled {
            return 0.0;
        }
        let distance = (self.linear_depth(depth) - self.linear_depth(focus_depth)).abs();
        let blend = (distance - self.settings.percentage) / self.settings.cutoff.max(MIN_CUTOFF)
            * self.settings.weighting;
        blend.clamp(0.0, 1.0)
    }

    /// Composite one pixel, mirrors the shader
    pub fn shade(&self, sharp: Vec4, blurred: Vec4, depth: f32, focus_depth: f32) -> Vec4 {
        if !self.settings.enabled {
            return sharp;
        }
        sharp.lerp(blurred, self.blend_factor(depth, focus_depth))
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DepthOfFieldUniforms {
    pub transforms: TransformBlock,
    pub percentage: f32,
    pub cutoff: f32,
    pub weighting: f32,
    pub active: u32,
    pub near: f32,
    pub far: f32,
    pub _pad: [f32; 2],
}
