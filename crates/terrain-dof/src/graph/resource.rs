//! Graph resources

use crate::light::MAX_SHADOW_CASTERS;
use crate::target::{COLOR_TARGET_FORMAT, DEPTH_COLOR_FORMAT};

/// Pass identifier
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct PassId(pub usize);

/// Every texture a pass may render into or sample
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum TargetId {
    /// Depth-only shadow map of the given slot
    ShadowMap(usize),
    /// `z / w` of the scene as seen from the camera
    CameraDepth,
    /// Lit scene
    Screen,
    /// Blurred copy of the screen
    Blur,
    /// The host's swapchain view
    BackBuffer,
}

impl TargetId {
    /// Colour format the target renders into, `None` for depth-only targets
    pub fn color_format(self, surface_format: wgpu::TextureFormat) -> Option<wgpu::TextureFormat> {
        match self {
            TargetId::ShadowMap(_) => None,
            TargetId::CameraDepth => Some(DEPTH_COLOR_FORMAT),
            TargetId::Screen | TargetId::Blur => Some(COLOR_TARGET_FORMAT),
            TargetId::BackBuffer => Some(surface_format),
        }
    }

    /// Whether a texture behind this id exists
    pub fn is_valid(self) -> bool {
        match self {
            TargetId::ShadowMap(slot) => slot < MAX_SHADOW_CASTERS,
            _ => true,
        }
    }

    /// Whether later passes can bind this target as a texture
    pub fn is_sampleable(self) -> bool {
        self != TargetId::BackBuffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_maps_have_no_colour() {
        let surface = wgpu::TextureFormat::Bgra8UnormSrgb;
        assert_eq!(TargetId::ShadowMap(0).color_format(surface), None);
        assert_eq!(TargetId::BackBuffer.color_format(surface), Some(surface));
        assert_eq!(TargetId::CameraDepth.color_format(surface), Some(DEPTH_COLOR_FORMAT));
    }

    #[test]
    fn only_two_shadow_slots_exist() {
        assert!(TargetId::ShadowMap(1).is_valid());
        assert!(!TargetId::ShadowMap(2).is_valid());
        assert!(!TargetId::BackBuffer.is_sampleable());
    }
}
