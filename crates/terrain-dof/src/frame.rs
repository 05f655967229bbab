//! Per-frame parameters
//!
//! [`FrameParams`] is owned by the application (usually edited through the
//! overlay) and handed to [`Renderer::render_frame`](crate::Renderer::render_frame)
//! every frame. Nothing here is validated; the overlay clamps its widgets.

use glam::{Vec3, Vec4};

use crate::light::LightKind;
use crate::surface::MAX_TESSELLATION_FACTOR;

/// Colour and placement of one light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParams {
    pub active: bool,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub position: Vec3,
    pub direction: Vec3,
}

/// Depth-of-field composite controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthOfFieldSettings {
    pub enabled: bool,
    /// Scales how quickly pixels fade to the blurred image
    pub weighting: f32,
    /// Depth distance, as a fraction of the far plane, over which pixels go fully blurred
    pub cutoff: f32,
    /// Depth distance around the focus that stays sharp, as a fraction of the far plane
    pub percentage: f32,
}

impl Default for DepthOfFieldSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            weighting: 1.0,
            cutoff: 0.15,
            percentage: 0.001,
        }
    }
}

/// Everything the application may change between frames
#[derive(Debug, Clone, PartialEq)]
pub struct FrameParams {
    /// Inside and outside tessellation factor of every patch
    pub tessellation_factor: u32,
    pub directional: LightParams,
    pub point: LightParams,
    pub spot: LightParams,
    /// Point light attenuation, `1 / (1 + falloff * distance)`
    pub point_falloff: f32,
    /// Full cone angle of the spot light, in degrees
    pub spot_cutoff: f32,
    pub specular_intensity: f32,
    pub specular_exponent: f32,
    /// Shade with per-pixel normals from the height map instead of per-vertex ones
    pub bump_mapping: bool,
    pub depth_of_field: DepthOfFieldSettings,
    /// World position of the cube
    pub object_position: Vec3,
    /// Draw the terrain again as lines on top of the composite
    pub wireframe: bool,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            tessellation_factor: 10,
            directional: LightParams {
                active: true,
                ambient: Vec4::new(0.2, 0.2, 0.2, 1.0),
                diffuse: Vec4::new(0.5, 0.5, 0.5, 0.7),
                position: Vec3::ZERO,
                direction: Vec3::new(1.0, -0.7, 0.0),
            },
            point: LightParams {
                active: true,
                ambient: Vec4::new(0.2, 0.2, 0.2, 1.0),
                diffuse: Vec4::new(0.8, 0.0, 0.8, 0.7),
                position: Vec3::new(64.0, 18.0, 68.0),
                direction: Vec3::new(0.0, -1.0, 0.0),
            },
            spot: LightParams {
                active: true,
                ambient: Vec4::new(0.2, 0.2, 0.2, 1.0),
                diffuse: Vec4::new(0.8, 0.8, 0.0, 1.0),
                position: Vec3::new(41.0, 30.0, 72.0),
                direction: Vec3::new(0.0, -0.6, -1.0),
            },
            point_falloff: 0.05,
            spot_cutoff: 60.0,
            specular_intensity: 0.15,
            specular_exponent: 1.0,
            bump_mapping: true,
            depth_of_field: DepthOfFieldSettings::default(),
            object_position: Vec3::new(37.0, 18.0, 46.0),
            wireframe: false,
        }
    }
}

impl FrameParams {
    pub fn light(&self, kind: LightKind) -> &LightParams {
        match kind {
            LightKind::Directional => &self.directional,
            LightKind::Point => &self.point,
            LightKind::Spot => &self.spot,
        }
    }

    pub fn light_mut(&mut self, kind: LightKind) -> &mut LightParams {
        match kind {
            LightKind::Directional => &mut self.directional,
            LightKind::Point => &mut self.point,
            LightKind::Spot => &mut self.spot,
        }
    }

    /// Tessellation factor as drawn; zero would emit no geometry
    pub fn effective_tessellation(&self) -> u32 {
        self.tessellation_factor.clamp(1, MAX_TESSELLATION_FACTOR)
    }

    /// Cosine of the spot light's half angle
    pub fn spot_cutoff_cos(&self) -> f32 {
        (self.spot_cutoff * 0.5).to_radians().cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_tessellation_is_clamped() {
        let params = FrameParams {
            tessellation_factor: 0,
            ..Default::default()
        };
        assert_eq!(params.effective_tessellation(), 1);
    }

    #[test]
    fn huge_tessellation_is_capped() {
        let params = FrameParams {
            tessellation_factor: u32::MAX,
            ..Default::default()
        };
        assert_eq!(params.effective_tessellation(), MAX_TESSELLATION_FACTOR);
    }

    #[test]
    fn spot_cutoff_is_a_full_cone_angle() {
        let params = FrameParams::default();
        assert_relative_eq!(params.spot_cutoff_cos(), 30f32.to_radians().cos(), epsilon = 1e-6);
    }

    #[test]
    fn light_mut_targets_the_right_light() {
        let mut params = FrameParams::default();
        params.light_mut(LightKind::Spot).active = false;
        assert!(!params.spot.active);
        assert!(params.point.active);
    }
}
