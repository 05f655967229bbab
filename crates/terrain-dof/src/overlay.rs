//! UI overlay hook
//!
//! The renderer hands the overlay its command encoder after the composite
//! pass, so anything the overlay draws lands on top of the finished frame.
//! Overlays own the frame parameters' valid ranges; [`clamp_to_controls`]
//! applies the ranges of the stock control panel.

use glam::{Vec3, Vec4};

use crate::frame::{FrameParams, LightParams};
use crate::surface::MAX_TESSELLATION_FACTOR;

/// Something drawn over the composited frame, usually an immediate-mode UI
pub trait Overlay {
    /// Record the overlay into `encoder`, targeting the back buffer
    ///
    /// `params` may be edited; changes take effect from the next frame.
    fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        params: &mut FrameParams,
    );
}

pub const TESSELLATION_RANGE: (u32, u32) = (1, MAX_TESSELLATION_FACTOR);
pub const OBJECT_POSITION_RANGE: (f32, f32) = (0.0, 1000.0);
pub const LIGHT_POSITION_RANGE: (f32, f32) = (-1000.0, 1000.0);
pub const FALLOFF_RANGE: (f32, f32) = (0.0, 1.0);
pub const SPECULAR_RANGE: (f32, f32) = (0.0, 5.0);
pub const SPOT_CUTOFF_RANGE: (f32, f32) = (0.0, 360.0);
pub const WEIGHTING_RANGE: (f32, f32) = (0.0, 15.0);
pub const CUTOFF_RANGE: (f32, f32) = (0.0, 1.0);

fn clamp_vec3(v: Vec3, (min, max): (f32, f32)) -> Vec3 {
    v.clamp(Vec3::splat(min), Vec3::splat(max))
}

fn clamp_colour(c: Vec4) -> Vec4 {
    c.clamp(Vec4::ZERO, Vec4::ONE)
}

fn clamp_light(light: &mut LightParams) {
    light.ambient = clamp_colour(light.ambient);
    light.diffuse = clamp_colour(light.diffuse);
    light.position = clamp_vec3(light.position, LIGHT_POSITION_RANGE);
    light.direction = clamp_vec3(light.direction, (-1.0, 1.0));
}

/// Pull every parameter into the range its control allows
pub fn clamp_to_controls(params: &mut FrameParams) {
    params.tessellation_factor = params
        .tessellation_factor
        .clamp(TESSELLATION_RANGE.0, TESSELLATION_RANGE.1);
    params.object_position = clamp_vec3(params.object_position, OBJECT_POSITION_RANGE);

    clamp_light(&mut params.directional);
    clamp_light(&mut params.point);
    clamp_light(&mut params.spot);

    params.point_falloff = params.point_falloff.clamp(FALLOFF_RANGE.0, FALLOFF_RANGE.1);
    params.specular_intensity = params.specular_intensity.clamp(SPECULAR_RANGE.0, SPECULAR_RANGE.1);
    params.specular_exponent = params.specular_exponent.clamp(SPECULAR_RANGE.0, SPECULAR_RANGE.1);
    params.spot_cutoff = params.spot_cutoff.clamp(SPOT_CUTOFF_RANGE.0, SPOT_CUTOFF_RANGE.1);

    let dof = &mut params.depth_of_field;
    dof.weighting = dof.weighting.clamp(WEIGHTING_RANGE.0, WEIGHTING_RANGE.1);
    dof.cutoff = dof.cutoff.clamp(CUTOFF_RANGE.0, CUTOFF_RANGE.1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_already_in_range() {
        let mut params = FrameParams::default();
        clamp_to_controls(&mut params);
        assert_eq!(params, FrameParams::default());
    }

    #[test]
    fn out_of_range_values_are_pulled_back() {
        let mut params = FrameParams {
            tessellation_factor: 0,
            point_falloff: -2.0,
            spot_cutoff: 720.0,
            object_position: Vec3::new(-5.0, 2000.0, 10.0),
            ..Default::default()
        };
        params.spot.diffuse = Vec4::new(2.0, -1.0, 0.5, 1.0);
        params.depth_of_field.weighting = 40.0;
        clamp_to_controls(&mut params);

        assert_eq!(params.tessellation_factor, 1);
        assert_eq!(params.point_falloff, 0.0);
        assert_eq!(params.spot_cutoff, 360.0);
        assert_eq!(params.object_position, Vec3::new(0.0, 1000.0, 10.0));
        assert_eq!(params.spot.diffuse, Vec4::new(1.0, 0.0, 0.5, 1.0));
        assert_eq!(params.depth_of_field.weighting, 15.0);
    }
}
