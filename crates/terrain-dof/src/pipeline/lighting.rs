//! Lighting and shadow blocks shared by the terrain and basic pipelines

use glam::Vec3;

use super::gpu_matrix;
use crate::frame::FrameParams;
use crate::light::{LightKind, LightRig, RigEntry, ShadowCaster};

/// Lights the lighting block has room for
pub const MAX_LIGHTS: usize = 4;

/// One light as the shaders see it (80 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub position: [f32; 3],
    /// 0 directional, 1 point, 2 spot
    pub kind: u32,
    pub direction: [f32; 3],
    pub active: u32,
    /// Point light attenuation factor
    pub falloff: f32,
    /// Cosine of the spot light's half angle
    pub cutoff_cos: f32,
    /// Shadow map slot or -1
    pub shadow_slot: i32,
    pub _pad: f32,
}

impl GpuLight {
    pub fn from_entry(entry: &RigEntry, params: &FrameParams) -> Self {
        let light = &entry.light;
        let (falloff, cutoff_cos) = match entry.kind {
            LightKind::Point => (params.point_falloff, 0.0),
            LightKind::Spot => (0.0, params.spot_cutoff_cos()),
            LightKind::Directional => (0.0, 0.0),
        };
        Self {
            ambient: light.ambient().to_array(),
            diffuse: light.diffuse().to_array(),
            position: light.position().to_array(),
            kind: entry.kind.gpu_id(),
            direction: light.forward().to_array(),
            active: entry.active as u32,
            falloff,
            cutoff_cos,
            shadow_slot: entry.shadow_slot().map_or(-1, |slot| slot as i32),
            _pad: 0.0,
        }
    }
}

/// Lighting uniform block (352 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingBlock {
    pub lights: [GpuLight; MAX_LIGHTS],
    pub camera_position: [f32; 3],
    pub light_count: u32,
    pub specular_intensity: f32,
    pub specular_exponent: f32,
    pub bump_mapping: u32,
    pub _pad: f32,
}

/// View and projection of one shadow map as uploaded (128 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowCasterBlock {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl From<ShadowCaster> for ShadowCasterBlock {
    fn from(caster: ShadowCaster) -> Self {
        Self {
            view: gpu_matrix(caster.view),
            projection: gpu_matrix(caster.projection),
        }
    }
}

/// Lighting inputs of a lit draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingParams {
    pub lights: [GpuLight; MAX_LIGHTS],
    pub light_count: u32,
    pub camera_position: Vec3,
    pub specular_intensity: f32,
    pub specular_exponent: f32,
    pub bump_mapping: bool,
}

impl LightingParams {
    /// Snapshot the rig, in rig order, for one frame
    pub fn from_rig(rig: &LightRig, params: &FrameParams, camera_position: Vec3) -> Self {
        let mut lights = [GpuLight::default(); MAX_LIGHTS];
        let mut light_count = 0;
        for (slot, entry) in lights.iter_mut().zip(rig.iter()) {
            *slot = GpuLight::from_entry(entry, params);
            light_count += 1;
        }
        if rig.len() > MAX_LIGHTS {
            log::warn!("Light rig has {} lights, only {} are shaded", rig.len(), MAX_LIGHTS);
        }

        Self {
            lights,
            light_count,
            camera_position,
            specular_intensity: params.specular_intensity,
            specular_exponent: params.specular_exponent,
            bump_mapping: params.bump_mapping,
        }
    }

    pub fn block(&self) -> LightingBlock {
        LightingBlock {
            lights: self.lights,
            camera_position: self.camera_position.to_array(),
            light_count: self.light_count,
            specular_intensity: self.specular_intensity,
            specular_exponent: self.specular_exponent,
            bump_mapping: self.bump_mapping as u32,
            _pad: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RendererConfig;

    #[test]
    fn block_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 80);
        assert_eq!(std::mem::size_of::<LightingBlock>(), 80 * MAX_LIGHTS + 32);
        assert_eq!(std::mem::size_of::<ShadowCasterBlock>(), 128);
    }

    #[test]
    fn rig_snapshot_carries_kinds_flags_and_slots() {
        let config = RendererConfig::default();
        let mut params = FrameParams::default();
        params.point.active = false;
        params.spot.active = false;
        let rig = LightRig::standard(&params, &config);

        let lighting = LightingParams::from_rig(&rig, &params, Vec3::new(1.0, 2.0, 3.0));
        let block = lighting.block();

        assert_eq!(block.light_count, 3);
        let kinds: Vec<u32> = block.lights[..3].iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![0, 1, 2]);
        let active: Vec<u32> = block.lights[..3].iter().map(|l| l.active).collect();
        assert_eq!(active, vec![1, 0, 0]);
        let slots: Vec<i32> = block.lights[..3].iter().map(|l| l.shadow_slot).collect();
        assert_eq!(slots, vec![0, -1, 1]);

        assert_eq!(block.lights[1].falloff, params.point_falloff);
        assert_eq!(block.lights[2].cutoff_cos, params.spot_cutoff_cos());
        assert_eq!(block.camera_position, [1.0, 2.0, 3.0]);
        assert_eq!(block.bump_mapping, 1);
    }

    #[test]
    fn shadow_caster_block_is_transposed() {
        let caster = ShadowCaster {
            view: glam::Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            projection: glam::Mat4::IDENTITY,
        };
        let block = ShadowCasterBlock::from(caster);
        // translation lands in the last row once transposed
        assert_eq!(block.view[0][3], 1.0);
        assert_eq!(block.view[1][3], 2.0);
        assert_eq!(block.view[2][3], 3.0);
    }
}
