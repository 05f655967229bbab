//! Height tessellation + lighting pipeline

use super::lighting::{LightingBlock, LightingParams, ShadowCasterBlock};
use super::{TransformBlock, Transforms};
use crate::light::{ShadowCaster, MAX_SHADOW_CASTERS};
use crate::surface::MAX_TESSELLATION_FACTOR;

/// How the patches are subdivided and displaced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationParams {
    /// Inside and outside factor, drawn within `1..=MAX_TESSELLATION_FACTOR`
    pub factor: u32,
    /// World units of displacement for a height map value of 1.0
    pub height_scale: f32,
    /// One height map texel in UV units
    pub texel_size: f32,
    /// World units spanned by one UV unit of the plane
    pub uv_scale: f32,
}

impl TessellationParams {
    pub fn block(&self) -> TessellationBlock {
        TessellationBlock {
            factor: self.factor.clamp(1, MAX_TESSELLATION_FACTOR) as f32,
            height_scale: self.height_scale,
            texel_size: self.texel_size,
            uv_scale: self.uv_scale,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TessellationBlock {
    pub factor: f32,
    pub height_scale: f32,
    pub texel_size: f32,
    pub uv_scale: f32,
}

/// Everything a terrain draw uploads
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainParams {
    pub transforms: Transforms,
    pub shadow_casters: [ShadowCaster; MAX_SHADOW_CASTERS],
    pub tessellation: TessellationParams,
    pub lighting: LightingParams,
}

impl TerrainParams {
    pub fn uniforms(&self) -> TerrainUniforms {
        TerrainUniforms {
            transforms: self.transforms.block(),
            shadow_casters: self.shadow_casters.map(ShadowCasterBlock::from),
            tessellation: self.tessellation.block(),
            lighting: self.lighting.block(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainUniforms {
    pub transforms: TransformBlock,
    pub shadow_casters: [ShadowCasterBlock; MAX_SHADOW_CASTERS],
    pub tessellation: TessellationBlock,
    pub lighting: LightingBlock,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameParams;
    use crate::light::LightRig;
    use crate::pipeline::gpu_matrix;
    use crate::config::RendererConfig;
    use glam::{Mat4, Vec3};

    #[test]
    fn terrain_uniforms_carry_every_input() {
        let config = RendererConfig::default();
        let params = FrameParams::default();
        let rig = LightRig::standard(&params, &config);
        let world = Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0));
        let view = Mat4::look_at_lh(Vec3::new(0.0, 10.0, -10.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_lh(1.0, 1.5, 0.1, 200.0);

        let terrain = TerrainParams {
            transforms: Transforms::new(world, view, projection),
            shadow_casters: rig.shadow_caster_matrices(),
            tessellation: TessellationParams {
                factor: 0,
                height_scale: 15.0,
                texel_size: 1.0 / 256.0,
                uv_scale: 100.0,
            },
            lighting: LightingParams::from_rig(&rig, &params, Vec3::ZERO),
        };
        let u = terrain.uniforms();

        assert_eq!(u.transforms.world, gpu_matrix(world));
        assert_eq!(u.transforms.projection, gpu_matrix(projection));
        assert_eq!(u.shadow_casters[1].view, gpu_matrix(rig.shadow_caster_matrices()[1].view));
        assert_eq!(u.tessellation.factor, 1.0);
        assert_eq!(u.tessellation.height_scale, 15.0);
        assert_eq!(u.lighting.light_count, 3);
    }

    #[test]
    fn terrain_block_size_is_stable() {
        assert_eq!(std::mem::size_of::<TerrainUniforms>(), 192 + 256 + 16 + 352);
    }
}
