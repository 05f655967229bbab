//! Lit, textured mesh pipeline for the cube and the light markers

use super::lighting::{LightingBlock, LightingParams, ShadowCasterBlock};
use super::{TransformBlock, Transforms};
use crate::light::{ShadowCaster, MAX_SHADOW_CASTERS};

#[derive(Debug, Clone, PartialEq)]
pub struct BasicParams {
    pub transforms: Transforms,
    pub shadow_casters: [ShadowCaster; MAX_SHADOW_CASTERS],
    pub lighting: LightingParams,
}

impl BasicParams {
    pub fn uniforms(&self) -> BasicUniforms {
        BasicUniforms {
            transforms: self.transforms.block(),
            shadow_casters: self.shadow_casters.map(ShadowCasterBlock::from),
            lighting: self.lighting.block(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BasicUniforms {
    pub transforms: TransformBlock,
    pub shadow_casters: [ShadowCasterBlock; MAX_SHADOW_CASTERS],
    pub lighting: LightingBlock,
}
