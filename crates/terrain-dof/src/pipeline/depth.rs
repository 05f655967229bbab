//! Depth pipelines, tessellated and plain
//!
//! Built without a fragment stage for shadow maps, or writing `z / w` as
//! colour when the target has a colour attachment (the camera depth target).

use super::terrain::{TessellationBlock, TessellationParams};
use super::{TransformBlock, Transforms};

#[derive(Debug, Clone, PartialEq)]
pub struct DepthTessellationParams {
    pub transforms: Transforms,
    pub tessellation: TessellationParams,
}

impl DepthTessellationParams {
    pub fn uniforms(&self) -> DepthTessellationUniforms {
        DepthTessellationUniforms {
            transforms: self.transforms.block(),
            tessellation: self.tessellation.block(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DepthTessellationUniforms {
    pub transforms: TransformBlock,
    pub tessellation: TessellationBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepthParams {
    pub transforms: Transforms,
}

impl DepthParams {
    pub fn uniforms(&self) -> DepthUniforms {
        DepthUniforms {
            transforms: self.transforms.block(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DepthUniforms {
    pub transforms: TransformBlock,
}
