//! Shading pipelines
//!
//! Each pipeline has a parameter struct that converts into the exact uniform
//! block its shader reads. Draws carry those parameters in [`DrawParams`];
//! the frame encoder stages them into per-pipeline uniform arenas and binds
//! the right offset for every draw.
//!
//! All matrices go through [`gpu_matrix`] before upload and shaders multiply
//! row vectors (`v * M`).

mod arena;
mod basic;
mod blur;
mod cache;
mod depth;
mod dof;
mod layouts;
mod lighting;
mod terrain;

pub use arena::{UniformArena, UniformArenas};
pub use basic::{BasicParams, BasicUniforms};
pub use blur::{BlurParams, BlurUniforms, BLUR_WEIGHTS};
pub use cache::PipelineCache;
pub use depth::{DepthParams, DepthTessellationParams, DepthTessellationUniforms, DepthUniforms};
pub use dof::{DepthOfFieldParams, DepthOfFieldUniforms};
pub use layouts::{height_map_address_mode, PipelineLayouts, TextureBindings, TextureSources};
pub use lighting::{GpuLight, LightingBlock, LightingParams, ShadowCasterBlock, MAX_LIGHTS};
pub use terrain::{TerrainParams, TerrainUniforms, TessellationBlock, TessellationParams};

use bitflags::bitflags;
use glam::Mat4;

use crate::graph::TargetId;

/// Convert a matrix into the layout the shaders expect
///
/// Shaders treat positions as row vectors, so every matrix is transposed on
/// the way to the GPU.
pub fn gpu_matrix(m: Mat4) -> [[f32; 4]; 4] {
    m.transpose().to_cols_array_2d()
}

/// The six shading pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Height tessellation with lighting and shadows
    Terrain,
    /// Height tessellation writing depth only
    DepthTessellated,
    /// Plain mesh writing depth only
    Depth,
    /// Lit, textured mesh
    Basic,
    /// Combined horizontal and vertical gaussian blur
    Blur,
    /// Depth-of-field composite
    DepthOfField,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 6] = [
        PipelineKind::Terrain,
        PipelineKind::DepthTessellated,
        PipelineKind::Depth,
        PipelineKind::Basic,
        PipelineKind::Blur,
        PipelineKind::DepthOfField,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PipelineKind::Terrain => "terrain",
            PipelineKind::DepthTessellated => "depth_tessellated",
            PipelineKind::Depth => "depth",
            PipelineKind::Basic => "basic",
            PipelineKind::Blur => "blur",
            PipelineKind::DepthOfField => "depth_of_field",
        }
    }

    /// Whether the pipeline draws the patch grid instead of a vertex buffer
    pub fn is_tessellated(self) -> bool {
        matches!(self, PipelineKind::Terrain | PipelineKind::DepthTessellated)
    }

    /// Whether the pipeline may render without a colour attachment
    pub fn is_depth_only_capable(self) -> bool {
        matches!(self, PipelineKind::DepthTessellated | PipelineKind::Depth)
    }

    /// Offscreen targets the pipeline's texture bind group samples
    pub fn sampled_targets(self) -> &'static [TargetId] {
        const SHADOWS: &[TargetId] = &[TargetId::ShadowMap(0), TargetId::ShadowMap(1)];
        match self {
            PipelineKind::Terrain | PipelineKind::Basic => SHADOWS,
            PipelineKind::DepthTessellated | PipelineKind::Depth => &[],
            PipelineKind::Blur => &[TargetId::Screen],
            PipelineKind::DepthOfField => &[TargetId::Screen, TargetId::Blur, TargetId::CameraDepth],
        }
    }

    /// Size of the per-draw uniform block
    pub fn uniform_size(self) -> u64 {
        let size = match self {
            PipelineKind::Terrain => std::mem::size_of::<TerrainUniforms>(),
            PipelineKind::DepthTessellated => std::mem::size_of::<DepthTessellationUniforms>(),
            PipelineKind::Depth => std::mem::size_of::<DepthUniforms>(),
            PipelineKind::Basic => std::mem::size_of::<BasicUniforms>(),
            PipelineKind::Blur => std::mem::size_of::<BlurUniforms>(),
            PipelineKind::DepthOfField => std::mem::size_of::<DepthOfFieldUniforms>(),
        };
        size as u64
    }

    /// WGSL source: shared declarations followed by the pipeline's own module
    pub fn shader_source(self) -> String {
        const COMMON: &str = include_str!("../../shaders/common/types.wgsl");
        const LIGHTING: &str = include_str!("../../shaders/common/lighting.wgsl");
        const PATCHES: &str = include_str!("../../shaders/common/patches.wgsl");

        let parts: &[&str] = match self {
            PipelineKind::Terrain => &[
                COMMON,
                LIGHTING,
                PATCHES,
                include_str!("../../shaders/passes/terrain.wgsl"),
            ],
            PipelineKind::DepthTessellated => &[
                COMMON,
                PATCHES,
                include_str!("../../shaders/passes/depth_tessellated.wgsl"),
            ],
            PipelineKind::Depth => &[COMMON, include_str!("../../shaders/passes/depth.wgsl")],
            PipelineKind::Basic => &[
                COMMON,
                LIGHTING,
                include_str!("../../shaders/passes/basic.wgsl"),
            ],
            PipelineKind::Blur => &[COMMON, include_str!("../../shaders/passes/blur.wgsl")],
            PipelineKind::DepthOfField => &[
                COMMON,
                include_str!("../../shaders/passes/depth_of_field.wgsl"),
            ],
        };
        parts.join("\n")
    }
}

bitflags! {
    /// Fixed-function state a draw asks for
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RasterState: u32 {
        /// Test against and write the depth buffer
        const DEPTH_TEST = 1 << 0;
        /// Rasterize triangle edges only
        const WIREFRAME  = 1 << 1;
    }
}

impl Default for RasterState {
    fn default() -> Self {
        RasterState::DEPTH_TEST
    }
}

/// Key for pipeline cache lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub kind: PipelineKind,
    pub raster: RasterState,
    /// `None` builds a depth-only pipeline with no fragment stage
    pub color_format: Option<wgpu::TextureFormat>,
}

/// World, view and projection of one draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Transforms {
    pub fn new(world: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self { world, view, projection }
    }

    pub fn block(&self) -> TransformBlock {
        TransformBlock {
            world: gpu_matrix(self.world),
            view: gpu_matrix(self.view),
            projection: gpu_matrix(self.projection),
        }
    }
}

/// Transposed world/view/projection as uploaded (192 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformBlock {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

/// Parameters of one draw, tagged by the pipeline that consumes them
#[derive(Debug, Clone, PartialEq)]
pub enum DrawParams {
    Terrain(TerrainParams),
    DepthTessellated(DepthTessellationParams),
    Depth(DepthParams),
    Basic(BasicParams),
    Blur(BlurParams),
    DepthOfField(DepthOfFieldParams),
}

impl DrawParams {
    pub fn kind(&self) -> PipelineKind {
        match self {
            DrawParams::Terrain(_) => PipelineKind::Terrain,
            DrawParams::DepthTessellated(_) => PipelineKind::DepthTessellated,
            DrawParams::Depth(_) => PipelineKind::Depth,
            DrawParams::Basic(_) => PipelineKind::Basic,
            DrawParams::Blur(_) => PipelineKind::Blur,
            DrawParams::DepthOfField(_) => PipelineKind::DepthOfField,
        }
    }

    pub fn transforms(&self) -> &Transforms {
        match self {
            DrawParams::Terrain(p) => &p.transforms,
            DrawParams::DepthTessellated(p) => &p.transforms,
            DrawParams::Depth(p) => &p.transforms,
            DrawParams::Basic(p) => &p.transforms,
            DrawParams::Blur(p) => &p.transforms,
            DrawParams::DepthOfField(p) => &p.transforms,
        }
    }

    /// Tessellation factor for patch draws
    pub fn tessellation_factor(&self) -> Option<u32> {
        match self {
            DrawParams::Terrain(p) => Some(p.tessellation.factor),
            DrawParams::DepthTessellated(p) => Some(p.tessellation.factor),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    #[test]
    fn transposing_twice_is_identity() {
        let m = Mat4::from_cols_array(&[
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0,
        ]);
        assert_eq!(m.transpose().transpose(), m);

        let uploaded = Mat4::from_cols_array_2d(&gpu_matrix(m));
        assert_eq!(uploaded.transpose(), m);
    }

    #[test]
    fn uploaded_matrix_multiplies_row_vectors() {
        let m = Mat4::from_translation(Vec3::new(3.0, -2.0, 7.0))
            * Mat4::from_scale(Vec3::new(2.0, 2.0, 2.0));
        let v = Vec4::new(1.0, 1.0, 1.0, 1.0);

        // the shader reads the uploaded columns as its matrix and computes v * M
        let shader_m = Mat4::from_cols_array_2d(&gpu_matrix(m));
        let row_times = Vec4::new(
            v.dot(shader_m.x_axis),
            v.dot(shader_m.y_axis),
            v.dot(shader_m.z_axis),
            v.dot(shader_m.w_axis),
        );
        assert_eq!(row_times, m * v);
    }

    #[test]
    fn uniform_blocks_respect_wgsl_alignment() {
        for kind in PipelineKind::ALL {
            assert_eq!(kind.uniform_size() % 16, 0, "{:?}", kind);
        }
    }

    #[test]
    fn screen_space_pipelines_sample_offscreen_targets() {
        assert!(PipelineKind::Blur.sampled_targets().contains(&TargetId::Screen));
        assert_eq!(PipelineKind::DepthOfField.sampled_targets().len(), 3);
        assert!(PipelineKind::Depth.sampled_targets().is_empty());
    }

    #[test]
    fn shader_sources_compose_shared_declarations() {
        let terrain = PipelineKind::Terrain.shader_source();
        assert!(terrain.contains("struct TransformBlock"));
        assert!(terrain.contains("fn vs_main"));
        assert!(!PipelineKind::Blur.shader_source().contains("fn patch_point"));
    }
}
