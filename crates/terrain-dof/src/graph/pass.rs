//! Render pass trait and the per-frame context passes record from

use glam::Mat4;

use super::{PassRecorder, PassResourceBuilder};
use crate::camera::CameraMatrices;
use crate::config::RendererConfig;
use crate::frame::FrameParams;
use crate::light::{LightRig, ShadowCaster, MAX_SHADOW_CASTERS};
use crate::pipeline::{LightingParams, TessellationParams, Transforms};
use crate::target::ortho_for;
use crate::Result;

/// Render pass trait - implemented by all rendering passes
pub trait RenderPass: Send + Sync {
    /// Unique name for this pass
    fn name(&self) -> &str;

    /// Declare resource dependencies
    ///
    /// Called once during graph building to determine pass ordering.
    /// Every pass writes exactly one target and may read any number of
    /// targets written by other passes.
    fn declare_resources(&self, builder: &mut PassResourceBuilder);

    /// Colour the pass clears its target to; `None` clears depth only
    fn clear_color(&self, _frame: &FrameContext<'_>) -> Option<[f32; 4]> {
        None
    }

    /// Record this frame's draws
    ///
    /// Called every frame in execution order, after the graph has begun the
    /// pass's recording.
    fn record(&self, frame: &FrameContext<'_>, recorder: &mut PassRecorder) -> Result<()>;
}

/// Read-only state of the frame being planned
pub struct FrameContext<'a> {
    pub config: &'a RendererConfig,
    pub params: &'a FrameParams,
    /// Lights after this frame's parameters were applied
    pub lights: &'a LightRig,
    pub camera: CameraMatrices,
    /// One height map texel in UV units
    pub height_map_texel: f32,
}

impl FrameContext<'_> {
    /// How the plane is subdivided and displaced this frame
    pub fn tessellation(&self) -> TessellationParams {
        TessellationParams {
            factor: self.params.effective_tessellation(),
            height_scale: self.config.height_scale,
            texel_size: self.height_map_texel,
            uv_scale: self.config.plane_resolution as f32,
        }
    }

    pub fn lighting(&self) -> LightingParams {
        LightingParams::from_rig(self.lights, self.params, self.camera.position)
    }

    pub fn shadow_casters(&self) -> [ShadowCaster; MAX_SHADOW_CASTERS] {
        self.lights.shadow_caster_matrices()
    }

    /// `world` seen through the camera
    pub fn camera_transforms(&self, world: Mat4) -> Transforms {
        Transforms::new(world, self.camera.view, self.camera.projection)
    }

    /// Transforms of the pixel-sized screen quad
    pub fn screen_transforms(&self) -> Transforms {
        Transforms::new(
            Mat4::IDENTITY,
            self.camera.ortho_view,
            ortho_for(
                self.config.width,
                self.config.height,
                self.config.screen_near,
                self.config.screen_far,
            ),
        )
    }

    /// World matrix of the cube
    pub fn object_world(&self) -> Mat4 {
        Mat4::from_translation(self.params.object_position)
    }
}
