//! Composite pass - depth-of-field into the back buffer
//!
//! With wireframe on, the terrain is drawn once more as lines before the
//! composite quad. Line rasterization then stays on for the rest of the pass.

use glam::Mat4;

use crate::graph::{FrameContext, Geometry, PassRecorder, PassResourceBuilder, RenderPass, TargetId};
use crate::mesh::MeshId;
use crate::pipeline::{DepthOfFieldParams, DrawParams, TerrainParams};
use crate::Result;

pub struct CompositePass;

impl RenderPass for CompositePass {
    fn name(&self) -> &str {
        "composite"
    }

    fn declare_resources(&self, builder: &mut PassResourceBuilder) {
        builder
            .read(TargetId::Screen)
            .read(TargetId::Blur)
            .read(TargetId::CameraDepth)
            // the wireframe terrain is lit and shadowed too
            .read(TargetId::ShadowMap(0))
            .read(TargetId::ShadowMap(1))
            .write(TargetId::BackBuffer);
    }

    fn clear_color(&self, frame: &FrameContext<'_>) -> Option<[f32; 4]> {
        Some(frame.config.sky_color)
    }

    fn record(&self, frame: &FrameContext<'_>, recorder: &mut PassRecorder) -> Result<()> {
        if frame.params.wireframe {
            recorder.set_wireframe(true);
            recorder.draw(
                Geometry::Surface,
                DrawParams::Terrain(TerrainParams {
                    transforms: frame.camera_transforms(Mat4::IDENTITY),
                    shadow_casters: frame.shadow_casters(),
                    tessellation: frame.tessellation(),
                    lighting: frame.lighting(),
                }),
            )?;
        }

        recorder.set_depth_test(false);
        recorder.draw(
            Geometry::Mesh(MeshId::ScreenQuad),
            DrawParams::DepthOfField(DepthOfFieldParams {
                transforms: frame.screen_transforms(),
                settings: frame.params.depth_of_field,
                near: frame.config.screen_near,
                far: frame.config.screen_far,
            }),
        )?;
        recorder.set_depth_test(true);
        Ok(())
    }
}
