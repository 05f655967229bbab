//! Blur pass - one full-screen quad sampling the screen target

use crate::graph::{FrameContext, Geometry, PassRecorder, PassResourceBuilder, RenderPass, TargetId};
use crate::mesh::MeshId;
use crate::pipeline::{BlurParams, DrawParams};
use crate::Result;

pub struct BlurPass;

impl RenderPass for BlurPass {
    fn name(&self) -> &str {
        "blur"
    }

    fn declare_resources(&self, builder: &mut PassResourceBuilder) {
        builder.read(TargetId::Screen).write(TargetId::Blur);
    }

    fn clear_color(&self, _frame: &FrameContext<'_>) -> Option<[f32; 4]> {
        Some([0.0, 0.0, 0.0, 1.0])
    }

    fn record(&self, frame: &FrameContext<'_>, recorder: &mut PassRecorder) -> Result<()> {
        recorder.set_depth_test(false);
        recorder.draw(
            Geometry::Mesh(MeshId::ScreenQuad),
            DrawParams::Blur(BlurParams {
                transforms: frame.screen_transforms(),
                screen_width: frame.config.width as f32,
                screen_height: frame.config.height as f32,
            }),
        )?;
        recorder.set_depth_test(true);
        Ok(())
    }
}
