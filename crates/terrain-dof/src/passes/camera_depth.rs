//! Camera depth pass - the scene's `z / w` from the camera, sampled by the
//! depth-of-field composite

use glam::Mat4;

use crate::graph::{FrameContext, Geometry, PassRecorder, PassResourceBuilder, RenderPass, TargetId};
use crate::mesh::MeshId;
use crate::pipeline::{DepthParams, DepthTessellationParams, DrawParams};
use crate::Result;

/// Stored depth of pixels nothing covers: the far plane
const FAR_DEPTH: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

pub struct CameraDepthPass;

impl RenderPass for CameraDepthPass {
    fn name(&self) -> &str {
        "camera_depth"
    }

    fn declare_resources(&self, builder: &mut PassResourceBuilder) {
        builder.write(TargetId::CameraDepth);
    }

    fn clear_color(&self, _frame: &FrameContext<'_>) -> Option<[f32; 4]> {
        Some(FAR_DEPTH)
    }

    fn record(&self, frame: &FrameContext<'_>, recorder: &mut PassRecorder) -> Result<()> {
        recorder.draw(
            Geometry::Surface,
            DrawParams::DepthTessellated(DepthTessellationParams {
                transforms: frame.camera_transforms(Mat4::IDENTITY),
                tessellation: frame.tessellation(),
            }),
        )?;
        recorder.draw(
            Geometry::Mesh(MeshId::Cube),
            DrawParams::Depth(DepthParams {
                transforms: frame.camera_transforms(frame.object_world()),
            }),
        )
    }
}
