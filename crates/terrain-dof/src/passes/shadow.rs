//! Shadow pass - renders the plane and the cube into one shadow map
//!
//! Depth only: the pipelines are built without a fragment stage and the
//! target has no colour attachment.

use crate::graph::{FrameContext, Geometry, PassRecorder, PassResourceBuilder, RenderPass, TargetId};
use crate::light::LightKind;
use crate::mesh::MeshId;
use crate::pipeline::{DepthParams, DepthTessellationParams, DrawParams, Transforms};
use crate::Result;

pub struct ShadowPass {
    kind: LightKind,
    slot: usize,
    name: String,
}

impl ShadowPass {
    /// Shadow map `slot`, rendered from the rig's first light of `kind`
    pub fn new(kind: LightKind, slot: usize) -> Self {
        Self {
            kind,
            slot,
            name: format!("shadow_{}", kind.name()),
        }
    }
}

impl RenderPass for ShadowPass {
    fn name(&self) -> &str {
        &self.name
    }

    fn declare_resources(&self, builder: &mut PassResourceBuilder) {
        builder.write(TargetId::ShadowMap(self.slot));
    }

    fn record(&self, frame: &FrameContext<'_>, recorder: &mut PassRecorder) -> Result<()> {
        let Some(entry) = frame.lights.get(self.kind) else {
            log::warn!("No {} light in the rig, shadow map {} stays clear", self.kind.name(), self.slot);
            return Ok(());
        };
        let caster = entry.shadow_caster();
        let from_light = |world| Transforms::new(world, caster.view, caster.projection);

        recorder.draw(
            Geometry::Surface,
            DrawParams::DepthTessellated(DepthTessellationParams {
                transforms: from_light(glam::Mat4::IDENTITY),
                tessellation: frame.tessellation(),
            }),
        )?;
        recorder.draw(
            Geometry::Mesh(MeshId::Cube),
            DrawParams::Depth(DepthParams {
                transforms: from_light(frame.object_world()),
            }),
        )?;
        Ok(())
    }
}
