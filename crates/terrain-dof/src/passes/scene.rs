//! Scene pass - the lit, shadowed terrain, the light markers and the cube

use glam::Mat4;

use crate::graph::{FrameContext, Geometry, PassRecorder, PassResourceBuilder, RenderPass, TargetId};
use crate::light::LightKind;
use crate::mesh::MeshId;
use crate::pipeline::{BasicParams, DrawParams, TerrainParams};
use crate::Result;

pub struct ScenePass;

impl ScenePass {
    fn basic(frame: &FrameContext<'_>, world: Mat4) -> DrawParams {
        DrawParams::Basic(BasicParams {
            transforms: frame.camera_transforms(world),
            shadow_casters: frame.shadow_casters(),
            lighting: frame.lighting(),
        })
    }

    /// Marker sphere of `kind`, drawn only while that light is active
    fn marker(
        frame: &FrameContext<'_>,
        recorder: &mut PassRecorder,
        kind: LightKind,
        mesh: MeshId,
    ) -> Result<()> {
        let Some(entry) = frame.lights.get(kind).filter(|e| e.active) else {
            return Ok(());
        };
        let world = Mat4::from_translation(entry.light.position());
        recorder.draw(Geometry::Mesh(mesh), Self::basic(frame, world))
    }
}

impl RenderPass for ScenePass {
    fn name(&self) -> &str {
        "scene"
    }

    fn declare_resources(&self, builder: &mut PassResourceBuilder) {
        builder
            .read(TargetId::ShadowMap(0))
            .read(TargetId::ShadowMap(1))
            .write(TargetId::Screen)
            .after("camera_depth");
    }

    fn clear_color(&self, frame: &FrameContext<'_>) -> Option<[f32; 4]> {
        Some(frame.config.sky_color)
    }

    fn record(&self, frame: &FrameContext<'_>, recorder: &mut PassRecorder) -> Result<()> {
        recorder.draw(
            Geometry::Surface,
            DrawParams::Terrain(TerrainParams {
                transforms: frame.camera_transforms(Mat4::IDENTITY),
                shadow_casters: frame.shadow_casters(),
                tessellation: frame.tessellation(),
                lighting: frame.lighting(),
            }),
        )?;

        Self::marker(frame, recorder, LightKind::Point, MeshId::PointMarker)?;
        Self::marker(frame, recorder, LightKind::Spot, MeshId::SpotMarker)?;

        recorder.draw(Geometry::Mesh(MeshId::Cube), Self::basic(frame, frame.object_world()))
    }
}
