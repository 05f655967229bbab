//! Built-in render passes

pub mod blur;
pub mod camera_depth;
pub mod composite;
pub mod scene;
pub mod shadow;

pub use blur::BlurPass;
pub use camera_depth::CameraDepthPass;
pub use composite::CompositePass;
pub use scene::ScenePass;
pub use shadow::ShadowPass;

use crate::graph::RenderGraph;
use crate::light::LightKind;
use crate::Result;

/// The frame's passes: both shadow maps, camera depth, scene, blur and the
/// depth-of-field composite
pub fn standard_graph() -> Result<RenderGraph> {
    let mut graph = RenderGraph::new();
    graph.add_pass(ShadowPass::new(LightKind::Directional, 0));
    graph.add_pass(ShadowPass::new(LightKind::Spot, 1));
    graph.add_pass(CameraDepthPass);
    graph.add_pass(ScenePass);
    graph.add_pass(BlurPass);
    graph.add_pass(CompositePass);
    graph.build()?;
    Ok(graph)
}
