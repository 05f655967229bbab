//! Frame planning
//!
//! Turns the frame parameters and the camera into the recorded passes of a
//! frame. Planning touches no GPU state, so everything the frame will draw can
//! be inspected (and tested) before any command is encoded.

use crate::camera::{CameraMatrices, CameraSource};
use crate::config::RendererConfig;
use crate::frame::FrameParams;
use crate::graph::{FrameContext, PassRecording, RenderGraph};
use crate::light::LightRig;
use crate::passes::standard_graph;
use crate::Result;

pub struct FramePlanner {
    config: RendererConfig,
    graph: RenderGraph,
    lights: LightRig,
    height_map_texel: f32,
}

impl FramePlanner {
    /// Validate `config` and build the standard pass graph
    ///
    /// `height_map_texel` is one texel of the height map in UV units.
    pub fn new(config: RendererConfig, height_map_texel: f32) -> Result<Self> {
        config.validate()?;
        let graph = standard_graph()?;
        let lights = LightRig::standard(&FrameParams::default(), &config);
        Ok(Self {
            config,
            graph,
            lights,
            height_map_texel,
        })
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn graph(&self) -> &RenderGraph {
        &self.graph
    }

    /// Lights as of the last planned frame
    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    /// Camera projection for the configured screen
    pub fn projection(&self) -> glam::Mat4 {
        CameraMatrices::perspective(
            self.config.field_of_view,
            self.config.aspect_ratio(),
            self.config.screen_near,
            self.config.screen_far,
        )
    }

    /// Apply `params` to the lights and record every pass of the frame
    pub fn plan(&mut self, params: &FrameParams, camera: &dyn CameraSource) -> Result<Vec<PassRecording>> {
        self.lights.apply(params, &self.config);
        let frame = FrameContext {
            config: &self.config,
            params,
            lights: &self.lights,
            camera: CameraMatrices::capture(camera, self.projection()),
            height_map_texel: self.height_map_texel,
        };
        self.graph.record(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::FlyCamera;
    use crate::graph::TargetId;

    #[test]
    fn invalid_config_is_rejected() {
        let config = RendererConfig::default().with_size(0, 720);
        assert!(FramePlanner::new(config, 1.0 / 256.0).is_err());
    }

    #[test]
    fn every_pass_is_recorded_once_per_frame() {
        let mut planner = FramePlanner::new(RendererConfig::default(), 1.0 / 256.0).unwrap();
        let plan = planner.plan(&FrameParams::default(), &FlyCamera::default()).unwrap();
        assert_eq!(plan.len(), 6);
        assert_eq!(plan.last().map(|r| r.target), Some(TargetId::BackBuffer));
    }

    #[test]
    fn planning_moves_the_lights() {
        let mut planner = FramePlanner::new(RendererConfig::default(), 1.0 / 256.0).unwrap();
        let mut params = FrameParams::default();
        params.spot.position = glam::Vec3::new(10.0, 20.0, 30.0);
        planner.plan(&params, &FlyCamera::default()).unwrap();

        let spot = planner.lights().get(crate::light::LightKind::Spot).unwrap();
        assert_eq!(spot.light.position(), params.spot.position);
    }
}
