//! Recorded pass contents
//!
//! Passes never touch wgpu directly. They describe what to draw into a
//! [`PassRecorder`] and the frame encoder replays the recordings.

use crate::mesh::MeshId;
use crate::pipeline::{DrawParams, PipelineKind, RasterState};
use crate::{Error, Result};

use super::TargetId;

/// What a draw rasterizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Geometry {
    /// The tessellated plane
    Surface,
    Mesh(MeshId),
}

/// One draw call
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub geometry: Geometry,
    pub raster: RasterState,
    pub params: DrawParams,
}

impl DrawItem {
    pub fn kind(&self) -> PipelineKind {
        self.params.kind()
    }
}

/// Everything one pass drew this frame
#[derive(Debug, Clone, PartialEq)]
pub struct PassRecording {
    pub pass: String,
    pub target: TargetId,
    /// Colour the target is cleared to; depth is always cleared to 1.0
    pub clear_color: Option<[f32; 4]>,
    pub draws: Vec<DrawItem>,
}

impl PassRecording {
    /// Draws that go through `kind`
    pub fn draws_of(&self, kind: PipelineKind) -> impl Iterator<Item = &DrawItem> {
        self.draws.iter().filter(move |d| d.kind() == kind)
    }

    /// Draws of `geometry`
    pub fn draws_with(&self, geometry: Geometry) -> impl Iterator<Item = &DrawItem> {
        self.draws.iter().filter(move |d| d.geometry == geometry)
    }
}

/// Collects the recordings of a frame in execution order
///
/// Raster state persists between draws of a pass, like the fixed-function
/// state of an immediate context, and is reset at the start of every pass.
#[derive(Debug, Default)]
pub struct PassRecorder {
    recordings: Vec<PassRecording>,
    raster: RasterState,
}

impl PassRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start recording a pass
    pub fn begin(&mut self, pass: &str, target: TargetId, clear_color: Option<[f32; 4]>) {
        log::trace!("Recording pass {} into {:?}", pass, target);
        self.raster = RasterState::default();
        self.recordings.push(PassRecording {
            pass: pass.to_string(),
            target,
            clear_color,
            draws: Vec::new(),
        });
    }

    pub fn set_depth_test(&mut self, enabled: bool) {
        self.raster.set(RasterState::DEPTH_TEST, enabled);
    }

    pub fn set_wireframe(&mut self, enabled: bool) {
        self.raster.set(RasterState::WIREFRAME, enabled);
    }

    pub fn raster(&self) -> RasterState {
        self.raster
    }

    /// Append a draw to the current pass with the current raster state
    pub fn draw(&mut self, geometry: Geometry, params: DrawParams) -> Result<()> {
        let raster = self.raster;
        let recording = self
            .recordings
            .last_mut()
            .ok_or_else(|| Error::Graph("draw recorded outside of a pass".to_string()))?;
        recording.draws.push(DrawItem {
            geometry,
            raster,
            params,
        });
        Ok(())
    }

    /// The pass currently being recorded
    pub fn current(&self) -> Option<&PassRecording> {
        self.recordings.last()
    }

    pub fn finish(self) -> Vec<PassRecording> {
        self.recordings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{DepthParams, Transforms};
    use glam::Mat4;

    fn cube_depth() -> DrawParams {
        DrawParams::Depth(DepthParams {
            transforms: Transforms::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY),
        })
    }

    #[test]
    fn draws_outside_a_pass_are_rejected() {
        let mut recorder = PassRecorder::new();
        assert!(recorder.draw(Geometry::Mesh(MeshId::Cube), cube_depth()).is_err());
    }

    #[test]
    fn raster_state_sticks_until_the_next_pass() {
        let mut recorder = PassRecorder::new();
        recorder.begin("first", TargetId::Screen, None);
        recorder.set_depth_test(false);
        recorder.draw(Geometry::Mesh(MeshId::Cube), cube_depth()).unwrap();
        recorder.draw(Geometry::Mesh(MeshId::Cube), cube_depth()).unwrap();
        recorder.begin("second", TargetId::Blur, Some([0.0, 0.0, 0.0, 1.0]));
        recorder.draw(Geometry::Mesh(MeshId::Cube), cube_depth()).unwrap();

        let recordings = recorder.finish();
        assert!(recordings[0].draws.iter().all(|d| d.raster.is_empty()));
        assert_eq!(recordings[1].draws[0].raster, RasterState::DEPTH_TEST);
        assert_eq!(recordings[1].clear_color, Some([0.0, 0.0, 0.0, 1.0]));
    }
}
