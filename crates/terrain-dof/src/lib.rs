//! Terrain DoF - a tessellated height-map terrain renderer built on wgpu
//!
//! A single plane is displaced from a height map, lit by a directional, a
//! point and a spot light, shadowed through two shadow maps and finally
//! composited with a blur-based depth-of-field effect.
//!
//! - Passes declare the targets they read and write; the render graph orders
//!   them and rejects a pass that samples its own output
//! - Passes record plain draw lists, which the frame encoder turns into wgpu
//!   commands in one encoder per frame
//! - Every pipeline takes a typed parameter struct that converts into the
//!   exact uniform block it uploads
//! - Hull/domain tessellation is emulated in the vertex stage by pulling the
//!   patch control points from storage buffers

pub mod config;
pub mod light;
pub mod frame;
pub mod camera;
pub mod mesh;
pub mod surface;
pub mod texture;
pub mod target;
pub mod pipeline;
pub mod graph;
pub mod passes;
pub mod overlay;
pub mod planner;

mod encoder;
mod renderer;

pub use camera::{CameraMatrices, CameraSource, FlyCamera};
pub use config::RendererConfig;
pub use frame::{DepthOfFieldSettings, FrameParams, LightParams};
pub use light::{Light, LightKind, LightRig};
pub use overlay::Overlay;
pub use planner::FramePlanner;
pub use renderer::Renderer;
pub use surface::TessellatedPlane;
pub use texture::TextureLibrary;

/// Result type for renderer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up or driving the renderer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Resource error: {0}")]
    Resource(String),

    #[error("Texture error: {0}")]
    Texture(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("WGPU error: {0}")]
    Wgpu(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<wgpu::Error> for Error {
    fn from(err: wgpu::Error) -> Self {
        Error::Wgpu(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Texture(err.to_string())
    }
}
