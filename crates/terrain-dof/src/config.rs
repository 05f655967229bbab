//! Renderer configuration
//!
//! Everything that is fixed for the lifetime of a [`Renderer`](crate::Renderer)
//! lives here: target sizes, projection planes, the directional light rig and
//! the texture names the pipelines bind. Values can be loaded from TOML; any
//! field left out falls back to its default.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

/// Renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Back buffer and offscreen target width in pixels
    pub width: u32,
    /// Back buffer and offscreen target height in pixels
    pub height: u32,
    /// Format of the host's back buffer
    #[serde(skip, default = "default_surface_format")]
    pub surface_format: wgpu::TextureFormat,
    /// Edge length of both (square) shadow maps
    pub shadow_map_size: u32,
    /// Grid resolution R of the tessellated plane
    pub plane_resolution: u32,
    /// World units of displacement for a height map value of 1.0
    pub height_scale: f32,
    pub screen_near: f32,
    pub screen_far: f32,
    /// Vertical field of view of the camera, in degrees
    pub field_of_view: f32,
    /// The directional light sits this far back along its direction from the scene centre
    pub directional_distance: f32,
    pub scene_center: [f32; 3],
    /// Width and height of the directional light's orthographic volume
    pub directional_extent: [f32; 2],
    pub directional_near: f32,
    pub directional_far: f32,
    pub spot_near: f32,
    pub spot_far: f32,
    /// Field of view of the spot light's shadow projection, in degrees
    pub spot_fov: f32,
    /// Clear colour of the scene pass
    pub sky_color: [f32; 4],
    /// Library name of the texture that displaces the plane
    pub height_map: String,
    /// Library name of the texture on the cube and light markers
    pub surface_texture: String,
    /// Draws each uniform arena holds before it has to grow
    pub uniform_arena_capacity: u32,
}

fn default_surface_format() -> wgpu::TextureFormat {
    wgpu::TextureFormat::Bgra8UnormSrgb
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            surface_format: default_surface_format(),
            shadow_map_size: 8192,
            plane_resolution: 100,
            height_scale: 15.0,
            screen_near: 0.1,
            screen_far: 200.0,
            field_of_view: 45.0,
            directional_distance: 100.0,
            scene_center: [50.0, 0.0, 50.0],
            directional_extent: [150.0, 150.0],
            directional_near: 0.1,
            directional_far: 250.0,
            spot_near: 0.1,
            spot_far: 200.0,
            spot_fov: 90.0,
            sky_color: [0.39, 0.58, 0.92, 1.0],
            height_map: "heightMap".to_string(),
            surface_texture: "brick".to_string(),
            uniform_arena_capacity: 16,
        }
    }
}

impl RendererConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        log::info!("Loading renderer config from {}", path.display());
        Self::from_toml_str(&source)
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_surface_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.surface_format = format;
        self
    }

    /// Width over height of the back buffer
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Reject values that would produce empty targets or degenerate projections
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config(format!(
                "screen size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.shadow_map_size == 0 {
            return Err(Error::Config("shadow_map_size must be non-zero".into()));
        }
        if self.plane_resolution < 2 {
            return Err(Error::Config(format!(
                "plane_resolution must be at least 2, got {}",
                self.plane_resolution
            )));
        }
        for (name, near, far) in [
            ("screen", self.screen_near, self.screen_far),
            ("directional", self.directional_near, self.directional_far),
            ("spot", self.spot_near, self.spot_far),
        ] {
            if !(near > 0.0 && far > near) {
                return Err(Error::Config(format!(
                    "{} clip planes must satisfy 0 < near < far, got {} / {}",
                    name, near, far
                )));
            }
        }
        if !(self.spot_fov > 0.0 && self.spot_fov < 180.0) {
            return Err(Error::Config(format!(
                "spot_fov must lie in (0, 180) degrees, got {}",
                self.spot_fov
            )));
        }
        if self.uniform_arena_capacity == 0 {
            return Err(Error::Config("uniform_arena_capacity must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_scene() {
        let config = RendererConfig::default();
        assert_eq!(config.shadow_map_size, 8192);
        assert_eq!(config.plane_resolution, 100);
        assert_eq!(config.sky_color, [0.39, 0.58, 0.92, 1.0]);
        assert_eq!(config.spot_far, 200.0);
        assert_eq!(config.spot_fov, 90.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = RendererConfig::from_toml_str(
            r#"
            width = 800
            height = 600
            shadow_map_size = 2048
            height_map = "dunes"
            "#,
        )
        .unwrap();

        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.shadow_map_size, 2048);
        assert_eq!(config.height_map, "dunes");
        assert_eq!(config.surface_texture, "brick");
        assert_eq!(config.surface_format, wgpu::TextureFormat::Bgra8UnormSrgb);
    }

    #[test]
    fn rejects_inverted_clip_planes() {
        let err = RendererConfig::from_toml_str("spot_near = 10.0\nspot_far = 1.0").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_a_flat_spot_frustum() {
        let err = RendererConfig::from_toml_str("spot_fov = 180.0").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = RendererConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RendererConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
