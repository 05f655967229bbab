//! Lights and the light rig
//!
//! A [`Light`] carries colours and placement plus the matrices derived from
//! them. The [`LightRig`] owns the three lights of the scene in a fixed order
//! and hands out shadow slots to the kinds that cast shadows.

use glam::{Mat4, Vec3, Vec4};

use crate::config::RendererConfig;
use crate::frame::FrameParams;

/// Number of shadow maps the pipelines sample
pub const MAX_SHADOW_CASTERS: usize = 2;

/// What kind of light an entry of the rig is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

impl LightKind {
    /// Whether lights of this kind render a shadow map
    pub fn casts_shadow(self) -> bool {
        matches!(self, LightKind::Directional | LightKind::Spot)
    }

    /// Discriminant shared with the shaders
    pub fn gpu_id(self) -> u32 {
        match self {
            LightKind::Directional => 0,
            LightKind::Point => 1,
            LightKind::Spot => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LightKind::Directional => "directional",
            LightKind::Point => "point",
            LightKind::Spot => "spot",
        }
    }
}

/// A single light source
#[derive(Debug, Clone)]
pub struct Light {
    ambient: Vec4,
    diffuse: Vec4,
    position: Vec3,
    direction: Vec3,
    view: Mat4,
    ortho: Mat4,
    projection: Mat4,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            ambient: Vec4::ZERO,
            diffuse: Vec4::ONE,
            position: Vec3::ZERO,
            direction: Vec3::Z,
            view: Mat4::IDENTITY,
            ortho: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

impl Light {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ambient_colour(&mut self, colour: Vec4) {
        self.ambient = colour;
    }

    pub fn set_diffuse_colour(&mut self, colour: Vec4) {
        self.diffuse = colour;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction;
    }

    pub fn ambient(&self) -> Vec4 {
        self.ambient
    }

    pub fn diffuse(&self) -> Vec4 {
        self.diffuse
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// View matrix as of the last [`generate_view_matrix`](Self::generate_view_matrix)
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn ortho_matrix(&self) -> Mat4 {
        self.ortho
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Unit direction the light faces; a zero direction faces +Z
    pub fn forward(&self) -> Vec3 {
        self.direction.try_normalize().unwrap_or(Vec3::Z)
    }

    /// Rebuild the view matrix from the current position and direction
    pub fn generate_view_matrix(&mut self) {
        let forward = self.forward();
        // look_at degenerates when up is parallel to the view direction
        let up = if forward.dot(Vec3::Y).abs() > 0.999 {
            if forward.y > 0.0 { -Vec3::Z } else { Vec3::Z }
        } else {
            Vec3::Y
        };
        self.view = Mat4::look_at_lh(self.position, self.position + forward, up);
    }

    /// Orthographic projection of a `width` x `height` volume centred on the view axis
    pub fn generate_ortho_matrix(&mut self, width: f32, height: f32, near: f32, far: f32) {
        self.ortho = Mat4::orthographic_lh(
            -width * 0.5,
            width * 0.5,
            -height * 0.5,
            height * 0.5,
            near,
            far,
        );
    }

    /// Square perspective projection, `fov` in degrees
    pub fn generate_projection_matrix(&mut self, near: f32, far: f32, fov: f32) {
        self.projection = Mat4::perspective_lh(fov.to_radians(), 1.0, near, far);
    }
}

/// View and projection a shadow map is rendered with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowCaster {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for ShadowCaster {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

/// One light of the rig
#[derive(Debug, Clone)]
pub struct RigEntry {
    pub kind: LightKind,
    pub light: Light,
    pub active: bool,
    shadow_slot: Option<usize>,
}

impl RigEntry {
    /// Shadow map this light renders into, if any
    pub fn shadow_slot(&self) -> Option<usize> {
        self.shadow_slot
    }

    /// Matrices the shadow map is rendered with
    ///
    /// Directional lights use their orthographic projection, everything else
    /// the perspective one.
    pub fn shadow_caster(&self) -> ShadowCaster {
        let projection = match self.kind {
            LightKind::Directional => self.light.ortho_matrix(),
            LightKind::Point | LightKind::Spot => self.light.projection_matrix(),
        };
        ShadowCaster {
            view: self.light.view_matrix(),
            projection,
        }
    }
}

/// Ordered set of lights shared by every lit pipeline
#[derive(Debug, Clone)]
pub struct LightRig {
    entries: Vec<RigEntry>,
}

impl LightRig {
    /// Build a rig, assigning shadow slots to casting kinds in order
    pub fn new(lights: impl IntoIterator<Item = (LightKind, Light)>) -> Self {
        let mut next_slot = 0;
        let entries = lights
            .into_iter()
            .map(|(kind, light)| {
                let shadow_slot = if kind.casts_shadow() && next_slot < MAX_SHADOW_CASTERS {
                    next_slot += 1;
                    Some(next_slot - 1)
                } else {
                    None
                };
                RigEntry {
                    kind,
                    light,
                    active: true,
                    shadow_slot,
                }
            })
            .collect();
        Self { entries }
    }

    /// The scene's directional, point and spot light, initialised from `params`
    pub fn standard(params: &FrameParams, config: &RendererConfig) -> Self {
        let mut rig = Self::new([
            (LightKind::Directional, Light::new()),
            (LightKind::Point, Light::new()),
            (LightKind::Spot, Light::new()),
        ]);
        rig.apply(params, config);
        rig
    }

    pub fn entries(&self) -> &[RigEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &RigEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry of the given kind
    pub fn get(&self, kind: LightKind) -> Option<&RigEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    pub fn get_mut(&mut self, kind: LightKind) -> Option<&mut RigEntry> {
        self.entries.iter_mut().find(|e| e.kind == kind)
    }

    pub fn is_active(&self, kind: LightKind) -> bool {
        self.get(kind).map_or(false, |e| e.active)
    }

    /// Entries that own a shadow map, in slot order
    pub fn shadow_casters(&self) -> impl Iterator<Item = &RigEntry> {
        self.entries.iter().filter(|e| e.shadow_slot.is_some())
    }

    /// Shadow matrices per slot; unused slots stay at identity
    pub fn shadow_caster_matrices(&self) -> [ShadowCaster; MAX_SHADOW_CASTERS] {
        let mut casters = [ShadowCaster::default(); MAX_SHADOW_CASTERS];
        for entry in self.shadow_casters() {
            if let Some(slot) = entry.shadow_slot {
                casters[slot] = entry.shadow_caster();
            }
        }
        casters
    }

    /// Copy this frame's parameters into the lights and derive their transforms
    pub fn apply(&mut self, params: &FrameParams, config: &RendererConfig) {
        let center = Vec3::from(config.scene_center);
        for entry in &mut self.entries {
            let source = params.light(entry.kind);
            entry.active = source.active;
            entry.light.set_ambient_colour(source.ambient);
            entry.light.set_diffuse_colour(source.diffuse);
            entry.light.set_direction(source.direction);

            match entry.kind {
                LightKind::Directional => {
                    let position = center - entry.light.forward() * config.directional_distance;
                    entry.light.set_position(position);
                    entry.light.generate_view_matrix();
                    entry.light.generate_ortho_matrix(
                        config.directional_extent[0],
                        config.directional_extent[1],
                        config.directional_near,
                        config.directional_far,
                    );
                }
                LightKind::Spot => {
                    entry.light.set_position(source.position);
                    entry.light.generate_view_matrix();
                    entry.light.generate_projection_matrix(
                        config.spot_near,
                        config.spot_far,
                        config.spot_fov,
                    );
                }
                LightKind::Point => {
                    entry.light.set_position(source.position);
                }
            }
        }
    }
}
