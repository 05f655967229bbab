//! Bind group layouts and the texture bind groups built on them
//!
//! Every pipeline uses the same group numbering:
//!
//! - Group 0: the pipeline's uniform block, bound with a dynamic offset per draw
//! - Group 1: the textures and samplers the pipeline reads (if any)
//! - Group 2: patch storage buffers (tessellated pipelines only)

use std::collections::HashMap;

use super::PipelineKind;
use crate::surface::patch_bind_group_layout;
use crate::{Error, Result};

fn float_texture(binding: u32, visibility: wgpu::ShaderStages, filterable: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn depth_texture(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Depth,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler(binding: u32, visibility: wgpu::ShaderStages, ty: wgpu::SamplerBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Sampler(ty),
        count: None,
    }
}

fn view_entry(binding: u32, view: &wgpu::TextureView) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::TextureView(view),
    }
}

fn sampler_entry(binding: u32, sampler: &wgpu::Sampler) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::Sampler(sampler),
    }
}

/// Bind group layouts of all six pipelines
pub struct PipelineLayouts {
    uniforms: HashMap<PipelineKind, wgpu::BindGroupLayout>,
    /// Lit pipelines: surface texture, both shadow maps, samplers
    lit: wgpu::BindGroupLayout,
    height_map: wgpu::BindGroupLayout,
    blur: wgpu::BindGroupLayout,
    depth_of_field: wgpu::BindGroupLayout,
    patches: wgpu::BindGroupLayout,
}

impl PipelineLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniforms = PipelineKind::ALL
            .iter()
            .map(|&kind| (kind, Self::create_uniform_layout(device, kind)))
            .collect();

        Self {
            uniforms,
            lit: Self::create_lit_layout(device),
            height_map: Self::create_height_map_layout(device),
            blur: Self::create_blur_layout(device),
            depth_of_field: Self::create_depth_of_field_layout(device),
            patches: patch_bind_group_layout(device),
        }
    }

    /// Group 0: one dynamic-offset uniform block
    fn create_uniform_layout(device: &wgpu::Device, kind: PipelineKind) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} Uniform Layout", kind.label())),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(kind.uniform_size()),
                },
                count: None,
            }],
        })
    }

    fn create_lit_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let both = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lit Texture Layout"),
            entries: &[
                // Binding 0: height map (terrain) or surface texture (basic)
                float_texture(0, both, true),
                // Binding 1-2: shadow maps
                depth_texture(1),
                depth_texture(2),
                // Binding 3: linear sampler
                sampler(3, both, wgpu::SamplerBindingType::Filtering),
                // Binding 4: shadow comparison sampler
                sampler(4, wgpu::ShaderStages::FRAGMENT, wgpu::SamplerBindingType::Comparison),
                // Binding 5: height sampler, terrain only
                sampler(5, both, wgpu::SamplerBindingType::Filtering),
            ],
        })
    }

    fn create_height_map_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Height Map Layout"),
            entries: &[
                float_texture(0, wgpu::ShaderStages::VERTEX, true),
                sampler(1, wgpu::ShaderStages::VERTEX, wgpu::SamplerBindingType::Filtering),
            ],
        })
    }

    fn create_blur_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Blur Texture Layout"),
            entries: &[
                float_texture(0, wgpu::ShaderStages::FRAGMENT, true),
                sampler(1, wgpu::ShaderStages::FRAGMENT, wgpu::SamplerBindingType::Filtering),
            ],
        })
    }

    fn create_depth_of_field_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Depth Of Field Texture Layout"),
            entries: &[
                // Binding 0: sharp screen
                float_texture(0, wgpu::ShaderStages::FRAGMENT, true),
                // Binding 1: blurred screen
                float_texture(1, wgpu::ShaderStages::FRAGMENT, true),
                // Binding 2: camera depth
                float_texture(2, wgpu::ShaderStages::FRAGMENT, false),
            ],
        })
    }

    pub fn uniforms(&self, kind: PipelineKind) -> &wgpu::BindGroupLayout {
        &self.uniforms[&kind]
    }

    /// Group 1 layout, `None` for pipelines that read no textures
    pub fn textures(&self, kind: PipelineKind) -> Option<&wgpu::BindGroupLayout> {
        match kind {
            PipelineKind::Terrain | PipelineKind::Basic => Some(&self.lit),
            PipelineKind::DepthTessellated => Some(&self.height_map),
            PipelineKind::Depth => None,
            PipelineKind::Blur => Some(&self.blur),
            PipelineKind::DepthOfField => Some(&self.depth_of_field),
        }
    }

    pub fn patches(&self) -> &wgpu::BindGroupLayout {
        &self.patches
    }

    /// Groups in binding order for `kind`'s pipeline layout
    pub fn groups(&self, kind: PipelineKind) -> Vec<&wgpu::BindGroupLayout> {
        let mut groups = vec![self.uniforms(kind)];
        groups.extend(self.textures(kind));
        if kind.is_tessellated() {
            groups.push(&self.patches);
        }
        groups
    }
}

/// Address mode the height map is sampled with, `None` for pipelines that do not displace
///
/// Lit terrain and its depth passes must agree here, otherwise the plane's
/// edges are displaced differently in the scene than in the depth targets.
pub fn height_map_address_mode(kind: PipelineKind) -> Option<wgpu::AddressMode> {
    match kind {
        PipelineKind::Terrain | PipelineKind::DepthTessellated => Some(wgpu::AddressMode::ClampToEdge),
        PipelineKind::Depth | PipelineKind::Basic | PipelineKind::Blur | PipelineKind::DepthOfField => None,
    }
}

fn filtering_sampler(device: &wgpu::Device, label: &str, mode: wgpu::AddressMode) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: mode,
        address_mode_v: mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

fn sampler_for<'a>(
    mode: wgpu::AddressMode,
    repeat: &'a wgpu::Sampler,
    clamp: &'a wgpu::Sampler,
) -> &'a wgpu::Sampler {
    match mode {
        wgpu::AddressMode::Repeat => repeat,
        _ => clamp,
    }
}

/// Views the texture bind groups are built from
pub struct TextureSources<'a> {
    pub height_map: &'a wgpu::TextureView,
    pub surface_texture: &'a wgpu::TextureView,
    pub shadow_maps: [&'a wgpu::TextureView; 2],
    pub screen: &'a wgpu::TextureView,
    pub blur: &'a wgpu::TextureView,
    pub camera_depth: &'a wgpu::TextureView,
}

/// Group 1 bind groups, built once since every source is fixed
pub struct TextureBindings {
    groups: HashMap<PipelineKind, wgpu::BindGroup>,
    _repeat_sampler: wgpu::Sampler,
    _clamp_sampler: wgpu::Sampler,
    _shadow_sampler: wgpu::Sampler,
}

impl TextureBindings {
    pub fn new(device: &wgpu::Device, layouts: &PipelineLayouts, sources: &TextureSources<'_>) -> Self {
        let repeat_sampler = filtering_sampler(device, "Repeat Sampler", wgpu::AddressMode::Repeat);
        let clamp_sampler = filtering_sampler(device, "Clamp Sampler", wgpu::AddressMode::ClampToEdge);
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let height_sampler = |kind| {
            let mode = height_map_address_mode(kind).unwrap_or(wgpu::AddressMode::ClampToEdge);
            sampler_for(mode, &repeat_sampler, &clamp_sampler)
        };

        let lit = |label: &str, surface: &wgpu::TextureView, kind: PipelineKind| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &layouts.lit,
                entries: &[
                    view_entry(0, surface),
                    view_entry(1, sources.shadow_maps[0]),
                    view_entry(2, sources.shadow_maps[1]),
                    sampler_entry(3, &repeat_sampler),
                    sampler_entry(4, &shadow_sampler),
                    sampler_entry(5, height_sampler(kind)),
                ],
            })
        };

        let mut groups = HashMap::new();
        groups.insert(
            PipelineKind::Terrain,
            lit("Terrain Textures", sources.height_map, PipelineKind::Terrain),
        );
        groups.insert(
            PipelineKind::Basic,
            lit("Basic Textures", sources.surface_texture, PipelineKind::Basic),
        );
        groups.insert(
            PipelineKind::DepthTessellated,
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Depth Tessellation Textures"),
                layout: &layouts.height_map,
                entries: &[
                    view_entry(0, sources.height_map),
                    sampler_entry(1, height_sampler(PipelineKind::DepthTessellated)),
                ],
            }),
        );
        groups.insert(
            PipelineKind::Blur,
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Blur Textures"),
                layout: &layouts.blur,
                entries: &[view_entry(0, sources.screen), sampler_entry(1, &clamp_sampler)],
            }),
        );
        groups.insert(
            PipelineKind::DepthOfField,
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Depth Of Field Textures"),
                layout: &layouts.depth_of_field,
                entries: &[
                    view_entry(0, sources.screen),
                    view_entry(1, sources.blur),
                    view_entry(2, sources.camera_depth),
                ],
            }),
        );

        Self {
            groups,
            _repeat_sampler: repeat_sampler,
            _clamp_sampler: clamp_sampler,
            _shadow_sampler: shadow_sampler,
        }
    }

    /// Group 1 of `kind`, `Ok(None)` for pipelines without textures
    pub fn get(&self, kind: PipelineKind) -> Result<Option<&wgpu::BindGroup>> {
        match kind {
            PipelineKind::Depth => Ok(None),
            _ => self
                .groups
                .get(&kind)
                .map(Some)
                .ok_or_else(|| Error::Resource(format!("no texture bindings for {}", kind.label()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_and_its_depth_passes_sample_heights_alike() {
        let lit = height_map_address_mode(PipelineKind::Terrain);
        assert_eq!(lit, height_map_address_mode(PipelineKind::DepthTessellated));
        // uv 0 and 1 must not wrap onto the opposite edge
        assert_eq!(lit, Some(wgpu::AddressMode::ClampToEdge));
        assert_eq!(height_map_address_mode(PipelineKind::Basic), None);
    }

    #[test]
    fn terrain_displaces_through_the_height_sampler() {
        for kind in [PipelineKind::Terrain, PipelineKind::DepthTessellated] {
            let source = kind.shader_source();
            assert!(source.contains("var height_sampler: sampler"), "{:?}", kind);
            assert!(!source.contains("linear_sampler, u.tessellation"), "{:?}", kind);
            assert!(!source.contains("linear_sampler, in.uv, u.tessellation"), "{:?}", kind);
        }
    }
}
