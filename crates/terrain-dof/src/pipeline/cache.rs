//! Pipeline cache keyed by pipeline kind, raster state and target format

use super::{PipelineKey, PipelineKind, PipelineLayouts, RasterState};
use crate::mesh::MeshVertex;
use crate::target::DEPTH_FORMAT;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Pipeline cache builds each variant on first use and keeps it for the renderer's lifetime
pub struct PipelineCache {
    device: Arc<wgpu::Device>,
    layouts: Arc<PipelineLayouts>,
    cache: HashMap<PipelineKey, Arc<wgpu::RenderPipeline>>,
    shader_modules: HashMap<PipelineKind, Arc<wgpu::ShaderModule>>,
    pipeline_layouts: HashMap<PipelineKind, Arc<wgpu::PipelineLayout>>,
    line_rasterization: bool,
}

impl PipelineCache {
    pub fn new(device: Arc<wgpu::Device>, layouts: Arc<PipelineLayouts>) -> Self {
        let line_rasterization = device.features().contains(wgpu::Features::POLYGON_MODE_LINE);
        if !line_rasterization {
            log::warn!("POLYGON_MODE_LINE unavailable, wireframe draws fall back to filled triangles");
        }
        Self {
            device,
            layouts,
            cache: HashMap::new(),
            shader_modules: HashMap::new(),
            pipeline_layouts: HashMap::new(),
            line_rasterization,
        }
    }

    /// Number of compiled variants
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Get or create a pipeline variant
    pub fn get_or_create(&mut self, key: PipelineKey) -> Result<Arc<wgpu::RenderPipeline>> {
        // Return cached pipeline if it exists
        if let Some(pipeline) = self.cache.get(&key) {
            log::trace!("Using cached pipeline: {:?}", key);
            return Ok(pipeline.clone());
        }

        if key.color_format.is_none() && !key.kind.is_depth_only_capable() {
            return Err(Error::Pipeline(format!(
                "{} pipeline needs a colour target",
                key.kind.label()
            )));
        }

        log::info!("Creating new pipeline variant: {:?}", key);

        let shader = self.shader_module(key.kind);
        let layout = self.pipeline_layout(key.kind);
        let pipeline = Arc::new(self.create_pipeline(key, &layout, &shader));
        self.cache.insert(key, pipeline.clone());
        Ok(pipeline)
    }

    fn shader_module(&mut self, kind: PipelineKind) -> Arc<wgpu::ShaderModule> {
        let device = &self.device;
        self.shader_modules
            .entry(kind)
            .or_insert_with(|| {
                Arc::new(device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(kind.label()),
                    source: wgpu::ShaderSource::Wgsl(kind.shader_source().into()),
                }))
            })
            .clone()
    }

    fn pipeline_layout(&mut self, kind: PipelineKind) -> Arc<wgpu::PipelineLayout> {
        let device = &self.device;
        let layouts = &self.layouts;
        self.pipeline_layouts
            .entry(kind)
            .or_insert_with(|| {
                let groups = layouts.groups(kind);
                Arc::new(device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(&format!("{}_layout", kind.label())),
                    bind_group_layouts: &groups,
                    push_constant_ranges: &[],
                }))
            })
            .clone()
    }

    fn create_pipeline(
        &self,
        key: PipelineKey,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
    ) -> wgpu::RenderPipeline {
        // Patch draws pull their vertices from storage buffers
        let mesh_layout = [MeshVertex::layout()];
        let buffers: &[wgpu::VertexBufferLayout] = if key.kind.is_tessellated() {
            &[]
        } else {
            &mesh_layout
        };

        let color_targets = key.color_format.map(|format| {
            [Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })]
        });
        let fragment = color_targets.as_ref().map(|targets| wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        });

        let polygon_mode = if key.raster.contains(RasterState::WIREFRAME) && self.line_rasterization {
            wgpu::PolygonMode::Line
        } else {
            wgpu::PolygonMode::Fill
        };
        let depth_test = key.raster.contains(RasterState::DEPTH_TEST);

        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{:?}", key)),
            layout: Some(layout),
            cache: None,
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: depth_test,
                depth_compare: if depth_test {
                    wgpu::CompareFunction::Less
                } else {
                    wgpu::CompareFunction::Always
                },
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        })
    }
}
