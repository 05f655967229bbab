//! Frame encoder - replays pass recordings into one command encoder

use std::sync::Arc;

use crate::graph::{Geometry, PassRecording, TargetId};
use crate::mesh::SceneMeshes;
use crate::pipeline::{PipelineCache, PipelineKey, PipelineLayouts, TextureBindings, UniformArenas};
use crate::surface::TessellatedPlane;
use crate::target::OffscreenTargets;
use crate::{Error, Result};

/// Create a Depth32Float texture + view at the given resolution
pub(crate) fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Back Buffer Depth"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: crate::target::DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
    (tex, view)
}

/// Everything a frame's draws bind
pub(crate) struct FrameResources<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub layouts: &'a PipelineLayouts,
    pub pipelines: &'a mut PipelineCache,
    pub arenas: &'a mut UniformArenas,
    pub textures: &'a TextureBindings,
    pub targets: &'a OffscreenTargets,
    pub meshes: &'a SceneMeshes,
    pub plane: &'a TessellatedPlane,
    pub back_buffer: &'a wgpu::TextureView,
    pub back_buffer_depth: &'a wgpu::TextureView,
    pub surface_format: wgpu::TextureFormat,
}

/// Pipeline and uniform offset of one recorded draw
struct PreparedDraw {
    pipeline: Arc<wgpu::RenderPipeline>,
    offset: u32,
}

/// Stage every draw's uniforms, resolve its pipeline, then record the passes
pub(crate) fn encode_frame(
    resources: FrameResources<'_>,
    encoder: &mut wgpu::CommandEncoder,
    recordings: &[PassRecording],
) -> Result<()> {
    let FrameResources {
        device,
        queue,
        layouts,
        pipelines,
        arenas,
        textures,
        targets,
        meshes,
        plane,
        back_buffer,
        back_buffer_depth,
        surface_format,
    } = resources;

    arenas.reset();
    let mut prepared: Vec<Vec<PreparedDraw>> = Vec::with_capacity(recordings.len());
    for recording in recordings {
        let color_format = recording.target.color_format(surface_format);
        let mut draws = Vec::with_capacity(recording.draws.len());
        for draw in &recording.draws {
            let pipeline = pipelines.get_or_create(PipelineKey {
                kind: draw.kind(),
                raster: draw.raster,
                color_format,
            })?;
            let offset = arenas.stage(&draw.params)?;
            draws.push(PreparedDraw { pipeline, offset });
        }
        prepared.push(draws);
    }
    arenas.upload(device, queue, layouts);
    let arenas: &UniformArenas = arenas;

    for (recording, draws) in recordings.iter().zip(&prepared) {
        log::trace!("  Encoding pass: {} ({} draws)", recording.pass, recording.draws.len());
        let clear = recording.clear_color.unwrap_or([0.0, 0.0, 0.0, 1.0]);

        let (color, depth) = match recording.target {
            TargetId::ShadowMap(slot) => {
                let shadow_map = targets
                    .shadow_maps
                    .get(slot)
                    .ok_or_else(|| Error::Resource(format!("no shadow map in slot {}", slot)))?;
                (None, shadow_map.bind_depth_target_and_clear())
            }
            TargetId::CameraDepth => split(targets.camera_depth.set_as_color_target_and_clear(clear)),
            TargetId::Screen => split(targets.screen.set_as_color_target_and_clear(clear)),
            TargetId::Blur => split(targets.blur.set_as_color_target_and_clear(clear)),
            TargetId::BackBuffer => back_buffer_attachments(back_buffer, back_buffer_depth, clear),
        };

        // Depth-only passes bind no colour slot at all
        let color_attachments: Vec<Option<wgpu::RenderPassColorAttachment>> =
            color.into_iter().map(Some).collect();
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(recording.pass.as_str()),
            color_attachments: &color_attachments,
            depth_stencil_attachment: Some(depth),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        for (draw, ready) in recording.draws.iter().zip(draws) {
            let kind = draw.kind();
            pass.set_pipeline(&ready.pipeline);
            pass.set_bind_group(0, arenas.bind_group(kind)?, &[ready.offset]);
            if let Some(group) = textures.get(kind)? {
                pass.set_bind_group(1, group, &[]);
            }

            match draw.geometry {
                Geometry::Surface => {
                    let factor = draw.params.tessellation_factor().unwrap_or(1);
                    let patches = plane.submit(&mut pass, factor);
                    pass.draw(0..patches.vertices_per_patch, 0..patches.patch_count);
                }
                Geometry::Mesh(id) => {
                    let mesh = meshes.get(id);
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }
        }
    }
    Ok(())
}

fn split<'a>(
    (color, depth): (wgpu::RenderPassColorAttachment<'a>, wgpu::RenderPassDepthStencilAttachment<'a>),
) -> (Option<wgpu::RenderPassColorAttachment<'a>>, wgpu::RenderPassDepthStencilAttachment<'a>) {
    (Some(color), depth)
}

fn back_buffer_attachments<'a>(
    view: &'a wgpu::TextureView,
    depth_view: &'a wgpu::TextureView,
    [r, g, b, a]: [f32; 4],
) -> (Option<wgpu::RenderPassColorAttachment<'a>>, wgpu::RenderPassDepthStencilAttachment<'a>) {
    (
        Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color {
                    r: r as f64,
                    g: g as f64,
                    b: b as f64,
                    a: a as f64,
                }),
                store: wgpu::StoreOp::Store,
            },
        }),
        wgpu::RenderPassDepthStencilAttachment {
            view: depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        },
    )
}
