//! Per-pipeline uniform arenas
//!
//! Every draw of a frame gets its own slot in its pipeline's arena. Slots are
//! `stride` bytes apart so each one can be bound through a dynamic offset.
//! The whole arena is written with a single `write_buffer` before the frame's
//! encoder is submitted.

use std::collections::HashMap;

use super::{DrawParams, PipelineKind, PipelineLayouts};
use crate::{Error, Result};

struct ArenaGpu {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: u32,
}

/// Staging memory and GPU buffer for one pipeline's uniform blocks
pub struct UniformArena {
    kind: PipelineKind,
    block_size: u64,
    stride: u64,
    min_capacity: u32,
    staging: Vec<u8>,
    len: u32,
    gpu: Option<ArenaGpu>,
}

impl UniformArena {
    pub fn new(kind: PipelineKind, alignment: u32, min_capacity: u32) -> Self {
        let block_size = kind.uniform_size();
        let alignment = alignment.max(1) as u64;
        let stride = block_size.div_ceil(alignment) * alignment;
        Self {
            kind,
            block_size,
            stride,
            min_capacity: min_capacity.max(1),
            staging: Vec::new(),
            len: 0,
            gpu: None,
        }
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Blocks pushed since the last reset
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forget this frame's blocks; the GPU buffer is kept
    pub fn reset(&mut self) {
        self.staging.clear();
        self.len = 0;
    }

    /// Append a block and return its dynamic offset
    pub fn push<T: bytemuck::Pod>(&mut self, block: &T) -> u32 {
        debug_assert_eq!(std::mem::size_of::<T>() as u64, self.block_size);
        let offset = self.len as u64 * self.stride;
        self.staging.extend_from_slice(bytemuck::bytes_of(block));
        self.staging.resize((offset + self.stride) as usize, 0);
        self.len += 1;
        offset as u32
    }

    /// Slots the GPU buffer needs to hold this frame's blocks
    pub fn required_capacity(&self) -> u32 {
        let current = self.gpu.as_ref().map_or(self.min_capacity, |gpu| gpu.capacity);
        if self.len <= current {
            current
        } else {
            self.len.next_power_of_two()
        }
    }

    /// Write the staged blocks, growing the buffer first when they do not fit
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &PipelineLayouts,
    ) {
        let capacity = self.required_capacity();
        let needs_buffer = self.gpu.as_ref().map_or(true, |gpu| gpu.capacity < capacity);
        if needs_buffer {
            if self.gpu.is_some() {
                log::debug!(
                    "Growing {} uniform arena to {} slots",
                    self.kind.label(),
                    capacity
                );
            }
            self.gpu = Some(self.create_gpu(device, layouts, capacity));
        }

        if let Some(gpu) = &self.gpu {
            if !self.staging.is_empty() {
                queue.write_buffer(&gpu.buffer, 0, &self.staging);
            }
        }
    }

    fn create_gpu(&self, device: &wgpu::Device, layouts: &PipelineLayouts, capacity: u32) -> ArenaGpu {
        let label = format!("{} Uniform Arena", self.kind.label());
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&label),
            size: capacity as u64 * self.stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&label),
            layout: layouts.uniforms(self.kind),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(self.block_size),
                }),
            }],
        });
        ArenaGpu {
            buffer,
            bind_group,
            capacity,
        }
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.bind_group)
    }
}

/// One arena per pipeline kind
pub struct UniformArenas {
    arenas: HashMap<PipelineKind, UniformArena>,
}

impl UniformArenas {
    pub fn new(alignment: u32, min_capacity: u32) -> Self {
        let arenas = PipelineKind::ALL
            .iter()
            .map(|&kind| (kind, UniformArena::new(kind, alignment, min_capacity)))
            .collect();
        Self { arenas }
    }

    pub fn reset(&mut self) {
        for arena in self.arenas.values_mut() {
            arena.reset();
        }
    }

    /// Convert a draw's parameters into its uniform block and stage it
    pub fn stage(&mut self, params: &DrawParams) -> Result<u32> {
        let arena = self.arena_mut(params.kind())?;
        let offset = match params {
            DrawParams::Terrain(p) => arena.push(&p.uniforms()),
            DrawParams::DepthTessellated(p) => arena.push(&p.uniforms()),
            DrawParams::Depth(p) => arena.push(&p.uniforms()),
            DrawParams::Basic(p) => arena.push(&p.uniforms()),
            DrawParams::Blur(p) => arena.push(&p.uniforms()),
            DrawParams::DepthOfField(p) => arena.push(&p.uniforms()),
        };
        Ok(offset)
    }

    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, layouts: &PipelineLayouts) {
        for arena in self.arenas.values_mut() {
            arena.upload(device, queue, layouts);
        }
    }

    pub fn get(&self, kind: PipelineKind) -> Result<&UniformArena> {
        self.arenas
            .get(&kind)
            .ok_or_else(|| Error::Resource(format!("no uniform arena for {}", kind.label())))
    }

    fn arena_mut(&mut self, kind: PipelineKind) -> Result<&mut UniformArena> {
        self.arenas
            .get_mut(&kind)
            .ok_or_else(|| Error::Resource(format!("no uniform arena for {}", kind.label())))
    }

    pub fn bind_group(&self, kind: PipelineKind) -> Result<&wgpu::BindGroup> {
        self.get(kind)?.bind_group().ok_or_else(|| {
            Error::Resource(format!("uniform arena for {} was never uploaded", kind.label()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{DepthParams, Transforms};
    use glam::Mat4;

    fn depth_draw(x: f32) -> DrawParams {
        DrawParams::Depth(DepthParams {
            transforms: Transforms::new(
                Mat4::from_translation(glam::Vec3::new(x, 0.0, 0.0)),
                Mat4::IDENTITY,
                Mat4::IDENTITY,
            ),
        })
    }

    #[test]
    fn stride_is_aligned() {
        let arena = UniformArena::new(PipelineKind::Terrain, 256, 4);
        assert_eq!(arena.stride() % 256, 0);
        assert!(arena.stride() >= PipelineKind::Terrain.uniform_size());
    }

    #[test]
    fn every_draw_gets_its_own_slot() {
        let mut arenas = UniformArenas::new(256, 4);
        let offsets: Vec<u32> = (0..3).map(|i| arenas.stage(&depth_draw(i as f32)).unwrap()).collect();
        assert_eq!(offsets, vec![0, 256, 512]);

        let arena = arenas.get(PipelineKind::Depth).unwrap();
        assert_eq!(arena.len(), 3);
        assert!(arenas.get(PipelineKind::Blur).unwrap().is_empty());
    }

    #[test]
    fn reset_starts_the_frame_over() {
        let mut arenas = UniformArenas::new(256, 4);
        arenas.stage(&depth_draw(1.0)).unwrap();
        arenas.reset();
        assert_eq!(arenas.stage(&depth_draw(2.0)).unwrap(), 0);
    }

    #[test]
    fn capacity_grows_past_the_minimum() {
        let mut arena = UniformArena::new(PipelineKind::Depth, 256, 4);
        let block = DepthParams {
            transforms: Transforms::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY),
        }
        .uniforms();
        for _ in 0..3 {
            arena.push(&block);
        }
        assert_eq!(arena.required_capacity(), 4);
        for _ in 0..3 {
            arena.push(&block);
        }
        assert_eq!(arena.required_capacity(), 8);
    }
}
