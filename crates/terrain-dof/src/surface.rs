//! The tessellated plane
//!
//! The plane is a grid of `(R-1)^2` quads, each stored as its own four control
//! points. wgpu has no hull or domain stage, so a patch is drawn as one
//! instance of `factor^2 * 6` vertices: the vertex shader rebuilds the domain
//! coordinate from the vertex index and interpolates the patch's control
//! points, which it reads from storage buffers.

use wgpu::util::DeviceExt;

/// Control points per patch
pub const POINTS_PER_PATCH: u32 = 4;

/// Largest tessellation factor a patch is subdivided by
pub const MAX_TESSELLATION_FACTOR: u32 = 64;

/// Bind group index the patch buffers are bound at
pub const PATCH_BIND_GROUP: u32 = 2;

/// Control point as laid out in the storage buffer (48 bytes, std430 vec3 padding)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ControlPoint {
    pub position: [f32; 3],
    _pad0: f32,
    pub uv: [f32; 2],
    _pad1: [f32; 2],
    pub normal: [f32; 3],
    _pad2: f32,
}

impl ControlPoint {
    pub fn new(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            _pad0: 0.0,
            uv,
            _pad1: [0.0; 2],
            normal,
            _pad2: 0.0,
        }
    }
}

/// CPU-side patch data of a plane with resolution `R`
#[derive(Debug, Clone)]
pub struct PlaneGeometry {
    pub resolution: u32,
    pub points: Vec<ControlPoint>,
    pub indices: Vec<u32>,
}

impl PlaneGeometry {
    pub fn new(resolution: u32) -> Self {
        let quads = resolution.saturating_sub(1);
        let count = (quads * quads * POINTS_PER_PATCH) as usize;
        let mut points = Vec::with_capacity(count);
        let increment = 1.0 / resolution as f32;
        let up = [0.0, 1.0, 0.0];

        for j in 0..quads {
            for i in 0..quads {
                let (x, z) = (i as f32, j as f32);
                let (u, v) = (x * increment, z * increment);

                points.push(ControlPoint::new([x, 0.0, z + 1.0], [u, v + increment], up));
                points.push(ControlPoint::new([x, 0.0, z], [u, v], up));
                points.push(ControlPoint::new([x + 1.0, 0.0, z], [u + increment, v], up));
                points.push(ControlPoint::new(
                    [x + 1.0, 0.0, z + 1.0],
                    [u + increment, v + increment],
                    up,
                ));
            }
        }

        let indices = (0..points.len() as u32).collect();
        Self {
            resolution,
            points,
            indices,
        }
    }

    pub fn patch_count(&self) -> u32 {
        self.indices.len() as u32 / POINTS_PER_PATCH
    }

    /// The four control points of quad (i, j)
    pub fn patch(&self, i: u32, j: u32) -> &[ControlPoint] {
        let quads = self.resolution - 1;
        let start = ((j * quads + i) * POINTS_PER_PATCH) as usize;
        &self.points[start..start + POINTS_PER_PATCH as usize]
    }
}

/// How many vertices and instances one tessellated draw of the plane takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchDraw {
    pub vertices_per_patch: u32,
    pub patch_count: u32,
}

impl PatchDraw {
    pub fn new(patch_count: u32, factor: u32) -> Self {
        let factor = factor.clamp(1, MAX_TESSELLATION_FACTOR);
        Self {
            vertices_per_patch: factor * factor * 6,
            patch_count,
        }
    }
}

/// Bind group layout of the patch storage buffers
pub fn patch_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let storage = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Patch Bind Group Layout"),
        entries: &[
            // Binding 0: control points
            storage(0),
            // Binding 1: patch index buffer
            storage(1),
        ],
    })
}

/// GPU-resident tessellated plane
pub struct TessellatedPlane {
    resolution: u32,
    patch_count: u32,
    _point_buffer: wgpu::Buffer,
    _index_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl TessellatedPlane {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, resolution: u32) -> Self {
        let geometry = PlaneGeometry::new(resolution);

        let point_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plane Control Points"),
            contents: bytemuck::cast_slice(&geometry.points),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plane Patch Indices"),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::INDEX,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Patch Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: point_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: index_buffer.as_entire_binding(),
                },
            ],
        });

        log::info!(
            "Tessellated plane: resolution {}, {} patches",
            resolution,
            geometry.patch_count()
        );

        Self {
            resolution,
            patch_count: geometry.patch_count(),
            _point_buffer: point_buffer,
            _index_buffer: index_buffer,
            bind_group,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn patch_count(&self) -> u32 {
        self.patch_count
    }

    /// Bind the patch buffers and describe the draw for `factor`
    pub fn submit<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, factor: u32) -> PatchDraw {
        pass.set_bind_group(PATCH_BIND_GROUP, &self.bind_group, &[]);
        PatchDraw::new(self.patch_count, factor)
    }
}
