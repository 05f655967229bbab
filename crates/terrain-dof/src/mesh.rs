//! Built-in meshes: the cube, the light marker spheres and the screen quad

use std::sync::Arc;

/// Vertex format of every non-tessellated mesh (32 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
    // position: vec3<f32>
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    // tex_coords: vec2<f32>
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x2,
        offset: 12,
        shader_location: 1,
    },
    // normal: vec3<f32>
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 20,
        shader_location: 2,
    },
];

impl MeshVertex {
    pub fn new(position: [f32; 3], tex_coords: [f32; 2], normal: [f32; 3]) -> Self {
        Self { position, tex_coords, normal }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &MESH_ATTRIBUTES,
        }
    }
}

/// The meshes a pass can ask for by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshId {
    Cube,
    PointMarker,
    SpotMarker,
    ScreenQuad,
}

/// CPU-side geometry, built once and uploaded
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Axis-aligned cube centred on the origin
    pub fn cube(half_size: f32) -> Self {
        let h = half_size;

        // (normal, corners wound the same way seen from outside)
        let faces: &[([f32; 3], [[f32; 3]; 4])] = &[
            ([0.0, 0.0, 1.0], [[-h,-h, h],[ h,-h, h],[ h, h, h],[-h, h, h]]),
            ([0.0, 0.0,-1.0], [[ h,-h,-h],[-h,-h,-h],[-h, h,-h],[ h, h,-h]]),
            ([1.0, 0.0, 0.0], [[ h,-h, h],[ h,-h,-h],[ h, h,-h],[ h, h, h]]),
            ([-1.0,0.0, 0.0], [[-h,-h,-h],[-h,-h, h],[-h, h, h],[-h, h,-h]]),
            ([0.0, 1.0, 0.0], [[-h, h, h],[ h, h, h],[ h, h,-h],[-h, h,-h]]),
            ([0.0,-1.0, 0.0], [[-h,-h,-h],[ h,-h,-h],[ h,-h, h],[-h,-h, h]]),
        ];

        let uvs: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (face_idx, (normal, corners)) in faces.iter().enumerate() {
            let base = (face_idx * 4) as u32;
            for (i, &pos) in corners.iter().enumerate() {
                vertices.push(MeshVertex::new(pos, uvs[i], *normal));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self { vertices, indices }
    }

    /// UV sphere centred on the origin with `rings` latitude bands
    pub fn sphere(radius: f32, rings: u32) -> Self {
        let rings = rings.max(2);
        let segments = rings * 2;
        let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
        let mut indices = Vec::with_capacity((rings * segments * 6) as usize);

        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let (phi_sin, phi_cos) = (v * std::f32::consts::PI).sin_cos();
            for segment in 0..=segments {
                let u = segment as f32 / segments as f32;
                let (theta_sin, theta_cos) = (u * std::f32::consts::TAU).sin_cos();
                let normal = [phi_sin * theta_cos, phi_cos, phi_sin * theta_sin];
                vertices.push(MeshVertex::new(
                    [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                    [u, v],
                    normal,
                ));
            }
        }

        let stride = segments + 1;
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        Self { vertices, indices }
    }

    /// Quad of `width` x `height` units centred on the origin in the XY plane
    ///
    /// UV (0, 0) is the top-left corner, matching texture space.
    pub fn screen_quad(width: f32, height: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let n = [0.0, 0.0, -1.0];
        let vertices = vec![
            MeshVertex::new([-hw, hh, 0.0], [0.0, 0.0], n),
            MeshVertex::new([hw, hh, 0.0], [1.0, 0.0], n),
            MeshVertex::new([hw, -hh, 0.0], [1.0, 1.0], n),
            MeshVertex::new([-hw, -hh, 0.0], [0.0, 1.0], n),
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        Self { vertices, indices }
    }
}

/// GPU-resident mesh (owns wgpu vertex + index buffers)
#[derive(Clone)]
pub struct GpuMesh {
    pub vertex_buffer: Arc<wgpu::Buffer>,
    pub index_buffer: Arc<wgpu::Buffer>,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, label: &str, data: &MeshData) -> Self {
        use wgpu::util::DeviceExt;
        let vertex_buffer = Arc::new(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        let index_buffer = Arc::new(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }
}

/// The uploaded built-in meshes
pub struct SceneMeshes {
    cube: GpuMesh,
    point_marker: GpuMesh,
    spot_marker: GpuMesh,
    screen_quad: GpuMesh,
}

impl SceneMeshes {
    /// Upload the cube, both marker spheres and a screen quad of `width` x `height` pixels
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let sphere = MeshData::sphere(1.0, 20);
        Self {
            cube: GpuMesh::new(device, "Cube", &MeshData::cube(1.0)),
            point_marker: GpuMesh::new(device, "Point Marker", &sphere),
            spot_marker: GpuMesh::new(device, "Spot Marker", &sphere),
            screen_quad: GpuMesh::new(
                device,
                "Screen Quad",
                &MeshData::screen_quad(width as f32, height as f32),
            ),
        }
    }

    pub fn get(&self, id: MeshId) -> &GpuMesh {
        match id {
            MeshId::Cube => &self.cube,
            MeshId::PointMarker => &self.point_marker,
            MeshId::SpotMarker => &self.spot_marker,
            MeshId::ScreenQuad => &self.screen_quad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_32_bytes() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 32);
    }

    #[test]
    fn cube_has_four_vertices_per_face() {
        let cube = MeshData::cube(1.0);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert!(cube.indices.iter().all(|&i| (i as usize) < cube.vertices.len()));
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let sphere = MeshData::sphere(2.0, 8);
        for v in &sphere.vertices {
            let len = glam::Vec3::from(v.position).length();
            assert!((len - 2.0).abs() < 1e-4);
        }
        assert!(sphere.indices.iter().all(|&i| (i as usize) < sphere.vertices.len()));
    }

    #[test]
    fn screen_quad_spans_pixels_with_top_left_origin() {
        let quad = MeshData::screen_quad(1280.0, 720.0);
        let top_left = quad.vertices[0];
        assert_eq!(top_left.position, [-640.0, 360.0, 0.0]);
        assert_eq!(top_left.tex_coords, [0.0, 0.0]);
        assert_eq!(quad.vertices[2].tex_coords, [1.0, 1.0]);
    }
}
