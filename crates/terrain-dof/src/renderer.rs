//! Main renderer implementation

use std::sync::Arc;

use crate::camera::{CameraSource, FlyCamera};
use crate::config::RendererConfig;
use crate::encoder::{create_depth_texture, encode_frame, FrameResources};
use crate::frame::FrameParams;
use crate::graph::PassRecording;
use crate::mesh::SceneMeshes;
use crate::overlay::Overlay;
use crate::pipeline::{
    PipelineCache, PipelineKey, PipelineLayouts, TextureBindings, TextureSources, UniformArenas,
};
use crate::planner::FramePlanner;
use crate::surface::TessellatedPlane;
use crate::target::OffscreenTargets;
use crate::texture::TextureLibrary;
use crate::Result;

/// Main renderer
///
/// Owns every GPU resource of the demo. The host owns the device, the
/// surface and the frame parameters, and presents after
/// [`render_frame`](Self::render_frame) returns.
pub struct Renderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,

    planner: FramePlanner,
    layouts: Arc<PipelineLayouts>,
    pipelines: PipelineCache,
    arenas: UniformArenas,

    targets: OffscreenTargets,
    texture_bindings: TextureBindings,
    meshes: SceneMeshes,
    plane: TessellatedPlane,

    // Depth buffer of the back buffer pass (Depth32Float)
    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,

    frame_count: u64,
}

impl Renderer {
    /// Create every target, pipeline and buffer the frame needs
    ///
    /// Fails when a configured texture is missing from `textures`, when the
    /// pass graph does not validate or when wgpu reports a validation error
    /// while the resources are created.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        config: RendererConfig,
        textures: &TextureLibrary,
    ) -> Result<Self> {
        log::info!("Creating terrain renderer");
        log::info!("  Surface format: {:?}", config.surface_format);
        log::info!("  Resolution: {}x{}", config.width, config.height);

        let height_map = textures.require(&config.height_map)?;
        let surface_texture = textures.require(&config.surface_texture)?;
        let planner = FramePlanner::new(config, height_map.texel_size())?;

        // The scope is popped on every path, including a failed build
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let built = Self::build(device.clone(), queue, planner, &height_map.view, &surface_texture.view);
        let validation = Self::check_validation(&device);
        let renderer = built?;
        validation?;
        Ok(renderer)
    }

    fn build(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        mut planner: FramePlanner,
        height_map: &wgpu::TextureView,
        surface_texture: &wgpu::TextureView,
    ) -> Result<Self> {
        let config = planner.config().clone();
        let layouts = Arc::new(PipelineLayouts::new(&device));
        let targets = OffscreenTargets::new(&device, &config);
        let texture_bindings = TextureBindings::new(
            &device,
            &layouts,
            &TextureSources {
                height_map,
                surface_texture,
                shadow_maps: [
                    targets.shadow_maps[0].shader_view(),
                    targets.shadow_maps[1].shader_view(),
                ],
                screen: targets.screen.shader_view(),
                blur: targets.blur.shader_view(),
                camera_depth: targets.camera_depth.shader_view(),
            },
        );
        let meshes = SceneMeshes::new(&device, config.width, config.height);
        let plane = TessellatedPlane::new(&device, layouts.patches(), config.plane_resolution);
        let (depth_texture, depth_view) = create_depth_texture(&device, config.width, config.height);

        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let arenas = UniformArenas::new(alignment, config.uniform_arena_capacity);

        // Build every pipeline variant up front so validation errors surface here
        let mut pipelines = PipelineCache::new(device.clone(), layouts.clone());
        let warm_up_camera = FlyCamera::default();
        for wireframe in [false, true] {
            let params = FrameParams {
                wireframe,
                ..Default::default()
            };
            let recordings = planner.plan(&params, &warm_up_camera)?;
            Self::warm_up(&mut pipelines, &recordings, config.surface_format)?;
        }
        log::info!("Pipelines built: {} variants", pipelines.len());

        Ok(Self {
            device,
            queue,
            planner,
            layouts,
            pipelines,
            arenas,
            targets,
            texture_bindings,
            meshes,
            plane,
            _depth_texture: depth_texture,
            depth_view,
            frame_count: 0,
        })
    }

    fn warm_up(
        pipelines: &mut PipelineCache,
        recordings: &[PassRecording],
        surface_format: wgpu::TextureFormat,
    ) -> Result<()> {
        for recording in recordings {
            let color_format = recording.target.color_format(surface_format);
            for draw in &recording.draws {
                pipelines.get_or_create(PipelineKey {
                    kind: draw.kind(),
                    raster: draw.raster,
                    color_format,
                })?;
            }
        }
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn check_validation(device: &wgpu::Device) -> Result<()> {
        match pollster::block_on(device.pop_error_scope()) {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    // Errors still reach the device's uncaptured error handler
    #[cfg(target_arch = "wasm32")]
    fn check_validation(device: &wgpu::Device) -> Result<()> {
        drop(device.pop_error_scope());
        Ok(())
    }

    /// Render a frame into `back_buffer`
    ///
    /// Records every pass into one encoder, advances the camera, lets the
    /// overlay draw on top and submits. The host presents afterwards.
    pub fn render_frame(
        &mut self,
        params: &mut FrameParams,
        camera: &mut dyn CameraSource,
        back_buffer: &wgpu::TextureView,
        overlay: Option<&mut dyn Overlay>,
    ) -> Result<()> {
        log::trace!("Rendering frame {}", self.frame_count);

        let recordings = self.planner.plan(params, &*camera)?;

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        encode_frame(
            FrameResources {
                device: &self.device,
                queue: &self.queue,
                layouts: &self.layouts,
                pipelines: &mut self.pipelines,
                arenas: &mut self.arenas,
                textures: &self.texture_bindings,
                targets: &self.targets,
                meshes: &self.meshes,
                plane: &self.plane,
                back_buffer,
                back_buffer_depth: &self.depth_view,
                surface_format: self.planner.config().surface_format,
            },
            &mut encoder,
            &recordings,
        )?;

        camera.update();

        if let Some(overlay) = overlay {
            overlay.render(&self.device, &self.queue, &mut encoder, back_buffer, params);
        }

        self.queue.submit(Some(encoder.finish()));
        self.frame_count += 1;
        Ok(())
    }

    pub fn config(&self) -> &RendererConfig {
        self.planner.config()
    }

    /// Pass names in execution order
    pub fn pass_order(&self) -> Vec<&str> {
        self.planner.graph().execution_order()
    }

    pub fn frame_count(&self) -> u64 { self.frame_count }
    pub fn device(&self) -> &wgpu::Device { &self.device }
    pub fn queue(&self) -> &wgpu::Queue { &self.queue }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::TextureKind;

    fn create_device_queue() -> Option<(Arc<wgpu::Device>, Arc<wgpu::Queue>)> {
        let _ = env_logger::builder().is_test(true).try_init();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("renderer_test_device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))
        .ok()?;
        Some((Arc::new(device), Arc::new(queue)))
    }

    fn textures(device: &wgpu::Device, queue: &wgpu::Queue) -> TextureLibrary {
        let mut library = TextureLibrary::new();
        let height: Vec<u8> = (0..8 * 8)
            .flat_map(|i| {
                let v = (i * 4) as u8;
                [v, v, v, 255]
            })
            .collect();
        library
            .insert_rgba8(device, queue, "heightMap", 8, 8, &height, TextureKind::Data)
            .unwrap();
        library
            .insert_rgba8(device, queue, "brick", 1, 1, &[180, 90, 60, 255], TextureKind::Color)
            .unwrap();
        library
    }

    fn read_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
        width: u32,
        height: u32,
    ) -> Vec<u8> {
        let row = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row = row.div_ceil(align) * align;
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Readback"),
            size: (padded_row * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(Some(encoder.finish()));

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = device.poll(wgpu::Maintain::Wait);
        rx.recv().unwrap().unwrap();

        let mapped = slice.get_mapped_range();
        let pixels: Vec<u8> = mapped
            .chunks(padded_row as usize)
            .flat_map(|chunk| chunk[..row as usize].iter().copied())
            .collect();
        pixels
    }

    #[test]
    fn composite_without_depth_of_field_is_the_scene_image() {
        let Some((device, queue)) = create_device_queue() else {
            eprintln!("Skipping composite_without_depth_of_field_is_the_scene_image (no GPU)");
            return;
        };
        let config = RendererConfig {
            shadow_map_size: 256,
            plane_resolution: 8,
            ..RendererConfig::default()
        }
        .with_size(64, 64)
        .with_surface_format(wgpu::TextureFormat::Rgba8Unorm);
        let library = textures(&device, &queue);
        let mut renderer = Renderer::new(device.clone(), queue.clone(), config.clone(), &library).unwrap();

        let back_buffer = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Test Back Buffer"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: config.surface_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = back_buffer.create_view(&wgpu::TextureViewDescriptor::default());

        let mut params = FrameParams::default();
        params.point.active = false;
        params.spot.active = false;
        params.depth_of_field.enabled = false;
        let mut camera = FlyCamera::default();
        renderer.render_frame(&mut params, &mut camera, &view, None).unwrap();

        let composite = read_rgba8(&device, &queue, &back_buffer, config.width, config.height);
        let screen_texture = renderer.targets.screen.texture();
        let screen = read_rgba8(&device, &queue, screen_texture, config.width, config.height);
        assert_eq!(composite.len(), (config.width * config.height * 4) as usize);
        assert!(composite == screen, "composite differs from the scene image");
    }
}
