//! Frame planning without a GPU
//!
//! Plans frames through the standard pass graph and checks what every pass
//! records: ordering, draw counts, raster state and uniform contents.

use glam::Vec4;
use terrain_dof::graph::{Geometry, PassRecording, TargetId};
use terrain_dof::mesh::MeshId;
use terrain_dof::pipeline::{gpu_matrix, DrawParams, PipelineKind, RasterState};
use terrain_dof::{CameraSource, FlyCamera, FramePlanner, FrameParams, RendererConfig};

const HEIGHT_MAP_TEXEL: f32 = 1.0 / 256.0;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn plan(params: &FrameParams) -> Vec<PassRecording> {
    init_logging();
    let mut planner = FramePlanner::new(RendererConfig::default(), HEIGHT_MAP_TEXEL).unwrap();
    planner.plan(params, &FlyCamera::default()).unwrap()
}

fn pass<'a>(plan: &'a [PassRecording], name: &str) -> &'a PassRecording {
    plan.iter()
        .find(|r| r.pass == name)
        .unwrap_or_else(|| panic!("no pass named {}", name))
}

fn position(plan: &[PassRecording], name: &str) -> usize {
    plan.iter().position(|r| r.pass == name).unwrap()
}

#[test]
fn passes_run_in_dependency_order() {
    let plan = plan(&FrameParams::default());
    let names: Vec<&str> = plan.iter().map(|r| r.pass.as_str()).collect();
    assert_eq!(
        names,
        vec!["shadow_directional", "shadow_spot", "camera_depth", "scene", "blur", "composite"]
    );

    let scene = position(&plan, "scene");
    assert!(position(&plan, "shadow_directional") < scene);
    assert!(position(&plan, "shadow_spot") < scene);
    assert!(position(&plan, "camera_depth") < scene);
    assert!(scene < position(&plan, "blur"));
    assert!(position(&plan, "blur") < position(&plan, "composite"));
}

#[test]
fn passes_write_their_own_targets() {
    let plan = plan(&FrameParams::default());
    assert_eq!(pass(&plan, "shadow_directional").target, TargetId::ShadowMap(0));
    assert_eq!(pass(&plan, "shadow_spot").target, TargetId::ShadowMap(1));
    assert_eq!(pass(&plan, "camera_depth").target, TargetId::CameraDepth);
    assert_eq!(pass(&plan, "scene").target, TargetId::Screen);
    assert_eq!(pass(&plan, "blur").target, TargetId::Blur);
    assert_eq!(pass(&plan, "composite").target, TargetId::BackBuffer);
}

#[test]
fn no_draw_samples_the_target_it_renders_into() {
    let mut params = FrameParams::default();
    params.wireframe = true;
    for recording in plan(&params) {
        for draw in &recording.draws {
            assert!(
                !draw.kind().sampled_targets().contains(&recording.target),
                "{} samples its own target",
                recording.pass
            );
        }
    }
}

#[test]
fn depth_passes_draw_plane_and_cube() {
    let plan = plan(&FrameParams::default());
    for name in ["shadow_directional", "shadow_spot", "camera_depth"] {
        let recording = pass(&plan, name);
        let kinds: Vec<PipelineKind> = recording.draws.iter().map(|d| d.kind()).collect();
        assert_eq!(kinds, vec![PipelineKind::DepthTessellated, PipelineKind::Depth], "{}", name);
        assert_eq!(recording.draws[0].geometry, Geometry::Surface);
        assert_eq!(recording.draws[1].geometry, Geometry::Mesh(MeshId::Cube));
    }

    assert_eq!(pass(&plan, "shadow_directional").clear_color, None);
    assert_eq!(pass(&plan, "camera_depth").clear_color, Some([1.0; 4]));
}

#[test]
fn scene_draws_markers_only_for_active_lights() {
    let plan_all = plan(&FrameParams::default());
    let scene = pass(&plan_all, "scene");
    assert_eq!(scene.clear_color, Some([0.39, 0.58, 0.92, 1.0]));
    assert_eq!(scene.draws[0].kind(), PipelineKind::Terrain);
    assert_eq!(scene.draws_with(Geometry::Mesh(MeshId::PointMarker)).count(), 1);
    assert_eq!(scene.draws_with(Geometry::Mesh(MeshId::SpotMarker)).count(), 1);
    assert_eq!(scene.draws_with(Geometry::Mesh(MeshId::Cube)).count(), 1);

    let mut params = FrameParams::default();
    params.point.active = false;
    let plan_no_point = plan(&params);
    let scene = pass(&plan_no_point, "scene");
    assert_eq!(scene.draws_with(Geometry::Mesh(MeshId::PointMarker)).count(), 0);
    assert_eq!(scene.draws_with(Geometry::Mesh(MeshId::SpotMarker)).count(), 1);
    assert_eq!(scene.draws_of(PipelineKind::Basic).count(), 2);
}

#[test]
fn wireframe_adds_one_plane_draw_to_the_composite() {
    let solid = plan(&FrameParams::default());
    let wire = plan(&FrameParams {
        wireframe: true,
        ..Default::default()
    });

    let solid_composite = pass(&solid, "composite");
    let wire_composite = pass(&wire, "composite");
    assert_eq!(wire_composite.draws.len(), solid_composite.draws.len() + 1);

    let extra: Vec<_> = wire_composite.draws_with(Geometry::Surface).collect();
    assert_eq!(extra.len(), 1);
    assert_eq!(extra[0].kind(), PipelineKind::Terrain);
    assert!(extra[0].raster.contains(RasterState::WIREFRAME | RasterState::DEPTH_TEST));
    assert_eq!(solid_composite.draws_with(Geometry::Surface).count(), 0);

    // Nothing else in the frame changes
    assert_eq!(pass(&solid, "scene"), pass(&wire, "scene"));
    assert_eq!(pass(&solid, "blur"), pass(&wire, "blur"));
    assert!(pass(&wire, "scene").draws.iter().all(|d| !d.raster.contains(RasterState::WIREFRAME)));
}

#[test]
fn screen_quads_ignore_the_depth_buffer() {
    let plan = plan(&FrameParams::default());
    let blur = pass(&plan, "blur");
    assert_eq!(blur.draws.len(), 1);
    assert_eq!(blur.draws[0].geometry, Geometry::Mesh(MeshId::ScreenQuad));
    assert!(!blur.draws[0].raster.contains(RasterState::DEPTH_TEST));
    assert_eq!(blur.clear_color, Some([0.0, 0.0, 0.0, 1.0]));

    let composite = pass(&plan, "composite");
    let dof: Vec<_> = composite.draws_of(PipelineKind::DepthOfField).collect();
    assert_eq!(dof.len(), 1);
    assert!(!dof[0].raster.contains(RasterState::DEPTH_TEST));
}

#[test]
fn directional_only_without_depth_of_field_passes_the_sharp_image_through() {
    let mut params = FrameParams::default();
    params.point.active = false;
    params.spot.active = false;
    params.depth_of_field.enabled = false;
    let plan = plan(&params);

    let composite = pass(&plan, "composite");
    let Some(DrawParams::DepthOfField(dof)) = composite.draws.last().map(|d| &d.params) else {
        panic!("composite does not end with the depth-of-field quad");
    };
    assert_eq!(dof.uniforms().active, 0);

    let sharp = Vec4::new(0.2, 0.4, 0.6, 1.0);
    let blurred = Vec4::new(0.9, 0.1, 0.3, 1.0);
    for depth in [0.0, 0.3, 0.999] {
        assert_eq!(dof.shade(sharp, blurred, depth, 0.5), sharp);
    }

    let scene = pass(&plan, "scene");
    let Some(DrawParams::Terrain(terrain)) = scene.draws.first().map(|d| &d.params) else {
        panic!("scene does not start with the terrain");
    };
    let enabled: Vec<u32> = terrain.uniforms().lighting.lights[..3].iter().map(|l| l.active).collect();
    assert_eq!(enabled, vec![1, 0, 0]);
}

#[test]
fn terrain_uniforms_follow_the_frame() {
    let camera = FlyCamera::default();
    let mut params = FrameParams::default();
    params.tessellation_factor = 0;
    params.bump_mapping = false;
    let plan = plan(&params);

    let scene = pass(&plan, "scene");
    let Some(DrawParams::Terrain(terrain)) = scene.draws.first().map(|d| &d.params) else {
        panic!("scene does not start with the terrain");
    };
    let uniforms = terrain.uniforms();
    assert_eq!(uniforms.tessellation.factor, 1.0);
    assert_eq!(uniforms.tessellation.height_scale, 15.0);
    assert_eq!(uniforms.tessellation.texel_size, HEIGHT_MAP_TEXEL);
    assert_eq!(uniforms.lighting.bump_mapping, 0);
    assert_eq!(uniforms.transforms.view, gpu_matrix(camera.view_matrix()));
    assert_eq!(uniforms.lighting.camera_position, camera.position().to_array());
    assert_eq!(scene.draws[0].params.tessellation_factor(), Some(1));
}
