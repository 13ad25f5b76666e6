//! Tests that need a display and an OpenGL driver.
//!
//! SDL may only be initialised from one thread at a time, so everything runs
//! inside a single test on one window. Run with `cargo test -- --ignored`.

use std::path::Path;

use glam::Vec3;
use glow::HasContext;
use orbitcube::{
    abs::{
        app::{App, WindowConfig},
        mesh::{ColoredVertex, Mesh, Primitive},
        shader::ShaderProgram,
        texture::Texture,
    },
    assets::{self, Assets},
    camera::Camera,
    error::ShaderError,
    renderer::Renderer,
};

fn hidden_app() -> App {
    App::new(&WindowConfig {
        title: "orbitcube test".to_string(),
        width: 64,
        height: 64,
        fullscreen: false,
        // goes through the multisample negotiation, which drops the first window
        samples: 4,
        forward_compatible: false,
        disable_vsync: false,
    })
    .expect("could not create OpenGL context")
}

fn crate_assets() -> Assets {
    Assets::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"))
}

fn shader_sources(app: &App) -> (&'static str, &'static str) {
    if app.caps.version >= 33 {
        (assets::CUBE_VERTEX_330, assets::CUBE_FRAGMENT_330)
    } else {
        (assets::CUBE_VERTEX_120, assets::CUBE_FRAGMENT_120)
    }
}

#[test]
#[ignore = "needs a display"]
fn gl_resources_on_one_context() {
    let app = hidden_app();
    assert!(app.samples <= 4);

    shader_reload_releases_previous_program(&app);
    shader_load_reports_both_stages(&app);
    texture_loads_at_a_supported_size(&app);
    mesh_leaves_no_vertex_array_bound(&app);
    renderer_points_the_camera_at_the_cube(&app);
}

fn shader_reload_releases_previous_program(app: &App) {
    let assets = crate_assets();
    let (vertex, fragment) = shader_sources(app);

    let mut program = ShaderProgram::new(&app.gl);
    assert!(program.handle().is_none());

    program
        .load(&assets.path(vertex), &assets.path(fragment))
        .unwrap();
    let first = program.handle().unwrap();

    program
        .load(&assets.path(vertex), &assets.path(fragment))
        .unwrap();
    assert!(program.handle().is_some());
    assert!(unsafe { !app.gl.is_program(first) });

    // a failed reload leaves the program unloaded
    let second = program.handle().unwrap();
    let missing = assets.path("shaders/missing.vert");
    assert_eq!(
        program.load(&missing, &assets.path(fragment)).unwrap_err().len(),
        1
    );
    assert!(program.handle().is_none());
    assert!(unsafe { !app.gl.is_program(second) });

    program
        .load(&assets.path(vertex), &assets.path(fragment))
        .unwrap();
    program.delete();
    assert!(program.handle().is_none());
}

fn shader_load_reports_both_stages(app: &App) {
    let assets = crate_assets();
    let mut program = ShaderProgram::new(&app.gl);

    let errors = program
        .load(
            &assets.path("shaders/missing.vert"),
            &assets.path("shaders/missing.frag"),
        )
        .unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ShaderError::Read { .. }))
    );
    assert!(program.handle().is_none());
}

fn texture_loads_at_a_supported_size(app: &App) {
    let texture = Texture::load(&app.gl, &crate_assets().path(assets::TEXTURE), &app.caps).unwrap();
    assert_eq!((texture.width(), texture.height()), (256, 256));
    assert!(texture.width() <= app.caps.max_texture_size);
    texture.delete();
}

fn mesh_leaves_no_vertex_array_bound(app: &App) {
    let vertices = [
        ColoredVertex {
            position: Vec3::ZERO,
            color: [1.0, 0.0, 0.0, 1.0],
        },
        ColoredVertex {
            position: Vec3::X,
            color: [1.0, 0.0, 0.0, 1.0],
        },
    ];
    let use_vao = app.caps.vertex_array_objects;
    let mesh = Mesh::new(&app.gl, &vertices, Primitive::Lines, use_vao).unwrap();
    assert_eq!(mesh.vertex_count(), 2);
    if use_vao {
        let bound = unsafe { app.gl.get_parameter_i32(glow::VERTEX_ARRAY_BINDING) };
        assert_eq!(bound, 0);
    }
    mesh.draw();
}

fn renderer_points_the_camera_at_the_cube(app: &App) {
    let mut camera = Camera::new();
    let mut renderer = Renderer::new(&app.gl, &app.caps, &crate_assets(), &mut camera).unwrap();
    assert!(renderer.show_axis_grid);
    assert!(!renderer.paused);

    renderer.resize(64, 64);
    renderer.render(0.016, &camera);
    assert!(camera.reference.abs_diff_eq(Vec3::new(1.75, 1.75, 5.0), 1e-5));
}
