//! The spinning cube scene.
//!
//! [`Renderer`] owns every GPU resource of the demo: the gold texture, the
//! cube and line shader programs and the three meshes (cube, axes, grid).

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};
use glow::HasContext;

use crate::{
    abs::{
        caps::GlCaps,
        mesh::{ColoredVertex, Mesh, Primitive, TexturedVertex},
        shader::ShaderProgram,
        texture::Texture,
    },
    assets::{self, Assets},
    camera::Camera,
    error::{AssetError, StartupError},
};

/// Degrees per second.
const ROTATION_SPEED: f32 = 11.25;
const FIELD_OF_VIEW: f32 = 45.0;
const NEAR: f32 = 0.125;
const FAR: f32 = 512.0;
const GRID_EXTENT: i32 = 50;

const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

pub struct Renderer {
    gl: Arc<glow::Context>,
    texture: Texture,
    cube_shader: ShaderProgram,
    lines_shader: ShaderProgram,
    cube: Mesh,
    axes: Mesh,
    grid: Mesh,
    projection: Mat4,
    /// Degrees.
    angle: f32,
    wide_lines: bool,
    /// Draw the axis and grid overlay.
    pub show_axis_grid: bool,
    /// Freeze the cube's rotation.
    pub paused: bool,
}

impl Renderer {
    /// Loads the scene's assets and points `camera` at the cube.
    ///
    /// Every asset is attempted before failing, so the error lists all of the
    /// files that could not be loaded.
    pub fn new(
        gl: &Arc<glow::Context>,
        caps: &GlCaps,
        assets: &Assets,
        camera: &mut Camera,
    ) -> Result<Self, StartupError> {
        // shader programs
        if !caps.at_least(2, 1) {
            return Err(StartupError::UnsupportedVersion {
                required: 21,
                found: caps.version,
            });
        }

        let mut errors = Vec::new();

        let texture = Texture::load(gl, &assets.path(assets::TEXTURE), caps)
            .map_err(|e| errors.push(AssetError::from(e)))
            .ok();

        let (cube_vertex, cube_fragment, lines_vertex, lines_fragment) = if caps.at_least(3, 3) {
            (
                assets::CUBE_VERTEX_330,
                assets::CUBE_FRAGMENT_330,
                assets::LINES_VERTEX_330,
                assets::LINES_FRAGMENT_330,
            )
        } else {
            (
                assets::CUBE_VERTEX_120,
                assets::CUBE_FRAGMENT_120,
                assets::LINES_VERTEX_120,
                assets::LINES_FRAGMENT_120,
            )
        };

        let mut cube_shader = ShaderProgram::new(gl);
        if let Err(e) = cube_shader.load(&assets.path(cube_vertex), &assets.path(cube_fragment)) {
            errors.extend(e.into_iter().map(AssetError::from));
        }
        let mut lines_shader = ShaderProgram::new(gl);
        if let Err(e) = lines_shader.load(&assets.path(lines_vertex), &assets.path(lines_fragment))
        {
            errors.extend(e.into_iter().map(AssetError::from));
        }

        let texture = match texture {
            Some(texture) if errors.is_empty() => texture,
            _ => return Err(StartupError::Assets(errors)),
        };

        let use_vao = caps.vertex_array_objects;
        let cube = Mesh::new(gl, &cube_vertices(), Primitive::Quads, use_vao)
            .map_err(StartupError::Mesh)?;
        let axes = Mesh::new(gl, &axis_vertices(), Primitive::Lines, use_vao)
            .map_err(StartupError::Mesh)?;
        let grid = Mesh::new(gl, &grid_vertices(), Primitive::Lines, use_vao)
            .map_err(StartupError::Mesh)?;
        log::debug!(
            "uploaded {} cube, {} axis and {} grid vertices",
            cube.vertex_count(),
            axes.vertex_count(),
            grid.vertex_count()
        );

        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.enable(glow::CULL_FACE);
            gl.cull_face(glow::BACK);
            gl.front_face(glow::CCW);
            gl.clear_color(0.0, 0.0, 0.0, 1.0);
        }

        camera.look_at(Vec3::ZERO, Vec3::new(1.75, 1.75, 5.0), false);

        Ok(Self {
            gl: Arc::clone(gl),
            texture,
            cube_shader,
            lines_shader,
            cube,
            axes,
            grid,
            projection: projection(1, 1),
            angle: 0.0,
            wide_lines: !caps.forward_compatible,
            show_axis_grid: true,
            paused: false,
        })
    }

    /// Updates the viewport and projection for a `width`x`height` client area.
    pub fn resize(&mut self, width: u32, height: u32) {
        unsafe {
            self.gl.viewport(0, 0, width as i32, height as i32);
        }
        self.projection = projection(width, height);
    }

    /// Draws one frame and advances the rotation by `frame_time` seconds.
    pub fn render(&mut self, frame_time: f32, camera: &Camera) {
        let view = camera.view();

        unsafe {
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        if self.show_axis_grid {
            self.lines_shader.use_program();
            self.lines_shader.set_uniform("u_projection", self.projection);
            self.lines_shader.set_uniform("u_view", view);

            self.set_line_width(2.0);
            self.axes.draw();
            self.set_line_width(1.0);
            self.grid.draw();

            self.lines_shader.unbind();
        }

        let model = model_matrix(self.angle);
        if !self.paused {
            self.angle = (self.angle + ROTATION_SPEED * frame_time) % 360.0;
        }

        self.texture.bind(0);
        self.cube_shader.use_program();
        self.cube_shader.set_uniform("u_projection", self.projection);
        self.cube_shader.set_uniform("u_view", view);
        self.cube_shader.set_uniform("u_model", model);
        self.cube_shader.set_uniform("u_texture", 0);

        self.cube.draw();

        self.cube_shader.unbind();
        self.texture.unbind();
    }

    /// Wide lines are not available in forward compatible contexts.
    fn set_line_width(&self, width: f32) {
        if self.wide_lines {
            unsafe {
                self.gl.line_width(width);
            }
        }
    }
}

/// Perspective projection for a `width`x`height` viewport.
pub fn projection(width: u32, height: u32) -> Mat4 {
    let aspect = width as f32 / height.max(1) as f32;
    Mat4::perspective_rh_gl(FIELD_OF_VIEW.to_radians(), aspect, NEAR, FAR)
}

/// The cube's model matrix after rotating `angle` degrees about Y and X.
pub fn model_matrix(angle: f32) -> Mat4 {
    let radians = angle.to_radians();
    Mat4::from_rotation_y(radians) * Mat4::from_rotation_x(radians)
}

/// Unit cube centred on the origin, four counter-clockwise vertices per face.
pub fn cube_vertices() -> [TexturedVertex; 24] {
    const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [
                [-0.5, -0.5, 0.5],
                [0.5, -0.5, 0.5],
                [0.5, 0.5, 0.5],
                [-0.5, 0.5, 0.5],
            ],
        ),
        (
            [0.0, 0.0, -1.0],
            [
                [0.5, -0.5, -0.5],
                [-0.5, -0.5, -0.5],
                [-0.5, 0.5, -0.5],
                [0.5, 0.5, -0.5],
            ],
        ),
        (
            [1.0, 0.0, 0.0],
            [
                [0.5, -0.5, 0.5],
                [0.5, -0.5, -0.5],
                [0.5, 0.5, -0.5],
                [0.5, 0.5, 0.5],
            ],
        ),
        (
            [-1.0, 0.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [-0.5, -0.5, 0.5],
                [-0.5, 0.5, 0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        (
            [0.0, 1.0, 0.0],
            [
                [-0.5, 0.5, 0.5],
                [0.5, 0.5, 0.5],
                [0.5, 0.5, -0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        (
            [0.0, -1.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [0.5, -0.5, -0.5],
                [0.5, -0.5, 0.5],
                [-0.5, -0.5, 0.5],
            ],
        ),
    ];
    const TEXCOORDS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    std::array::from_fn(|i| {
        let (normal, corners) = FACES[i / 4];
        TexturedVertex {
            position: Vec3::from_array(corners[i % 4]),
            normal: Vec3::from_array(normal),
            texcoord: Vec2::from_array(TEXCOORDS[i % 4]),
        }
    })
}

/// The three unit axes, each followed by its letter drawn with line segments.
pub fn axis_vertices() -> Vec<ColoredVertex> {
    let x: [[f32; 3]; 6] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 0.1, 0.0],
        [1.1, -0.1, 0.0],
        [1.1, 0.1, 0.0],
        [1.0, -0.1, 0.0],
    ];
    let y: [[f32; 3]; 8] = [
        [0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [-0.05, 1.25, 0.0],
        [0.0, 1.15, 0.0],
        [0.05, 1.25, 0.0],
        [0.0, 1.15, 0.0],
        [0.0, 1.15, 0.0],
        [0.0, 1.05, 0.0],
    ];
    let z: [[f32; 3]; 8] = [
        [0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0],
        [-0.05, 0.1, 1.05],
        [0.05, 0.1, 1.05],
        [0.05, 0.1, 1.05],
        [-0.05, -0.1, 1.05],
        [-0.05, -0.1, 1.05],
        [0.05, -0.1, 1.05],
    ];

    let colored = |points: &[[f32; 3]], color: [f32; 4]| {
        points
            .iter()
            .map(move |&p| ColoredVertex {
                position: Vec3::from_array(p),
                color,
            })
            .collect::<Vec<_>>()
    };

    let mut vertices = colored(&x, RED);
    vertices.extend(colored(&y, GREEN));
    vertices.extend(colored(&z, BLUE));
    vertices
}

/// One-unit grid on the y = 0 plane.
pub fn grid_vertices() -> Vec<ColoredVertex> {
    let d = GRID_EXTENT as f32;
    (-GRID_EXTENT..=GRID_EXTENT)
        .flat_map(|i| {
            let i = i as f32;
            [
                Vec3::new(i, 0.0, -d),
                Vec3::new(i, 0.0, d),
                Vec3::new(-d, 0.0, i),
                Vec3::new(d, 0.0, i),
            ]
        })
        .map(|position| ColoredVertex {
            position,
            color: WHITE,
        })
        .collect()
}
