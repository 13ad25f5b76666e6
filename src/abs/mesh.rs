//! Mesh management module.
//!
//! This module defines the [`Mesh`] struct for managing non-indexed vertex data on the GPU side.
//! Vertices should implement the [`Vertex`] trait.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use glow::HasContext;

/// Trait that defines the necessary methods for a vertex.
pub trait Vertex {
    /// Sets up the vertex attribute pointers for the vertex.
    fn vertex_attribs(gl: &glow::Context);

    /// Attribute locations enabled by [`Vertex::vertex_attribs`].
    fn attribute_locations() -> &'static [u32];
}

/// How the vertex list is assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Every two vertices form a line segment.
    Lines,
    /// Every four vertices form a convex quad, drawn as a triangle fan.
    Quads,
}

/// Position, normal and texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexturedVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub texcoord: Vec2,
}

impl Vertex for TexturedVertex {
    fn vertex_attribs(gl: &glow::Context) {
        let stride = std::mem::size_of::<Self>() as i32;
        unsafe {
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 12);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(2, 2, glow::FLOAT, false, stride, 24);
            gl.enable_vertex_attrib_array(2);
        }
    }

    fn attribute_locations() -> &'static [u32] {
        &[0, 1, 2]
    }
}

/// Position and RGBA colour.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoredVertex {
    pub position: Vec3,
    /// Plain array, `Vec4` is 16-byte aligned.
    pub color: [f32; 4],
}

impl Vertex for ColoredVertex {
    fn vertex_attribs(gl: &glow::Context) {
        let stride = std::mem::size_of::<Self>() as i32;
        unsafe {
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(3, 4, glow::FLOAT, false, stride, 12);
            gl.enable_vertex_attrib_array(3);
        }
    }

    fn attribute_locations() -> &'static [u32] {
        &[0, 3]
    }
}

/// Represents a mesh stored on the GPU side.
///
/// Without vertex array object support the attribute pointers are set up on every draw.
pub struct Mesh {
    gl: Arc<glow::Context>,
    primitive: Primitive,
    vao: Option<glow::VertexArray>,
    vbo: glow::Buffer,
    vertex_count: usize,
    attribs: fn(&glow::Context),
    locations: &'static [u32],
}

impl Mesh {
    /// Uploads `vertices` into a static vertex buffer.
    pub fn new<V: Vertex>(
        gl: &Arc<glow::Context>,
        vertices: &[V],
        primitive: Primitive,
        use_vao: bool,
    ) -> Result<Self, String> {
        unsafe {
            let vao = if use_vao {
                let vao = gl.create_vertex_array()?;
                gl.bind_vertex_array(Some(vao));
                Some(vao)
            } else {
                None
            };
            let vbo = gl.create_buffer().inspect_err(|_| {
                if let Some(vao) = vao {
                    gl.bind_vertex_array(None);
                    gl.delete_vertex_array(vao);
                }
            })?;

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                std::slice::from_raw_parts(
                    vertices.as_ptr() as *const u8,
                    std::mem::size_of_val(vertices),
                ),
                glow::STATIC_DRAW,
            );

            if vao.is_some() {
                V::vertex_attribs(gl);
                gl.bind_vertex_array(None);
            }
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            Ok(Self {
                gl: Arc::clone(gl),
                primitive,
                vao,
                vbo,
                vertex_count: vertices.len(),
                attribs: V::vertex_attribs,
                locations: V::attribute_locations(),
            })
        }
    }

    /// Draws the mesh.
    pub fn draw(&self) {
        unsafe {
            match self.vao {
                Some(vao) => self.gl.bind_vertex_array(Some(vao)),
                None => {
                    self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
                    (self.attribs)(&self.gl);
                }
            }

            match self.primitive {
                Primitive::Lines => {
                    self.gl
                        .draw_arrays(glow::LINES, 0, self.vertex_count as i32);
                }
                Primitive::Quads => {
                    for first in (0..self.vertex_count).step_by(4) {
                        self.gl.draw_arrays(glow::TRIANGLE_FAN, first as i32, 4);
                    }
                }
            }

            match self.vao {
                Some(_) => self.gl.bind_vertex_array(None),
                None => {
                    for &location in self.locations {
                        self.gl.disable_vertex_attrib_array(location);
                    }
                    self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
                }
            }
        }
    }

    /// Returns the amount of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            if let Some(vao) = self.vao {
                self.gl.delete_vertex_array(vao);
            }
        }
    }
}
