//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL shaders.
//! This module also provides the [`Uniform`] trait for setting uniform variables in shader
//! programs.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use glam::Mat4;
use glow::HasContext;

use crate::error::ShaderError;

/// Attribute locations bound before every link, shared by all vertex layouts.
pub const ATTRIBUTE_BINDINGS: [(u32, &str); 4] = [
    (0, "a_position"),
    (1, "a_normal"),
    (2, "a_texcoord"),
    (3, "a_color"),
];

/// Represents an individual OpenGL shader.
pub struct Shader {
    gl: Arc<glow::Context>,
    id: glow::Shader,
}

impl Shader {
    /// Compiles a new shader from the given source code.
    ///
    /// On failure the driver's info log is returned.
    pub fn new(gl: &Arc<glow::Context>, shader_type: u32, source: &str) -> Result<Self, String> {
        unsafe {
            let shader = gl.create_shader(shader_type)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(log);
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: shader,
            })
        }
    }

    /// Reads `path` and compiles it as a `shader_type` shader.
    pub fn from_file(
        gl: &Arc<glow::Context>,
        shader_type: u32,
        path: &Path,
    ) -> Result<Self, ShaderError> {
        let source = read_source(path)?;
        Self::new(gl, shader_type, &source).map_err(|log| ShaderError::Compile {
            path: path.to_path_buf(),
            log,
        })
    }

    /// The driver id of this shader.
    pub fn handle(&self) -> glow::Shader {
        self.id
    }
}

/// Reads a shader source file.
pub fn read_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Joins two independent results, keeping the errors of both.
fn both<A, B>(
    a: Result<A, ShaderError>,
    b: Result<B, ShaderError>,
) -> Result<(A, B), Vec<ShaderError>> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (a, b) => Err(a.err().into_iter().chain(b.err()).collect()),
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
    }
}

/// Represents a uniform variable in a shader program.
pub trait Uniform {
    /// Sets the value of the uniform variable in the given shader program.
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str);
}

impl Uniform for i32 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            let location = gl.get_uniform_location(program, name);
            if let Some(loc) = location {
                gl.uniform_1_i32(Some(&loc), *self);
            }
        }
    }
}

impl Uniform for Mat4 {
    fn set_uniform(&self, gl: &glow::Context, program: glow::Program, name: &str) {
        unsafe {
            let location = gl.get_uniform_location(program, name);
            if let Some(loc) = location {
                gl.uniform_matrix_4_f32_slice(Some(&loc), false, self.as_ref());
            }
        }
    }
}

/// An OpenGL program linked from a vertex and a fragment shader file.
///
/// The program is either unloaded ([`ShaderProgram::handle`] is `None`) or
/// fully linked; a failed [`ShaderProgram::load`] leaves it unloaded.
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    id: Option<glow::Program>,
}

impl ShaderProgram {
    /// Creates an unloaded program.
    pub fn new(gl: &Arc<glow::Context>) -> Self {
        Self {
            gl: Arc::clone(gl),
            id: None,
        }
    }

    /// Compiles both stages and links them, replacing any program loaded before.
    ///
    /// Both stages are always compiled, so a failure reports every broken
    /// stage at once.
    pub fn load(
        &mut self,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Result<(), Vec<ShaderError>> {
        self.delete();

        let (vertex, fragment) = both(
            Shader::from_file(&self.gl, glow::VERTEX_SHADER, vertex_path),
            Shader::from_file(&self.gl, glow::FRAGMENT_SHADER, fragment_path),
        )?;

        let program = self
            .link(&vertex, &fragment, vertex_path, fragment_path)
            .map_err(|e| vec![e])?;
        self.id = Some(program);

        log::debug!("linked shader program {vertex_path:?} + {fragment_path:?}");
        Ok(())
    }

    fn link(
        &self,
        vertex: &Shader,
        fragment: &Shader,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Result<glow::Program, ShaderError> {
        unsafe {
            let program = self.gl.create_program().map_err(ShaderError::Create)?;

            self.gl.attach_shader(program, vertex.handle());
            self.gl.attach_shader(program, fragment.handle());
            for (index, name) in ATTRIBUTE_BINDINGS {
                self.gl.bind_attrib_location(program, index, name);
            }

            self.gl.link_program(program);

            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(ShaderError::Link {
                    vertex: PathBuf::from(vertex_path),
                    fragment: PathBuf::from(fragment_path),
                    log,
                });
            }

            self.gl.detach_shader(program, vertex.handle());
            self.gl.detach_shader(program, fragment.handle());
            Ok(program)
        }
    }

    /// The linked program, or `None` while unloaded.
    pub fn handle(&self) -> Option<glow::Program> {
        self.id
    }

    /// Binds the shader program for use. Does nothing while unloaded.
    pub fn use_program(&self) {
        if let Some(id) = self.id {
            unsafe {
                self.gl.use_program(Some(id));
            }
        }
    }

    /// Unbinds whatever program is current.
    pub fn unbind(&self) {
        unsafe {
            self.gl.use_program(None);
        }
    }

    /// Sets a uniform variable in the shader program.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) {
        if let Some(id) = self.id {
            value.set_uniform(&self.gl, id, name);
        }
    }

    /// Releases the program and returns to the unloaded state.
    pub fn delete(&mut self) {
        if let Some(id) = self.id.take() {
            unsafe {
                self.gl.delete_program(id);
            }
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.delete();
    }
}
