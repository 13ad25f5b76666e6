//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2 window
//! and the OpenGL context, and the bootstrap sequence that negotiates
//! multisampling and optionally upgrades to a forward compatible context.

use std::sync::Arc;

use glow::HasContext;
use sdl2::video::{FullscreenType, GLContext, GLProfile, SwapInterval, Window};

use super::caps::{GlCaps, parse_gl_version, split_gl_version};
use crate::error::HostError;

/// What the host should create.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    /// Requested MSAA sample count; 0 disables multisampling.
    pub samples: u8,
    pub forward_compatible: bool,
    pub disable_vsync: bool,
}

/// A window with a current OpenGL context.
///
/// The window starts hidden; call [`App::show`] once the renderer is ready.
/// Fields are declared so that the context is dropped before its window.
pub struct App {
    pub gl: Arc<glow::Context>,
    pub gl_context: GLContext,
    pub window: Window,
    pub event_pump: sdl2::EventPump,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub sdl: sdl2::Sdl,
    pub caps: GlCaps,
    /// Sample count that was actually obtained.
    pub samples: u8,
    /// Whether the display mode was switched to fullscreen.
    pub fullscreen: bool,
    width: u32,
    height: u32,
}

/// Window and context built for one attribute set.
///
/// Fields drop in declaration order, so the context goes before its window.
struct Surface {
    gl: glow::Context,
    gl_context: GLContext,
    window: Window,
    fullscreen: bool,
}

impl App {
    /// Creates the window and OpenGL context described by `config`.
    pub fn new(config: &WindowConfig) -> Result<Self, HostError> {
        let sdl = sdl2::init().map_err(HostError::Init)?;
        let video_subsystem = sdl.video().map_err(HostError::Init)?;

        let mut surface = create_surface(&video_subsystem, config, 0)?;
        let mut samples = 0;

        if config.samples > 0 {
            if video_subsystem.gl_extension_supported("GL_ARB_multisample") {
                drop(surface);
                (surface, samples) = negotiate_multisampling(&video_subsystem, config)?;
            } else {
                log::warn!("GL_ARB_multisample is not supported, multisampling disabled");
            }
        }

        let version_string = unsafe { surface.gl.get_parameter_string(glow::VERSION) };
        let mut version = parse_gl_version(&version_string)
            .ok_or_else(|| HostError::Version(version_string.clone()))?;
        log::info!("OpenGL version {version_string}");

        let forward_compatible = config.forward_compatible && version >= 30;
        if forward_compatible {
            surface = upgrade_to_forward_compatible(&video_subsystem, surface, version)?;
            let upgraded = unsafe { surface.gl.get_parameter_string(glow::VERSION) };
            version = parse_gl_version(&upgraded).unwrap_or(version);
        } else if config.forward_compatible {
            log::warn!(
                "forward compatible context needs OpenGL 3.0, keeping the legacy {}.{} context",
                version / 10,
                version % 10
            );
        }

        let caps = GlCaps::query(&surface.gl, version, forward_compatible);
        log::info!(
            "renderer {:?}, max texture size {}, max anisotropy {}",
            caps.renderer,
            caps.max_texture_size,
            caps.max_anisotropy
        );

        if config.disable_vsync
            && let Err(e) = video_subsystem.gl_set_swap_interval(SwapInterval::Immediate)
        {
            log::warn!("could not disable vertical synchronization: {e}");
        }

        let event_pump = sdl.event_pump().map_err(HostError::EventPump)?;
        let Surface {
            window,
            gl_context,
            gl,
            fullscreen,
        } = surface;

        Ok(Self {
            gl: Arc::new(gl),
            gl_context,
            window,
            event_pump,
            video_subsystem,
            sdl,
            caps,
            samples,
            fullscreen,
            width: config.width,
            height: config.height,
        })
    }

    /// Sizes the client area to the requested size, centres and shows the window.
    pub fn show(&mut self, maximized: bool) {
        if !self.fullscreen {
            if let Err(e) = self.window.set_size(self.width, self.height) {
                log::warn!("could not resize window: {e}");
            }
            self.window.set_position(
                sdl2::video::WindowPos::Centered,
                sdl2::video::WindowPos::Centered,
            );
        }
        self.window.show();
        if !self.fullscreen && maximized {
            self.window.maximize();
        }
        self.window.raise();
    }

    /// Current drawable size in pixels.
    pub fn drawable_size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }

    /// Replaces the window title.
    pub fn set_title(&mut self, title: &str) {
        if let Err(e) = self.window.set_title(title) {
            log::warn!("could not set window title: {e}");
        }
    }

    /// Maximises a normal window or restores a maximised one.
    pub fn toggle_maximized(&mut self) {
        let maximized = (self.window.window_flags()
            & sdl2::sys::SDL_WindowFlags::SDL_WINDOW_MAXIMIZED as u32)
            != 0;
        if maximized {
            self.window.restore();
        } else {
            self.window.maximize();
        }
    }

    /// Whether the cursor is over the window.
    pub fn has_mouse_focus(&self) -> bool {
        (self.window.window_flags() & sdl2::sys::SDL_WindowFlags::SDL_WINDOW_MOUSE_FOCUS as u32)
            != 0
    }

    /// Drops out of fullscreen and minimises, used when focus is lost.
    pub fn leave_fullscreen(&mut self) {
        self.window.minimize();
        if let Err(e) = self.window.set_fullscreen(FullscreenType::Off) {
            log::warn!("could not restore the desktop display mode: {e}");
        }
    }

    /// Re-applies the fullscreen display mode after [`App::leave_fullscreen`].
    pub fn enter_fullscreen(&mut self) {
        if let Err(e) = self.window.set_fullscreen(FullscreenType::True) {
            log::warn!("could not re-enter fullscreen: {e}");
        }
        self.window.restore();
    }

    /// Captures or releases the mouse for mouse-look.
    pub fn set_mouse_captured(&self, captured: bool) {
        let mouse = self.sdl.mouse();
        mouse.set_relative_mouse_mode(captured);
        mouse.show_cursor(!captured);
    }

    /// Presents the back buffer.
    pub fn swap(&self) {
        self.window.gl_swap_window();
    }
}

/// Sets the attribute set every window is created with.
fn set_pixel_format(video: &sdl2::VideoSubsystem, samples: u8) {
    let gl_attr = video.gl_attr();
    gl_attr.set_red_size(8);
    gl_attr.set_green_size(8);
    gl_attr.set_blue_size(8);
    gl_attr.set_alpha_size(8);
    gl_attr.set_depth_size(24);
    gl_attr.set_double_buffer(true);
    gl_attr.set_multisample_buffers(u8::from(samples > 0));
    gl_attr.set_multisample_samples(samples);
    if samples > 0 {
        gl_attr.set_accelerated_visual(true);
    }
}

/// Creates a window and a legacy context with `samples` multisampling.
fn create_surface(
    video: &sdl2::VideoSubsystem,
    config: &WindowConfig,
    samples: u8,
) -> Result<Surface, HostError> {
    set_pixel_format(video, samples);

    let mut builder = video.window(&config.title, config.width, config.height);
    builder.opengl().hidden();
    if config.fullscreen {
        builder.borderless();
    } else {
        builder.resizable();
    }
    let mut window = builder.build()?;

    let mut fullscreen = false;
    if config.fullscreen {
        let mode = sdl2::video::DisplayMode::new(
            sdl2::pixels::PixelFormatEnum::RGB888,
            config.width as i32,
            config.height as i32,
            0,
        );
        fullscreen = window
            .set_display_mode(Some(mode))
            .and_then(|_| window.set_fullscreen(FullscreenType::True))
            .map_err(|e| log::warn!("fullscreen display mode rejected: {e}"))
            .is_ok();
    }

    let gl_context = window.gl_create_context().map_err(HostError::Context)?;
    window
        .gl_make_current(&gl_context)
        .map_err(HostError::MakeCurrent)?;
    let gl = load_gl(video);

    Ok(Surface {
        gl,
        gl_context,
        window,
        fullscreen,
    })
}

/// Recreates window and context with the highest sample count that works,
/// from `config.samples` down to 1, falling back to no multisampling.
fn negotiate_multisampling(
    video: &sdl2::VideoSubsystem,
    config: &WindowConfig,
) -> Result<(Surface, u8), HostError> {
    for samples in (1..=config.samples).rev() {
        match create_surface(video, config, samples) {
            Ok(surface) => {
                log::info!("using {samples}x multisampling");
                return Ok((surface, samples));
            }
            Err(e) => log::debug!("{samples}x multisampling unavailable: {e}"),
        }
    }
    log::warn!("no multisample pixel format found, multisampling disabled");
    Ok((create_surface(video, config, 0)?, 0))
}

/// Replaces the legacy context with a forward compatible one of the same version.
fn upgrade_to_forward_compatible(
    video: &sdl2::VideoSubsystem,
    surface: Surface,
    version: u32,
) -> Result<Surface, HostError> {
    let Surface {
        window,
        gl_context,
        gl,
        fullscreen,
    } = surface;
    drop(gl);
    drop(gl_context);

    let (major, minor) = split_gl_version(version);
    let gl_attr = video.gl_attr();
    gl_attr.set_context_version(major, minor);
    gl_attr.set_context_flags().forward_compatible().set();
    if version >= 32 {
        gl_attr.set_context_profile(GLProfile::Core);
    }

    let gl_context = window
        .gl_create_context()
        .map_err(|reason| HostError::ForwardCompatible {
            major,
            minor,
            reason,
        })?;
    window
        .gl_make_current(&gl_context)
        .map_err(HostError::MakeCurrent)?;
    log::info!("created forward compatible OpenGL {major}.{minor} context");

    Ok(Surface {
        gl: load_gl(video),
        gl_context,
        window,
        fullscreen,
    })
}

fn load_gl(video: &sdl2::VideoSubsystem) -> glow::Context {
    unsafe { glow::Context::from_loader_function(|s| video.gl_get_proc_address(s) as *const _) }
}
