//! The interactive viewer: window, camera and renderer plus the event loop
//! that ties them together.

use std::time::{Duration, Instant};

use crate::{
    abs::app::{App, WindowConfig},
    assets::Assets,
    camera::Camera,
    error::StartupError,
    input::{self, Button, FlyKeys, InputEvent, Key},
    renderer::Renderer,
};

/// Counts frames and measures frame times.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    start: Instant,
    last: Instant,
    frames: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frames: 0,
        }
    }

    /// Starts a new measurement from now.
    pub fn restart(&mut self) {
        *self = Self::new();
    }

    /// Returns the seconds since the previous tick, and the frame count once
    /// more than a second has passed since the last report.
    pub fn tick(&mut self) -> (f32, Option<u32>) {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> (f32, Option<u32>) {
        let frame_time = now.saturating_duration_since(self.last).as_secs_f32();
        self.last = now;

        if now.saturating_duration_since(self.start) > Duration::from_secs(1) {
            let fps = self.frames;
            self.frames = 0;
            self.start = now;
            (frame_time, Some(fps))
        } else {
            self.frames += 1;
            (frame_time, None)
        }
    }
}

/// The window caption with the current size, filtering settings and frame rate.
pub fn window_title(
    name: &str,
    width: u32,
    height: u32,
    anisotropy: i32,
    samples: u8,
    fps: u32,
    renderer: &str,
) -> String {
    format!("{name} - {width}x{height}, ATF {anisotropy}x, MSAA {samples}x, FPS: {fps} - {renderer}")
}

/// Owns everything the demo needs while running.
///
/// The renderer is declared first so its GPU objects are released while the
/// context is still alive.
pub struct Viewer {
    renderer: Renderer,
    camera: Camera,
    app: App,
    name: String,
    fps: FpsCounter,
    width: u32,
    height: u32,
    mouse_game_mode: bool,
    keyboard_focus: bool,
    mouse_focus: bool,
    de_fullscreened: bool,
}

impl Viewer {
    /// Creates the window and loads the scene. The window stays hidden until
    /// [`Viewer::show`].
    pub fn new(config: &WindowConfig, assets: &Assets) -> Result<Self, StartupError> {
        let app = App::new(config)?;
        let mut camera = Camera::new();
        let renderer = Renderer::new(&app.gl, &app.caps, assets, &mut camera)?;

        Ok(Self {
            renderer,
            camera,
            mouse_game_mode: app.fullscreen,
            app,
            name: config.title.clone(),
            fps: FpsCounter::new(),
            width: config.width,
            height: config.height,
            keyboard_focus: false,
            mouse_focus: false,
            de_fullscreened: false,
        })
    }

    /// Shows the window and takes keyboard and mouse focus.
    pub fn show(&mut self, maximized: bool) {
        self.app.show(maximized);

        let (width, height) = self.app.drawable_size();
        self.resize(width, height);
        self.fps.restart();

        self.keyboard_focus = true;
        self.mouse_focus = true;
        self.app.set_mouse_captured(self.mouse_game_mode);
    }

    /// Runs until the window is closed or Escape is pressed.
    pub fn run(&mut self) {
        'running: loop {
            let events: Vec<_> = self
                .app
                .event_pump
                .poll_iter()
                .filter_map(|event| input::translate(&event))
                .collect();

            for event in events {
                if !self.handle(event) {
                    break 'running;
                }
            }

            self.frame();
        }
        log::info!("quitting");
    }

    /// Reacts to one event; returns `false` to quit.
    fn handle(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Quit | InputEvent::KeyDown(Key::Escape) => return false,
            InputEvent::KeyDown(Key::F1) => {
                self.renderer.show_axis_grid = !self.renderer.show_axis_grid;
            }
            InputEvent::KeyDown(Key::F2) => {
                if !self.app.fullscreen && self.mouse_focus {
                    self.mouse_game_mode = !self.mouse_game_mode;
                    self.app.set_mouse_captured(self.mouse_game_mode);
                }
            }
            InputEvent::KeyDown(Key::F3) => {
                if !self.app.fullscreen {
                    self.app.toggle_maximized();
                }
            }
            InputEvent::KeyDown(Key::Space) => self.renderer.paused = !self.renderer.paused,
            InputEvent::MouseButtonDown(Button::Left | Button::Right) => self.take_mouse_focus(),
            InputEvent::MouseMotion { dx, dy, right_held } => {
                let looking = if self.mouse_game_mode {
                    self.mouse_focus
                } else {
                    right_held
                };
                if looking {
                    self.camera.on_mouse_move(-dx, -dy);
                }
            }
            InputEvent::MouseWheel(notches) => self.camera.on_mouse_wheel(notches),
            InputEvent::Resized { .. } => {
                let (width, height) = self.app.drawable_size();
                self.resize(width, height);
            }
            InputEvent::FocusLost => self.focus_lost(),
            InputEvent::FocusGained => self.focus_gained(),
        }
        true
    }

    fn frame(&mut self) {
        let (frame_time, fps) = self.fps.tick();

        if let Some(fps) = fps {
            let title = window_title(
                &self.name,
                self.width,
                self.height,
                self.app.caps.max_anisotropy,
                self.app.samples,
                fps,
                &self.app.caps.renderer,
            );
            self.app.set_title(&title);
        }

        if self.keyboard_focus {
            let keys = FlyKeys::from_keyboard(&self.app.event_pump.keyboard_state());
            if keys.moves() {
                let movement = self.camera.on_keys(keys, frame_time);
                self.camera.move_by(movement);
            }
        }

        self.renderer.render(frame_time, &self.camera);
        self.app.swap();
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.width == 0 && self.height == 0 {
            self.fps.restart();
        }
        self.width = width;
        self.height = height;
        self.renderer.resize(width, height);
    }

    fn take_mouse_focus(&mut self) {
        self.app.set_mouse_captured(self.mouse_game_mode);
        self.mouse_focus = true;
    }

    fn focus_lost(&mut self) {
        if self.mouse_focus && self.mouse_game_mode {
            self.app.set_mouse_captured(false);
        }
        self.keyboard_focus = false;
        self.mouse_focus = false;

        if self.app.fullscreen {
            log::debug!("focus lost, leaving fullscreen");
            self.app.leave_fullscreen();
            self.de_fullscreened = true;
        }
    }

    fn focus_gained(&mut self) {
        self.keyboard_focus = true;

        if self.de_fullscreened {
            log::debug!("focus regained, restoring fullscreen");
            self.app.enter_fullscreen();
            self.de_fullscreened = false;
        }

        if self.app.has_mouse_focus() {
            self.take_mouse_focus();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_lists_size_filtering_and_fps() {
        let title = window_title("OrbitCube", 800, 600, 16, 4, 144, "Mesa Intel(R) UHD Graphics");
        assert_eq!(
            title,
            "OrbitCube - 800x600, ATF 16x, MSAA 4x, FPS: 144 - Mesa Intel(R) UHD Graphics"
        );
    }

    #[test]
    fn fps_counter_measures_frame_time() {
        let mut counter = FpsCounter::new();
        let start = counter.last;
        let (frame_time, fps) = counter.tick_at(start + Duration::from_millis(250));
        assert!((frame_time - 0.25).abs() < 1e-6);
        assert_eq!(fps, None);
    }

    #[test]
    fn fps_counter_reports_after_a_second() {
        let mut counter = FpsCounter::new();
        let start = counter.start;
        for i in 1..=10 {
            let (_, fps) = counter.tick_at(start + Duration::from_millis(100 * i));
            assert_eq!(fps, None, "frame {i}");
        }
        let (frame_time, fps) = counter.tick_at(start + Duration::from_millis(1100));
        assert_eq!(fps, Some(10));
        assert!((frame_time - 0.1).abs() < 1e-6);

        // the count starts over after a report
        let (_, fps) = counter.tick_at(start + Duration::from_millis(1200));
        assert_eq!(fps, None);
        assert_eq!(counter.frames, 1);
    }
}
