//! Typed input events.
//!
//! SDL events are translated into [`InputEvent`] at a single boundary so the
//! viewer only deals with the handful of inputs the demo reacts to.

use std::ops::BitOr;

use sdl2::{
    event::{Event, WindowEvent},
    keyboard::{KeyboardState, Scancode},
    mouse::{MouseButton, MouseWheelDirection},
};

/// Keys with a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    F1,
    F2,
    F3,
    Space,
}

impl Key {
    pub fn from_scancode(scancode: Scancode) -> Option<Self> {
        match scancode {
            Scancode::Escape => Some(Self::Escape),
            Scancode::F1 => Some(Self::F1),
            Scancode::F2 => Some(Self::F2),
            Scancode::F3 => Some(Self::F3),
            Scancode::Space => Some(Self::Space),
            _ => None,
        }
    }
}

/// Mouse buttons the viewer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
    MouseButtonDown(Button),
    /// Relative motion in pixels.
    MouseMotion {
        dx: i32,
        dy: i32,
        right_held: bool,
    },
    /// Positive notches scroll away from the user.
    MouseWheel(i32),
    Resized {
        width: u32,
        height: u32,
    },
    FocusGained,
    FocusLost,
}

/// Translates an SDL event, dropping anything without a binding.
pub fn translate(event: &Event) -> Option<InputEvent> {
    match *event {
        Event::Quit { .. }
        | Event::Window {
            win_event: WindowEvent::Close,
            ..
        } => Some(InputEvent::Quit),
        Event::KeyDown {
            scancode: Some(scancode),
            repeat: false,
            ..
        } => Key::from_scancode(scancode).map(InputEvent::KeyDown),
        Event::MouseButtonDown { mouse_btn, .. } => match mouse_btn {
            MouseButton::Left => Some(InputEvent::MouseButtonDown(Button::Left)),
            MouseButton::Right => Some(InputEvent::MouseButtonDown(Button::Right)),
            _ => None,
        },
        Event::MouseMotion {
            mousestate,
            xrel,
            yrel,
            ..
        } if xrel != 0 || yrel != 0 => Some(InputEvent::MouseMotion {
            dx: xrel,
            dy: yrel,
            right_held: mousestate.right(),
        }),
        Event::MouseWheel { y, direction, .. } if y != 0 => match direction {
            MouseWheelDirection::Flipped => Some(InputEvent::MouseWheel(-y)),
            _ => Some(InputEvent::MouseWheel(y)),
        },
        Event::Window {
            win_event: WindowEvent::SizeChanged(width, height),
            ..
        } => Some(InputEvent::Resized {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
        }),
        Event::Window {
            win_event: WindowEvent::FocusGained,
            ..
        } => Some(InputEvent::FocusGained),
        Event::Window {
            win_event: WindowEvent::FocusLost,
            ..
        } => Some(InputEvent::FocusLost),
        _ => None,
    }
}

/// Held fly-camera keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlyKeys(u8);

impl FlyKeys {
    pub const NONE: Self = Self(0x00);
    pub const W: Self = Self(0x01);
    pub const S: Self = Self(0x02);
    pub const A: Self = Self(0x04);
    pub const D: Self = Self(0x08);
    pub const R: Self = Self(0x10);
    pub const F: Self = Self(0x20);
    pub const SHIFT: Self = Self(0x40);

    const MOVEMENT: u8 = 0x3F;

    /// Collects the held keys from `pressed`.
    pub fn from_pressed(pressed: impl Fn(Scancode) -> bool) -> Self {
        let bindings = [
            (Scancode::W, Self::W),
            (Scancode::S, Self::S),
            (Scancode::A, Self::A),
            (Scancode::D, Self::D),
            (Scancode::R, Self::R),
            (Scancode::F, Self::F),
            (Scancode::LShift, Self::SHIFT),
            (Scancode::RShift, Self::SHIFT),
        ];
        bindings
            .into_iter()
            .filter(|(scancode, _)| pressed(*scancode))
            .fold(Self::NONE, |keys, (_, key)| keys | key)
    }

    /// Reads the held keys from SDL's keyboard state.
    pub fn from_keyboard(state: &KeyboardState) -> Self {
        Self::from_pressed(|scancode| state.is_scancode_pressed(scancode))
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any key other than Shift is held.
    pub fn moves(self) -> bool {
        self.0 & Self::MOVEMENT != 0
    }
}

impl BitOr for FlyKeys {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
