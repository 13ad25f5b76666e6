//! Orbit and fly camera.
//!
//! The camera keeps an orthonormal frame `x` (right), `y` (up) and `z`
//! (backwards, from the reference point towards the eye) plus the reference
//! point it orbits and the eye position. Every operation updates the frame and
//! recomputes the view matrix.

use glam::{Mat4, Quat, Vec3, Vec4};

use crate::input::FlyKeys;

/// Degrees of rotation per pixel of mouse movement.
const MOUSE_SENSITIVITY: f32 = 0.25;
/// Units per second, doubled while Shift is held.
const FLY_SPEED: f32 = 5.0;
/// Offset of the eye from the reference when not orbiting.
const EYE_OFFSET: f32 = 0.05;
const MIN_DISTANCE: f32 = 0.05;
const MAX_DISTANCE: f32 = 500.0;
const ZOOM_STEP: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
    pub reference: Vec3,
    pub position: Vec3,
    view: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    /// Looks down -Z at the origin from five units away.
    pub fn new() -> Self {
        let mut camera = Self {
            x: Vec3::X,
            y: Vec3::Y,
            z: Vec3::Z,
            reference: Vec3::ZERO,
            position: Vec3::new(0.0, 0.0, 5.0),
            view: Mat4::IDENTITY,
        };
        camera.calculate_view_matrix();
        camera
    }

    /// The current world-to-eye transform.
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Distance between the eye and the reference point.
    pub fn distance(&self) -> f32 {
        (self.position - self.reference).length()
    }

    fn calculate_view_matrix(&mut self) {
        let (x, y, z, p) = (self.x, self.y, self.z, self.position);
        self.view = Mat4::from_cols(
            Vec4::new(x.x, y.x, z.x, 0.0),
            Vec4::new(x.y, y.y, z.y, 0.0),
            Vec4::new(x.z, y.z, z.z, 0.0),
            Vec4::new(-x.dot(p), -y.dot(p), -z.dot(p), 1.0),
        );
    }

    /// Points the camera from `position` at `reference`.
    ///
    /// Unless `rotate_around_reference` is set, the reference collapses onto the
    /// eye and the eye backs off slightly, which turns the camera into a
    /// mouse-look camera standing at `position`.
    pub fn look_at(&mut self, reference: Vec3, position: Vec3, rotate_around_reference: bool) {
        self.reference = reference;
        self.position = position;

        if let Some(z) = (position - reference).try_normalize() {
            self.z = z;
        }
        if let Some(x) = Vec3::Y.cross(self.z).try_normalize() {
            self.x = x;
        }
        self.y = self.z.cross(self.x);

        if !rotate_around_reference {
            self.reference = self.position;
            self.position += self.z * EYE_OFFSET;
        }

        self.calculate_view_matrix();
    }

    /// Translates both the eye and the reference.
    pub fn move_by(&mut self, movement: Vec3) {
        self.reference += movement;
        self.position += movement;

        self.calculate_view_matrix();
    }

    /// Displacement for the held fly keys over `frame_time` seconds.
    ///
    /// Forward and right stay horizontal; R and F move along world up.
    pub fn on_keys(&self, keys: FlyKeys, frame_time: f32) -> Vec3 {
        let mut speed = FLY_SPEED;
        if keys.contains(FlyKeys::SHIFT) {
            speed *= 2.0;
        }
        let distance = speed * frame_time;

        let up = Vec3::Y * distance;
        let right = self.x * distance;
        let forward = Vec3::Y.cross(self.x) * distance;

        let mut movement = Vec3::ZERO;
        if keys.contains(FlyKeys::W) {
            movement += forward;
        }
        if keys.contains(FlyKeys::S) {
            movement -= forward;
        }
        if keys.contains(FlyKeys::A) {
            movement -= right;
        }
        if keys.contains(FlyKeys::D) {
            movement += right;
        }
        if keys.contains(FlyKeys::R) {
            movement += up;
        }
        if keys.contains(FlyKeys::F) {
            movement -= up;
        }
        movement
    }

    /// Rotates the frame by a mouse delta in pixels and orbits the eye around
    /// the reference at the same distance.
    ///
    /// Pitching past vertical snaps the view to straight up or down instead of
    /// clamping the angle.
    pub fn on_mouse_move(&mut self, dx: i32, dy: i32) {
        let horizontal = (dx as f32 * MOUSE_SENSITIVITY).to_radians();
        let vertical = (dy as f32 * MOUSE_SENSITIVITY).to_radians();

        let distance = self.distance();

        let pitch = Quat::from_axis_angle(self.x, vertical);
        self.y = pitch * self.y;
        self.z = pitch * self.z;

        if self.y.y < 0.0 {
            self.z = Vec3::new(0.0, if self.z.y > 0.0 { 1.0 } else { -1.0 }, 0.0);
            self.y = self.z.cross(self.x);
        }

        let yaw = Quat::from_axis_angle(Vec3::Y, horizontal);
        self.x = yaw * self.x;
        self.y = yaw * self.y;
        self.z = yaw * self.z;

        self.position = self.reference + self.z * distance;

        self.calculate_view_matrix();
    }

    /// Zooms by 10% per wheel notch; positive notches move towards the reference.
    ///
    /// A step never moves against the wheel: at or beyond a bound the
    /// distance is left as it is.
    pub fn on_mouse_wheel(&mut self, notches: i32) {
        let mut offset = self.position - self.reference;

        for _ in 0..notches.unsigned_abs() {
            let length = offset.length();
            let target = if notches < 0 {
                (length * (1.0 + ZOOM_STEP)).min(MAX_DISTANCE).max(length)
            } else {
                (length * (1.0 - ZOOM_STEP)).max(MIN_DISTANCE).min(length)
            };
            if length > 0.0 && target != length {
                offset *= target / length;
            }
        }

        self.position = self.reference + offset;

        self.calculate_view_matrix();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn assert_orthonormal(camera: &Camera) {
        for axis in [camera.x, camera.y, camera.z] {
            assert!(
                (axis.length() - 1.0).abs() < EPSILON,
                "axis {axis} is not unit length"
            );
        }
        assert!(camera.x.dot(camera.y).abs() < EPSILON);
        assert!(camera.y.dot(camera.z).abs() < EPSILON);
        assert!(camera.z.dot(camera.x).abs() < EPSILON);
    }

    fn orbiting_camera() -> Camera {
        let mut camera = Camera::new();
        camera.look_at(Vec3::ZERO, Vec3::new(1.75, 1.75, 5.0), true);
        camera
    }

    #[test]
    fn look_at_without_orbit_collapses_onto_eye() {
        let mut camera = Camera::new();
        let eye = Vec3::new(1.75, 1.75, 5.0);
        camera.look_at(Vec3::ZERO, eye, false);

        let z = eye.normalize();
        assert!(camera.z.abs_diff_eq(z, EPSILON));
        assert!(camera.reference.abs_diff_eq(eye, EPSILON));
        assert!(camera.position.abs_diff_eq(eye + z * 0.05, EPSILON));
        assert_orthonormal(&camera);
    }

    #[test]
    fn look_at_with_orbit_keeps_reference() {
        let camera = orbiting_camera();
        assert_eq!(camera.reference, Vec3::ZERO);
        assert_eq!(camera.position, Vec3::new(1.75, 1.75, 5.0));
        assert!(camera.x.y.abs() < EPSILON);
        assert_orthonormal(&camera);
    }

    #[test]
    fn look_at_same_point_keeps_previous_frame() {
        let mut camera = Camera::new();
        camera.look_at(Vec3::ONE, Vec3::ONE, true);
        assert_eq!(camera.z, Vec3::Z);
        assert_orthonormal(&camera);
    }

    #[test]
    fn view_matrix_maps_eye_to_origin() {
        let camera = orbiting_camera();
        let eye = camera.view().transform_point3(camera.position);
        assert!(eye.abs_diff_eq(Vec3::ZERO, EPSILON));

        // the reference lies straight ahead, down -Z
        let reference = camera.view().transform_point3(camera.reference);
        assert!(reference.x.abs() < EPSILON);
        assert!(reference.y.abs() < EPSILON);
        assert!((reference.z + camera.distance()).abs() < EPSILON);
    }

    #[test]
    fn view_matrix_agrees_with_glam_look_at() {
        let camera = orbiting_camera();
        let expected = Mat4::look_at_rh(camera.position, camera.reference, Vec3::Y);
        assert!(camera.view().abs_diff_eq(expected, EPSILON));
    }

    #[test]
    fn move_by_translates_eye_and_reference() {
        let mut camera = orbiting_camera();
        let before = camera.clone();
        camera.move_by(Vec3::new(1.0, -2.0, 0.5));
        assert_eq!(camera.reference, before.reference + Vec3::new(1.0, -2.0, 0.5));
        assert_eq!(camera.position, before.position + Vec3::new(1.0, -2.0, 0.5));
        assert_eq!(camera.z, before.z);
    }

    #[test]
    fn fly_keys_scale_with_time_and_shift() {
        let camera = Camera::new();

        let forward = camera.on_keys(FlyKeys::W, 0.5);
        assert!(forward.abs_diff_eq(Vec3::new(0.0, 0.0, -2.5), EPSILON));

        let fast = camera.on_keys(FlyKeys::W | FlyKeys::SHIFT, 0.5);
        assert!(fast.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), EPSILON));

        let strafe = camera.on_keys(FlyKeys::A | FlyKeys::R, 1.0);
        assert!(strafe.abs_diff_eq(Vec3::new(-5.0, 5.0, 0.0), EPSILON));

        let cancelled = camera.on_keys(FlyKeys::W | FlyKeys::S | FlyKeys::D | FlyKeys::A, 1.0);
        assert!(cancelled.abs_diff_eq(Vec3::ZERO, EPSILON));

        assert_eq!(camera.on_keys(FlyKeys::SHIFT, 1.0), Vec3::ZERO);
    }

    #[test]
    fn fly_forward_stays_horizontal_when_pitched() {
        let mut camera = orbiting_camera();
        camera.on_mouse_move(0, 40);
        let movement = camera.on_keys(FlyKeys::W, 1.0);
        assert!(movement.y.abs() < EPSILON);
        assert!((movement.length() - 5.0).abs() < EPSILON);
    }

    #[test]
    fn mouse_look_keeps_frame_orthonormal() {
        let mut camera = orbiting_camera();
        let deltas = [
            (10, 3),
            (-25, 40),
            (3, -90),
            (0, 400),
            (-400, 0),
            (77, -13),
            (1, 1),
            (-360, 360),
            (5, -500),
        ];
        for _ in 0..20 {
            for (dx, dy) in deltas {
                camera.on_mouse_move(dx, dy);
                assert_orthonormal(&camera);
            }
        }
    }

    #[test]
    fn mouse_look_preserves_orbit_distance() {
        let mut camera = orbiting_camera();
        let distance = camera.distance();
        camera.on_mouse_move(120, -30);
        assert!((camera.distance() - distance).abs() < 1e-3);
        assert!(
            camera
                .position
                .abs_diff_eq(camera.reference + camera.z * distance, 1e-3)
        );
    }

    #[test]
    fn pitching_over_the_top_snaps_to_vertical() {
        let mut camera = orbiting_camera();
        // 480 px * 0.25 deg = 120 deg of pitch, which turns the up vector over
        camera.on_mouse_move(0, 480);
        assert!(camera.z.abs_diff_eq(Vec3::Y, EPSILON) || camera.z.abs_diff_eq(-Vec3::Y, EPSILON));
        assert!(camera.y.y.abs() < EPSILON);
        assert_orthonormal(&camera);
    }

    #[test]
    fn wheel_zooms_by_ten_percent() {
        let mut camera = orbiting_camera();
        let distance = camera.distance();

        camera.on_mouse_wheel(1);
        assert!((camera.distance() - distance * 0.9).abs() < EPSILON);

        camera.on_mouse_wheel(-1);
        assert!((camera.distance() - distance * 0.9 * 1.1).abs() < EPSILON);

        camera.on_mouse_wheel(0);
        assert!((camera.distance() - distance * 0.99).abs() < EPSILON);
    }

    #[test]
    fn zoom_stays_within_bounds() {
        let mut camera = orbiting_camera();
        for _ in 0..200 {
            camera.on_mouse_wheel(1);
            let distance = camera.distance();
            assert!((MIN_DISTANCE - EPSILON..=MAX_DISTANCE + EPSILON).contains(&distance));
        }
        assert!((camera.distance() - MIN_DISTANCE).abs() < EPSILON);

        camera.on_mouse_wheel(-300);
        assert!((camera.distance() - MAX_DISTANCE).abs() < 1e-2);
        camera.on_mouse_wheel(-5);
        assert!(camera.distance() <= MAX_DISTANCE + 1e-2);
    }

    #[test]
    fn zoom_outside_bounds_never_reverses() {
        let mut camera = Camera::new();
        camera.look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 1000.0), true);

        camera.on_mouse_wheel(-1);
        assert!((camera.distance() - 1000.0).abs() < 1e-2);
        camera.on_mouse_wheel(1);
        assert!((camera.distance() - 900.0).abs() < 1e-2);

        camera.look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 0.01), true);
        camera.on_mouse_wheel(1);
        assert!((camera.distance() - 0.01).abs() < 1e-6);
        camera.on_mouse_wheel(-1);
        assert!((camera.distance() - 0.011).abs() < 1e-6);
    }
}
