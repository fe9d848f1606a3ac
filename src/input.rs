//! Mouse and keyboard handling for the orbit camera.

use glam::Vec3;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

use crate::renderer::camera::OrbitCamera;

const ROTATE_SENSITIVITY: f32 = 0.005;
const PAN_SENSITIVITY: f32 = 0.001;
const ZOOM_SENSITIVITY: f32 = 0.1;
const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 400.0;
// Keep elevation off the poles to avoid gimbal lock.
const ELEVATION_MARGIN: f32 = 0.1;

/// Translates window events into orbit camera motion. Left drag rotates,
/// middle drag (or shift + left drag) pans the target, scroll zooms.
#[derive(Default)]
pub struct CameraController {
    left_held: bool,
    middle_held: bool,
    shift_held: bool,
    cursor: Option<(f32, f32)>,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    fn rotating(&self) -> bool {
        self.left_held && !self.shift_held
    }

    fn panning(&self) -> bool {
        self.middle_held || (self.left_held && self.shift_held)
    }

    pub fn mouse_button(&mut self, button: MouseButton, state: ElementState) {
        let held = state == ElementState::Pressed;
        match button {
            MouseButton::Left => self.left_held = held,
            MouseButton::Middle => self.middle_held = held,
            _ => {}
        }
    }

    pub fn modifier_key(&mut self, key: KeyCode, state: ElementState) {
        if matches!(key, KeyCode::ShiftLeft | KeyCode::ShiftRight) {
            self.shift_held = state == ElementState::Pressed;
        }
    }

    /// Track cursor motion, applying rotation or panning while a drag is
    /// active. Returns true when the camera moved.
    pub fn cursor_moved(&mut self, x: f32, y: f32, camera: &mut OrbitCamera) -> bool {
        let mut moved = false;
        if let Some((px, py)) = self.cursor {
            let dx = x - px;
            let dy = y - py;
            if self.rotating() {
                camera.azimuth -= dx * ROTATE_SENSITIVITY;
                let limit = std::f32::consts::FRAC_PI_2 - ELEVATION_MARGIN;
                camera.elevation = (camera.elevation + dy * ROTATE_SENSITIVITY).clamp(-limit, limit);
                moved = true;
            } else if self.panning() {
                self.pan(camera, dx, dy);
                moved = true;
            }
        }
        self.cursor = Some((x, y));
        moved
    }

    pub fn scroll(&mut self, delta: MouseScrollDelta, camera: &mut OrbitCamera) {
        let amount = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
        };
        camera.distance =
            (camera.distance * (1.0 - amount * ZOOM_SENSITIVITY)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    fn pan(&self, camera: &mut OrbitCamera, dx: f32, dy: f32) {
        let forward = (camera.target - camera.position()).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward).normalize();

        // Pan distance scales with zoom so drags feel consistent.
        let scale = camera.distance * PAN_SENSITIVITY;
        camera.target -= right * dx * scale;
        camera.target += up * dy * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_modes() {
        let mut controller = CameraController::new();
        assert!(!controller.rotating());

        controller.mouse_button(MouseButton::Left, ElementState::Pressed);
        assert!(controller.rotating());
        assert!(!controller.panning());

        controller.modifier_key(KeyCode::ShiftLeft, ElementState::Pressed);
        assert!(!controller.rotating());
        assert!(controller.panning());

        controller.mouse_button(MouseButton::Left, ElementState::Released);
        controller.mouse_button(MouseButton::Middle, ElementState::Pressed);
        assert!(controller.panning());
    }

    #[test]
    fn test_first_cursor_event_only_records_position() {
        let mut controller = CameraController::new();
        let mut camera = OrbitCamera::default();
        controller.mouse_button(MouseButton::Left, ElementState::Pressed);

        // No previous position, nothing to rotate from.
        assert!(!controller.cursor_moved(100.0, 100.0, &mut camera));
        assert!(controller.cursor_moved(110.0, 100.0, &mut camera));
    }

    #[test]
    fn test_rotation_clamps_elevation() {
        let mut controller = CameraController::new();
        let mut camera = OrbitCamera::default();
        controller.mouse_button(MouseButton::Left, ElementState::Pressed);

        controller.cursor_moved(0.0, 0.0, &mut camera);
        controller.cursor_moved(0.0, 10_000.0, &mut camera);
        assert!(camera.elevation < std::f32::consts::FRAC_PI_2);

        controller.cursor_moved(0.0, -20_000.0, &mut camera);
        assert!(camera.elevation > -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn test_zoom_stays_within_limits() {
        let mut controller = CameraController::new();
        let mut camera = OrbitCamera::default();

        for _ in 0..100 {
            controller.scroll(MouseScrollDelta::LineDelta(0.0, 1.0), &mut camera);
        }
        assert!(camera.distance >= MIN_DISTANCE);

        for _ in 0..100 {
            controller.scroll(MouseScrollDelta::LineDelta(0.0, -1.0), &mut camera);
        }
        assert!(camera.distance <= MAX_DISTANCE);
    }

    #[test]
    fn test_pan_moves_target() {
        let mut controller = CameraController::new();
        let mut camera = OrbitCamera::default();
        let original_target = camera.target;

        controller.mouse_button(MouseButton::Middle, ElementState::Pressed);
        controller.cursor_moved(0.0, 0.0, &mut camera);
        controller.cursor_moved(50.0, 30.0, &mut camera);

        assert_ne!(camera.target, original_target);
    }
}
