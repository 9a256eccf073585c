//! Per-frame pose data supplied by a display.

use glam::Mat4;

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Reusable buffer the display fills each tick.
///
/// Matrices are flat column-major arrays, the layout displays hand out and
/// `Scene::set_matrix_from_array` and `Camera::set_projection_from_array`
/// consume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameData {
    /// Milliseconds since the display started producing poses.
    pub timestamp: f64,
    pub left_view: [f32; 16],
    pub left_projection: [f32; 16],
    pub right_view: [f32; 16],
    pub right_projection: [f32; 16],
}

impl Default for FrameData {
    fn default() -> Self {
        Self {
            timestamp: 0.0,
            left_view: IDENTITY,
            left_projection: IDENTITY,
            right_view: IDENTITY,
            right_projection: IDENTITY,
        }
    }
}

impl FrameData {
    pub fn set_left(&mut self, view: Mat4, projection: Mat4) {
        self.left_view = view.to_cols_array();
        self.left_projection = projection.to_cols_array();
    }

    pub fn set_right(&mut self, view: Mat4, projection: Mat4) {
        self.right_view = view.to_cols_array();
        self.right_projection = projection.to_cols_array();
    }
}
