//! Scene and camera state the renderer draws.
//!
//! Only the parts the XR path touches are modelled: a root transform whose
//! matrices can be overwritten from flat arrays, and a camera projection.

use glam::{Mat4, Quat, Vec3};

/// Pixel rectangle, origin at the top-left of the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn full(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Left and right halves of a `width` x `height` surface.
    pub fn split_eyes(width: f32, height: f32) -> (Self, Self) {
        let eye_width = width * 0.5;
        (
            Self::new(0.0, 0.0, eye_width, height),
            Self::new(eye_width, 0.0, eye_width, height),
        )
    }
}

/// Scene root.
#[derive(Debug, Clone)]
pub struct Scene {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Local matrix. Recomposed from position/rotation/scale while
    /// `matrix_auto_update` is on.
    pub matrix: Mat4,
    pub matrix_world: Mat4,
    pub matrix_auto_update: bool,
    /// Model transform of the demo object.
    pub content: Mat4,
    world_dirty: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            matrix: Mat4::IDENTITY,
            matrix_world: Mat4::IDENTITY,
            matrix_auto_update: true,
            content: Mat4::IDENTITY,
            world_dirty: false,
        }
    }

    /// Overwrites the local matrix with a column-major array.
    pub fn set_matrix_from_array(&mut self, values: &[f32; 16]) {
        self.matrix = Mat4::from_cols_array(values);
        self.world_dirty = true;
    }

    pub fn update_matrix(&mut self) {
        self.matrix = Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position);
        self.world_dirty = true;
    }

    pub fn update_matrix_world(&mut self, force: bool) {
        if self.matrix_auto_update {
            self.update_matrix();
        }
        if self.world_dirty || force {
            self.matrix_world = self.matrix;
            self.world_dirty = false;
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub projection_matrix: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection_matrix: Mat4::IDENTITY,
        }
    }
}

impl Camera {
    pub fn set_projection_from_array(&mut self, values: &[f32; 16]) {
        self.projection_matrix = Mat4::from_cols_array(values);
    }

    pub fn set_perspective(&mut self, fov_y_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.projection_matrix = Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect, near, far);
    }

    /// Full transform applied to the scene content. The camera sits at the
    /// origin, so the scene's world matrix doubles as the view.
    pub fn model_view_projection(&self, scene: &Scene) -> Mat4 {
        self.projection_matrix * scene.matrix_world * scene.content
    }
}
