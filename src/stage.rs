//! Base (non-XR) demo: renderer, scene and camera plus the mono render path.

use glam::{Mat4, Vec3};

use crate::config::CameraSettings;
use crate::display::SurfaceId;
use crate::scene::{Camera, Scene, Viewport};

/// Renderer operations the demo needs.
pub trait StereoRenderer {
    /// Surface a display presents from.
    fn surface_id(&self) -> SurfaceId;

    fn resize(&mut self, width: u32, height: u32);

    fn set_viewport(&mut self, viewport: Viewport);

    fn viewport(&self) -> Viewport;

    /// When on, every `render` clears colour and depth first.
    fn set_auto_clear(&mut self, auto_clear: bool);

    fn auto_clear(&self) -> bool;

    fn clear(&mut self);

    /// Clears depth only, keeping colour.
    fn clear_depth(&mut self);

    fn render(&mut self, scene: &Scene, camera: &Camera);
}

/// Who drives the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSource {
    /// The window's regular redraw loop.
    Platform,
    /// The presenting display's own frame loop.
    Display,
}

/// A demo driven once per tick.
pub trait Demo {
    type Renderer: StereoRenderer;

    fn stage_mut(&mut self) -> &mut Stage<Self::Renderer>;

    fn render_frame(&mut self) -> FrameSource {
        self.stage_mut().render();
        FrameSource::Platform
    }
}

// Distance from the camera to the demo object.
const CONTENT_DISTANCE: f32 = 3.0;

pub struct Stage<R> {
    pub renderer: R,
    pub scene: Scene,
    pub camera: Camera,
    pub width: u32,
    pub height: u32,
    pub camera_settings: CameraSettings,
    elapsed: f32,
}

impl<R: StereoRenderer> Stage<R> {
    pub fn new(mut renderer: R, width: u32, height: u32, camera_settings: CameraSettings) -> Self {
        renderer.resize(width, height);
        let mut stage = Self {
            renderer,
            scene: Scene::new(),
            camera: Camera::default(),
            width,
            height,
            camera_settings,
            elapsed: 0.0,
        };
        stage.update(0.0);
        stage.on_resize();
        stage
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        self.renderer.resize(width, height);
    }

    /// Restores the full-surface viewport and the mono camera projection.
    pub fn on_resize(&mut self) {
        let (width, height) = (self.width as f32, self.height as f32);
        self.renderer.set_viewport(Viewport::full(width, height));
        let settings = self.camera_settings;
        self.camera.set_perspective(
            settings.fov_y_degrees,
            width / height.max(1.0),
            settings.near,
            settings.far,
        );
    }

    /// Spins the demo object.
    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;
        let spin = Mat4::from_rotation_y(self.elapsed * 0.8) * Mat4::from_rotation_x(self.elapsed * 0.5);
        self.scene.content = Mat4::from_translation(Vec3::new(0.0, 0.0, -CONTENT_DISTANCE)) * spin;
    }

    /// Mono render of the whole surface.
    pub fn render(&mut self) {
        self.scene.update_matrix_world(false);
        self.renderer.render(&self.scene, &self.camera);
    }

    /// Renders one eye: viewport, matrices from the display, one draw.
    pub fn render_eye(&mut self, view: &[f32; 16], projection: &[f32; 16], viewport: Viewport) {
        self.renderer.set_viewport(viewport);
        self.camera.set_projection_from_array(projection);
        self.scene.set_matrix_from_array(view);
        self.scene.update_matrix_world(true);
        self.renderer.render(&self.scene, &self.camera);
    }
}

impl<R: StereoRenderer> Demo for Stage<R> {
    type Renderer = R;

    fn stage_mut(&mut self) -> &mut Stage<R> {
        self
    }
}
