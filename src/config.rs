//! Tunable parameters for the XR demo.

/// Camera frustum settings shared by the mono camera and the display depth range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_y_degrees: 70.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Session-level settings.
#[derive(Debug, Clone, PartialEq)]
pub struct XrConfig {
    pub camera: CameraSettings,
    pub toggle_label: String,
    pub toggle_class: String,
}

impl Default for XrConfig {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default(),
            toggle_label: "Enable XR".to_string(),
            toggle_class: "xr-toggle".to_string(),
        }
    }
}
