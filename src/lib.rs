//! XR Demo - toggles stereoscopic rendering of a small 3D scene
//!
//! The session controller picks a display able to present, offers an
//! "Enable XR" toggle, and each tick either renders the scene normally or
//! renders both eyes side by side from the display's per-frame poses.
//! Displays and renderers sit behind traits; the crate ships a wgpu renderer
//! and a simulated headset so the demo runs on a plain desktop.

pub mod app;
pub mod config;
pub mod display;
pub mod error;
pub mod frame_data;
pub mod renderer;
pub mod scene;
pub mod session;
pub mod sim;
pub mod stage;
pub mod ui;

pub use config::{CameraSettings, XrConfig};
pub use display::{DisplayCapabilities, DisplayEvent, PresentLayer, SurfaceId, XrDisplay, XrPlatform};
pub use error::{RendererError, XrError};
pub use frame_data::FrameData;
pub use scene::{Camera, Scene, Viewport};
pub use session::{PresentState, XrDemo, XrSession};
pub use stage::{Demo, FrameSource, Stage, StereoRenderer};
pub use ui::ToggleButton;
