//! Error types.
//!
//! Session errors are never returned to callers; the session logs them and
//! carries on. They exist so displays can report why presentation failed and
//! so log lines have one wording.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XrError {
    #[error("WebXR not supported")]
    CapabilityUnsupported,

    #[error("No devices available able to present.")]
    NoPresentableDisplay,

    #[error("{0}")]
    PresentRejected(String),
}

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] egui_wgpu::wgpu::CreateSurfaceError),

    #[error("failed to find GPU adapter")]
    NoAdapter,

    #[error("failed to create device: {0}")]
    RequestDevice(#[from] egui_wgpu::wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}
