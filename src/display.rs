//! Presentation platform seam.
//!
//! A platform enumerates displays and broadcasts display lifecycle events;
//! a display presents a render surface and hands out per-eye matrices.

use std::future::Future;
use std::sync::mpsc::Receiver;

use crate::error::XrError;
use crate::frame_data::FrameData;

/// Capability flags reported by a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayCapabilities {
    pub can_present: bool,
}

impl Default for DisplayCapabilities {
    fn default() -> Self {
        Self { can_present: true }
    }
}

/// Platform-wide display lifecycle signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    /// A display wants to start presenting (e.g. the headset was put on).
    Activate,
    /// A display stopped being available for presenting.
    Deactivate,
}

/// Identifies the render surface a display should present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// One layer of a presentation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentLayer {
    pub source: SurfaceId,
}

pub trait XrDisplay {
    fn name(&self) -> &str;

    fn capabilities(&self) -> DisplayCapabilities;

    fn set_depth_range(&mut self, near: f32, far: f32);

    fn depth_near(&self) -> f32;

    fn depth_far(&self) -> f32;

    fn is_presenting(&self) -> bool;

    /// Resolves once the display accepted or rejected the layers.
    fn request_present(
        &mut self,
        layers: &[PresentLayer],
    ) -> impl Future<Output = Result<(), XrError>>;

    fn exit_present(&mut self);

    /// Fills `frame_data` in place with the latest poses.
    fn get_frame_data(&mut self, frame_data: &mut FrameData);

    /// Asks the display to drive the next tick.
    fn request_animation_frame(&mut self);

    /// Hands the rendered surface over to the display.
    fn submit_frame(&mut self);
}

pub trait XrPlatform {
    type Display: XrDisplay;

    /// Whether per-frame pose data can be produced at all.
    fn has_frame_data_support(&self) -> bool;

    fn get_displays(&self) -> impl Future<Output = Vec<Self::Display>>;

    /// Subscribes to display lifecycle events. Dropping the receiver
    /// unsubscribes.
    fn subscribe(&self) -> Receiver<DisplayEvent>;
}
