//! Simulated presentation platform.
//!
//! Stands in for real headset hardware: a display that presents into the
//! window it is given and produces per-eye poses from a gently swaying head.

use std::cell::RefCell;
use std::future::{ready, Future};
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Instant;

use glam::{EulerRot, Mat4, Quat, Vec3};
use log::{debug, info};

use crate::display::{
    DisplayCapabilities, DisplayEvent, PresentLayer, XrDisplay, XrPlatform,
};
use crate::error::XrError;
use crate::frame_data::FrameData;

#[derive(Debug, Clone)]
pub struct SimulatedDisplayConfig {
    pub name: String,
    pub capabilities: DisplayCapabilities,
    /// Inter-pupillary distance in meters.
    pub ipd: f32,
    pub fov_y_degrees: f32,
    /// Width / height of one eye.
    pub eye_aspect: f32,
    /// When set, every presentation request is rejected with this reason.
    pub reject_reason: Option<String>,
}

impl Default for SimulatedDisplayConfig {
    fn default() -> Self {
        Self {
            name: "Simulated HMD".to_string(),
            capabilities: DisplayCapabilities::default(),
            // Average human IPD is ~63mm
            ipd: 0.063,
            fov_y_degrees: 90.0,
            eye_aspect: 1.0,
            reject_reason: None,
        }
    }
}

struct DisplayState {
    config: SimulatedDisplayConfig,
    depth_near: f32,
    depth_far: f32,
    presenting: Option<PresentLayer>,
    frame_requested: bool,
    frames_submitted: u64,
    started: Instant,
}

/// Shared handle to a simulated display. Clones refer to the same display.
#[derive(Clone)]
pub struct SimulatedDisplay {
    name: Rc<str>,
    state: Rc<RefCell<DisplayState>>,
}

impl SimulatedDisplay {
    pub fn new(config: SimulatedDisplayConfig) -> Self {
        Self {
            name: Rc::from(config.name.as_str()),
            state: Rc::new(RefCell::new(DisplayState {
                config,
                depth_near: 0.01,
                depth_far: 10000.0,
                presenting: None,
                frame_requested: false,
                frames_submitted: 0,
                started: Instant::now(),
            })),
        }
    }

    /// Consumes a pending animation-frame request.
    pub fn take_frame_request(&self) -> bool {
        std::mem::take(&mut self.state.borrow_mut().frame_requested)
    }

    pub fn frames_submitted(&self) -> u64 {
        self.state.borrow().frames_submitted
    }

    pub fn presented_layer(&self) -> Option<PresentLayer> {
        self.state.borrow().presenting
    }

    pub fn set_eye_aspect(&self, aspect: f32) {
        self.state.borrow_mut().config.eye_aspect = aspect;
    }

    /// Fills `frame_data` as if `seconds` had passed since presentation began.
    pub fn fill_frame_data(&self, seconds: f32, frame_data: &mut FrameData) {
        let state = self.state.borrow();
        let config = &state.config;
        let head = head_orientation(seconds);
        let projection = Mat4::perspective_rh(
            config.fov_y_degrees.to_radians(),
            config.eye_aspect,
            state.depth_near,
            state.depth_far,
        );

        let half_ipd = config.ipd / 2.0;
        frame_data.timestamp = f64::from(seconds) * 1000.0;
        frame_data.set_left(eye_view(head, -half_ipd), projection);
        frame_data.set_right(eye_view(head, half_ipd), projection);
    }
}

/// Slow breathing/sway motion in place of tracked orientation.
fn head_orientation(seconds: f32) -> Quat {
    let breathing = (seconds * 0.5).sin() * 0.01;
    let sway = (seconds * 0.3).sin() * 0.005;
    Quat::from_euler(EulerRot::YXZ, 0.0, breathing, sway)
}

/// View matrix of an eye sitting `offset` meters along the head's x axis.
fn eye_view(head: Quat, offset: f32) -> Mat4 {
    let eye_to_world = Mat4::from_quat(head) * Mat4::from_translation(Vec3::new(offset, 0.0, 0.0));
    eye_to_world.inverse()
}

impl XrDisplay for SimulatedDisplay {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> DisplayCapabilities {
        self.state.borrow().config.capabilities
    }

    fn set_depth_range(&mut self, near: f32, far: f32) {
        let mut state = self.state.borrow_mut();
        state.depth_near = near;
        state.depth_far = far;
    }

    fn depth_near(&self) -> f32 {
        self.state.borrow().depth_near
    }

    fn depth_far(&self) -> f32 {
        self.state.borrow().depth_far
    }

    fn is_presenting(&self) -> bool {
        self.state.borrow().presenting.is_some()
    }

    fn request_present(
        &mut self,
        layers: &[PresentLayer],
    ) -> impl Future<Output = Result<(), XrError>> {
        let mut state = self.state.borrow_mut();
        let result = if let Some(reason) = state.config.reject_reason.clone() {
            Err(XrError::PresentRejected(reason))
        } else if let Some(layer) = layers.first() {
            state.presenting = Some(*layer);
            state.started = Instant::now();
            info!("{}: presenting surface {:?}", self.name, layer.source);
            Ok(())
        } else {
            Err(XrError::PresentRejected("no layers to present".to_string()))
        };
        ready(result)
    }

    fn exit_present(&mut self) {
        let mut state = self.state.borrow_mut();
        state.presenting = None;
        state.frame_requested = false;
    }

    fn get_frame_data(&mut self, frame_data: &mut FrameData) {
        let seconds = self.state.borrow().started.elapsed().as_secs_f32();
        self.fill_frame_data(seconds, frame_data);
    }

    fn request_animation_frame(&mut self) {
        self.state.borrow_mut().frame_requested = true;
    }

    fn submit_frame(&mut self) {
        let mut state = self.state.borrow_mut();
        state.frames_submitted += 1;
        debug!("{}: frame {} submitted", self.name, state.frames_submitted);
    }
}

/// Platform listing a fixed set of simulated displays.
pub struct SimulatedPlatform {
    displays: Vec<SimulatedDisplay>,
    frame_data_support: bool,
    subscribers: RefCell<Vec<Sender<DisplayEvent>>>,
}

impl SimulatedPlatform {
    pub fn new(displays: Vec<SimulatedDisplay>) -> Self {
        Self {
            displays,
            frame_data_support: true,
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// A platform without pose support, as on hardware with no XR runtime.
    pub fn unsupported() -> Self {
        Self {
            frame_data_support: false,
            ..Self::new(Vec::new())
        }
    }

    /// Broadcasts `event`, forgetting subscribers that went away.
    pub fn emit(&self, event: DisplayEvent) {
        self.subscribers
            .borrow_mut()
            .retain(|subscriber| subscriber.send(event).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl XrPlatform for SimulatedPlatform {
    type Display = SimulatedDisplay;

    fn has_frame_data_support(&self) -> bool {
        self.frame_data_support
    }

    fn get_displays(&self) -> impl Future<Output = Vec<SimulatedDisplay>> {
        ready(self.displays.clone())
    }

    fn subscribe(&self) -> Receiver<DisplayEvent> {
        let (tx, rx) = channel();
        self.subscribers.borrow_mut().push(tx);
        rx
    }
}
