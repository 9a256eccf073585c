//! Recording doubles for the display, platform and renderer seams.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::future::{ready, Future};
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};

use glam::Mat4;
use xr_demo::{
    Camera, CameraSettings, DisplayCapabilities, DisplayEvent, FrameData, PresentLayer, Scene,
    Stage, StereoRenderer, SurfaceId, Viewport, XrDisplay, XrError, XrPlatform,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    RequestPresent(Vec<PresentLayer>),
    ExitPresent,
    GetFrameData,
    RequestAnimationFrame,
    SubmitFrame,
    SetViewport(Viewport),
    SetAutoClear(bool),
    Clear,
    ClearDepth,
    Render { projection: Mat4, world: Mat4 },
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub fn new_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn count(log: &CallLog, pred: impl Fn(&Call) -> bool) -> usize {
    log.borrow().iter().filter(|call| pred(call)).count()
}

struct MockDisplayState {
    presenting: bool,
    depth_near: f32,
    depth_far: f32,
    reject_reason: Option<String>,
    frame_data: FrameData,
}

#[derive(Clone)]
pub struct MockDisplay {
    name: String,
    capabilities: DisplayCapabilities,
    log: CallLog,
    state: Rc<RefCell<MockDisplayState>>,
}

impl MockDisplay {
    pub fn new(name: &str, can_present: bool, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            capabilities: DisplayCapabilities { can_present },
            log: log.clone(),
            state: Rc::new(RefCell::new(MockDisplayState {
                presenting: false,
                depth_near: 0.01,
                depth_far: 10000.0,
                reject_reason: None,
                frame_data: FrameData::default(),
            })),
        }
    }

    pub fn rejecting(self, reason: &str) -> Self {
        self.state.borrow_mut().reject_reason = Some(reason.to_string());
        self
    }

    pub fn with_frame_data(self, frame_data: FrameData) -> Self {
        self.state.borrow_mut().frame_data = frame_data;
        self
    }

    /// Presentation changed outside the session (e.g. the runtime ended it).
    pub fn set_presenting(&self, presenting: bool) {
        self.state.borrow_mut().presenting = presenting;
    }
}

impl XrDisplay for MockDisplay {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> DisplayCapabilities {
        self.capabilities
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
        self.state.borrow().presenting
    }

    fn request_present(
        &mut self,
        layers: &[PresentLayer],
    ) -> impl Future<Output = Result<(), XrError>> {
        self.log.borrow_mut().push(Call::RequestPresent(layers.to_vec()));
        let mut state = self.state.borrow_mut();
        let result = match state.reject_reason.clone() {
            Some(reason) => Err(XrError::PresentRejected(reason)),
            None => {
                state.presenting = true;
                Ok(())
            }
        };
        ready(result)
    }

    fn exit_present(&mut self) {
        self.log.borrow_mut().push(Call::ExitPresent);
        self.state.borrow_mut().presenting = false;
    }

    fn get_frame_data(&mut self, frame_data: &mut FrameData) {
        self.log.borrow_mut().push(Call::GetFrameData);
        *frame_data = self.state.borrow().frame_data;
    }

    fn request_animation_frame(&mut self) {
        self.log.borrow_mut().push(Call::RequestAnimationFrame);
    }

    fn submit_frame(&mut self) {
        self.log.borrow_mut().push(Call::SubmitFrame);
    }
}

pub struct MockPlatform {
    pub supported: bool,
    pub displays: Vec<MockDisplay>,
    pub subscribe_calls: Cell<usize>,
    pub get_displays_calls: Cell<usize>,
    senders: RefCell<Vec<Sender<DisplayEvent>>>,
}

impl MockPlatform {
    pub fn new(displays: Vec<MockDisplay>) -> Self {
        Self {
            supported: true,
            displays,
            subscribe_calls: Cell::new(0),
            get_displays_calls: Cell::new(0),
            senders: RefCell::new(Vec::new()),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(Vec::new())
        }
    }

    pub fn emit(&self, event: DisplayEvent) {
        self.senders
            .borrow_mut()
            .retain(|sender| sender.send(event).is_ok());
    }
}

impl XrPlatform for MockPlatform {
    type Display = MockDisplay;

    fn has_frame_data_support(&self) -> bool {
        self.supported
    }

    fn get_displays(&self) -> impl Future<Output = Vec<MockDisplay>> {
        self.get_displays_calls.set(self.get_displays_calls.get() + 1);
        ready(self.displays.clone())
    }

    fn subscribe(&self) -> Receiver<DisplayEvent> {
        self.subscribe_calls.set(self.subscribe_calls.get() + 1);
        let (tx, rx) = channel();
        self.senders.borrow_mut().push(tx);
        rx
    }
}

pub struct RecordingRenderer {
    log: CallLog,
    viewport: Viewport,
    auto_clear: bool,
}

impl RecordingRenderer {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            viewport: Viewport::full(1.0, 1.0),
            auto_clear: true,
        }
    }
}

impl StereoRenderer for RecordingRenderer {
    fn surface_id(&self) -> SurfaceId {
        SurfaceId(7)
    }

    fn resize(&mut self, _width: u32, _height: u32) {}

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.log.borrow_mut().push(Call::SetViewport(viewport));
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_auto_clear(&mut self, auto_clear: bool) {
        self.auto_clear = auto_clear;
        self.log.borrow_mut().push(Call::SetAutoClear(auto_clear));
    }

    fn auto_clear(&self) -> bool {
        self.auto_clear
    }

    fn clear(&mut self) {
        self.log.borrow_mut().push(Call::Clear);
    }

    fn clear_depth(&mut self) {
        self.log.borrow_mut().push(Call::ClearDepth);
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) {
        self.log.borrow_mut().push(Call::Render {
            projection: camera.projection_matrix,
            world: scene.matrix_world,
        });
    }
}

/// 800x600 stage over a recording renderer; setup calls are not logged.
pub fn stage(log: &CallLog) -> Stage<RecordingRenderer> {
    let stage = Stage::new(RecordingRenderer::new(log), 800, 600, CameraSettings::default());
    log.borrow_mut().clear();
    stage
}

pub fn layer() -> PresentLayer {
    PresentLayer { source: SurfaceId(7) }
}
