//! XR session controller.
//!
//! Detects frame-data support, picks the first display able to present,
//! offers a toggle button, and on each tick either hands rendering back to
//! the base stage or renders both eyes from the display's poses.
//!
//! Presenting lifecycle:
//!
//! ```text
//!   NotPresenting --activate ok--> JustActivated --tick--> Presenting
//!         ^                                                    |
//!         +------------- tick while display not presenting ----+
//! ```
//!
//! The `JustActivated` tick renders nothing and only asks the display for the
//! next frame, so the first submit happens inside the display's own loop.

use std::sync::mpsc::{Receiver, TryRecvError};

use log::{debug, error, info, warn};

use crate::config::XrConfig;
use crate::display::{DisplayEvent, PresentLayer, XrDisplay, XrPlatform};
use crate::error::XrError;
use crate::frame_data::FrameData;
use crate::scene::Viewport;
use crate::stage::{Demo, FrameSource, Stage, StereoRenderer};
use crate::ui::ToggleButton;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentState {
    NotPresenting,
    JustActivated,
    Presenting,
}

pub struct XrSession<D> {
    disabled: bool,
    state: PresentState,
    display: Option<D>,
    toggle: Option<ToggleButton>,
    frame_data: FrameData,
    events: Option<Receiver<DisplayEvent>>,
    config: XrConfig,
}

impl<D: XrDisplay> XrSession<D> {
    /// Checks platform support and subscribes to display lifecycle events.
    ///
    /// Discovery is a separate async step, see [`XrSession::discover_displays`].
    pub fn new<P>(platform: &P, config: XrConfig) -> Self
    where
        P: XrPlatform<Display = D>,
    {
        let mut session = Self {
            disabled: false,
            state: PresentState::NotPresenting,
            display: None,
            toggle: None,
            frame_data: FrameData::default(),
            events: None,
            config,
        };

        if !platform.has_frame_data_support() {
            session.disabled = true;
            error!("{}", XrError::CapabilityUnsupported);
            return session;
        }

        session.events = Some(platform.subscribe());
        session
    }

    /// Selects the first display able to present and creates the toggle.
    pub async fn discover_displays<P>(&mut self, platform: &P)
    where
        P: XrPlatform<Display = D>,
    {
        if self.disabled {
            return;
        }

        let displays = platform.get_displays().await;
        let Some(mut display) = displays
            .into_iter()
            .find(|display| display.capabilities().can_present)
        else {
            warn!("{}", XrError::NoPresentableDisplay);
            return;
        };

        // First one wins; there is no display picker.
        let camera = self.config.camera;
        display.set_depth_range(camera.near, camera.far);
        info!(
            "Selected display '{}' (depth {}..{})",
            display.name(),
            display.depth_near(),
            display.depth_far()
        );
        self.display = Some(display);
        self.create_toggle_button();
    }

    fn create_toggle_button(&mut self) {
        self.toggle = Some(ToggleButton::new(
            self.config.toggle_class.clone(),
            self.config.toggle_label.clone(),
        ));
    }

    pub async fn toggle(&mut self, layer: PresentLayer) {
        let Some(display) = &self.display else {
            return;
        };
        if display.is_presenting() {
            self.deactivate();
        } else {
            self.activate(layer).await;
        }
    }

    /// Requests presentation; a rejection is logged and changes nothing.
    /// A display that is already presenting keeps its current frame loop.
    pub async fn activate(&mut self, layer: PresentLayer) {
        let Some(display) = &mut self.display else {
            return;
        };
        if display.is_presenting() {
            debug!("'{}' is already presenting", display.name());
            return;
        }

        match display.request_present(&[layer]).await {
            Ok(()) => {
                info!("Presenting to '{}'", display.name());
                self.state = PresentState::JustActivated;
            }
            Err(e) => error!("Unable to init XR: {}", e),
        }
    }

    pub fn deactivate(&mut self) {
        let Some(display) = &mut self.display else {
            return;
        };
        if !display.is_presenting() {
            return;
        }
        display.exit_present();
        info!("Stopped presenting to '{}'", display.name());
    }

    /// Applies pending display lifecycle events.
    pub async fn handle_events(&mut self, layer: PresentLayer) {
        loop {
            let event = match self.events.as_ref().map(Receiver::try_recv) {
                Some(Ok(event)) => event,
                Some(Err(TryRecvError::Disconnected)) => {
                    self.events = None;
                    return;
                }
                Some(Err(TryRecvError::Empty)) | None => return,
            };
            debug!("Display event: {:?}", event);
            match event {
                DisplayEvent::Activate => self.activate(layer).await,
                DisplayEvent::Deactivate => self.deactivate(),
            }
        }
    }

    /// Drops the lifecycle subscription.
    pub fn dispose(&mut self) {
        self.events = None;
    }

    /// One tick. Returns who should drive the next one.
    pub fn render_frame<R: StereoRenderer>(&mut self, stage: &mut Stage<R>) -> FrameSource {
        let presenting = !self.disabled
            && self.display.as_ref().is_some_and(|display| display.is_presenting());
        let Some(display) = self.display.as_mut().filter(|_| presenting) else {
            self.state = PresentState::NotPresenting;
            stage.on_resize();
            stage.renderer.set_auto_clear(true);
            stage.scene.matrix_auto_update = true;
            stage.render();
            return FrameSource::Platform;
        };

        if self.state != PresentState::Presenting {
            self.state = PresentState::Presenting;
            display.request_animation_frame();
            return FrameSource::Display;
        }

        display.get_frame_data(&mut self.frame_data);

        // Matrices come straight from the frame data.
        stage.scene.matrix_auto_update = false;
        // Two passes into one surface: clear by hand.
        stage.renderer.set_auto_clear(false);
        stage.renderer.clear();

        let (left, right) = Viewport::split_eyes(stage.width as f32, stage.height as f32);
        let data = &self.frame_data;
        stage.render_eye(&data.left_view, &data.left_projection, left);
        stage.renderer.clear_depth();
        stage.render_eye(&data.right_view, &data.right_projection, right);

        display.request_animation_frame();
        display.submit_frame();
        FrameSource::Display
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn state(&self) -> PresentState {
        self.state
    }

    pub fn display(&self) -> Option<&D> {
        self.display.as_ref()
    }

    pub fn toggle_button(&self) -> Option<&ToggleButton> {
        self.toggle.as_ref()
    }

    pub fn frame_data(&self) -> &FrameData {
        &self.frame_data
    }

    pub fn is_subscribed(&self) -> bool {
        self.events.is_some()
    }
}

/// Base stage plus XR session; overrides the tick to render in stereo
/// while presenting.
pub struct XrDemo<D, R> {
    pub stage: Stage<R>,
    pub session: XrSession<D>,
}

impl<D: XrDisplay, R: StereoRenderer> XrDemo<D, R> {
    pub fn new(stage: Stage<R>, session: XrSession<D>) -> Self {
        Self { stage, session }
    }

    /// Layer presenting this demo's render surface.
    pub fn present_layer(&self) -> PresentLayer {
        PresentLayer {
            source: self.stage.renderer.surface_id(),
        }
    }

    pub async fn toggle(&mut self) {
        let layer = self.present_layer();
        self.session.toggle(layer).await;
    }

    pub async fn handle_events(&mut self) {
        let layer = self.present_layer();
        self.session.handle_events(layer).await;
    }
}

impl<D: XrDisplay, R: StereoRenderer> Demo for XrDemo<D, R> {
    type Renderer = R;

    fn stage_mut(&mut self) -> &mut Stage<R> {
        &mut self.stage
    }

    fn render_frame(&mut self) -> FrameSource {
        self.session.render_frame(&mut self.stage)
    }
}
