//! Desktop host: winit window, wgpu renderer, egui overlay and a simulated
//! headset wired to the XR demo.
//!
//! Keys: `F` signals the headset being put on (display activate), `Escape`
//! signals it being taken off (display deactivate).

use std::sync::Arc;
use std::time::Instant;

use log::{error, info};
use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::config::XrConfig;
use crate::display::DisplayEvent;
use crate::renderer::WgpuRenderer;
use crate::session::{XrDemo, XrSession};
use crate::sim::{SimulatedDisplay, SimulatedDisplayConfig, SimulatedPlatform};
use crate::stage::{Demo, FrameSource, Stage};
use crate::ui;

/// Main application state
pub struct XrApp {
    config: XrConfig,
    platform: SimulatedPlatform,
    // Same display the platform hands to the session; kept to follow its
    // frame requests.
    display: SimulatedDisplay,
    window: Option<Arc<Window>>,
    demo: Option<XrDemo<SimulatedDisplay, WgpuRenderer>>,
    egui_state: Option<egui_winit::State>,
    last_frame_time: Instant,
}

impl XrApp {
    pub fn new(config: XrConfig) -> Self {
        let display = SimulatedDisplay::new(SimulatedDisplayConfig::default());
        Self {
            config,
            platform: SimulatedPlatform::new(vec![display.clone()]),
            display,
            window: None,
            demo: None,
            egui_state: None,
            last_frame_time: Instant::now(),
        }
    }

    fn eye_aspect(width: u32, height: u32) -> f32 {
        (width as f32 * 0.5) / height.max(1) as f32
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        let (Some(demo), Some(window), Some(state)) =
            (&mut self.demo, &self.window, &mut self.egui_state)
        else {
            return;
        };

        // UI
        let raw_input = state.take_egui_input(window);
        let mut toggle_clicked = false;
        let mut full_output = state.egui_ctx().run(raw_input, |ctx| {
            if let Some(button) = demo.session.toggle_button() {
                toggle_clicked |= button.show(ctx);
            }
        });
        let platform_output = std::mem::take(&mut full_output.platform_output);
        state.handle_platform_output(window, platform_output);

        if toggle_clicked {
            pollster::block_on(demo.toggle());
        }
        pollster::block_on(demo.handle_events());

        demo.stage.update(dt);
        let source = demo.render_frame();

        let ctx = state.egui_ctx().clone();
        demo.stage.renderer.end_frame(Some((&ctx, full_output)));

        // The simulated display paces itself on the window's redraws.
        match source {
            FrameSource::Platform => window.request_redraw(),
            FrameSource::Display => {
                if self.display.take_frame_request() {
                    window.request_redraw();
                }
            }
        }
    }
}

impl ApplicationHandler for XrApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        info!("App resumed - creating window");

        let window_attrs = Window::default_attributes().with_title("XR Demo");
        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(WgpuRenderer::new(window.clone())) {
            Ok(renderer) => renderer,
            Err(e) => {
                error!("Failed to initialize renderer: {}", e);
                event_loop.exit();
                return;
            }
        };
        info!("Renderer initialized");

        let size = window.inner_size();
        self.display.set_eye_aspect(Self::eye_aspect(size.width, size.height));
        let stage = Stage::new(renderer, size.width.max(1), size.height.max(1), self.config.camera);

        let mut session = XrSession::new(&self.platform, self.config.clone());
        pollster::block_on(session.discover_displays(&self.platform));
        self.demo = Some(XrDemo::new(stage, session));

        let ctx = egui::Context::default();
        ui::apply_theme(&ctx);
        self.egui_state = Some(egui_winit::State::new(
            ctx,
            egui::ViewportId::ROOT,
            event_loop,
            Some(window.scale_factor() as f32),
            None,
            None,
        ));

        self.last_frame_time = Instant::now();
        window.request_redraw();
        self.window = Some(window);
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        info!("App suspended - releasing GPU resources");
        if let Some(demo) = &mut self.demo {
            demo.session.deactivate();
            demo.session.dispose();
        }
        self.demo = None;
        self.egui_state = None;
        self.window = None;
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let response = if let (Some(state), Some(window)) = (&mut self.egui_state, &self.window) {
            state.on_window_event(window, &event)
        } else {
            Default::default()
        };
        if response.repaint {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested");
                if let Some(demo) = &mut self.demo {
                    demo.session.dispose();
                }
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(),
            WindowEvent::Resized(size) => {
                if let Some(demo) = &mut self.demo {
                    demo.stage.resize(size.width, size.height);
                }
                self.display.set_eye_aspect(Self::eye_aspect(size.width, size.height));
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                let signal = match &event.logical_key {
                    Key::Character(c) if c.eq_ignore_ascii_case("f") => Some(DisplayEvent::Activate),
                    Key::Named(NamedKey::Escape) => Some(DisplayEvent::Deactivate),
                    _ => None,
                };
                if let Some(signal) = signal {
                    info!("Simulated display event: {:?}", signal);
                    self.platform.emit(signal);
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
            _ => {}
        }
    }
}

/// Runs the demo until the window closes.
pub fn run() -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = XrApp::new(XrConfig::default());
    event_loop.run_app(&mut app)
}
