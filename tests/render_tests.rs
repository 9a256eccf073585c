//! Per-tick render branches: mono fallback, first-frame skip, stereo passes.

mod common;

use common::{count, layer, new_log, stage, Call, CallLog, MockDisplay, MockPlatform};
use glam::{Mat4, Vec3};
use pollster::block_on;
use xr_demo::{
    CameraSettings, Demo, DisplayEvent, FrameData, FrameSource, PresentState, StereoRenderer,
    Viewport, XrConfig, XrDemo, XrSession,
};

fn eye_frame_data() -> FrameData {
    let mut data = FrameData::default();
    data.set_left(
        Mat4::from_translation(Vec3::new(0.03, 0.0, 0.0)),
        Mat4::perspective_rh(1.5, 1.0, 0.1, 100.0),
    );
    data.set_right(
        Mat4::from_translation(Vec3::new(-0.03, 0.0, 0.0)),
        Mat4::perspective_rh(1.6, 1.0, 0.1, 100.0),
    );
    data
}

fn presenting_demo(log: &CallLog) -> XrDemo<MockDisplay, common::RecordingRenderer> {
    let platform = MockPlatform::new(vec![
        MockDisplay::new("hmd", true, log).with_frame_data(eye_frame_data())
    ]);
    let mut session = XrSession::new(&platform, XrConfig::default());
    block_on(session.discover_displays(&platform));
    let mut demo = XrDemo::new(stage(log), session);
    block_on(demo.toggle());
    log.borrow_mut().clear();
    demo
}

#[test]
fn stage_renders_mono_by_default() {
    let log = new_log();
    let mut stage = stage(&log);

    assert_eq!(stage.render_frame(), FrameSource::Platform);
    assert_eq!(count(&log, |c| matches!(c, Call::Render { .. })), 1);
}

#[test]
fn idle_tick_restores_mono_rendering() {
    let log = new_log();
    let platform = MockPlatform::new(vec![MockDisplay::new("hmd", true, &log)]);
    let mut session = XrSession::new(&platform, XrConfig::default());
    block_on(session.discover_displays(&platform));
    let mut demo = XrDemo::new(stage(&log), session);
    demo.stage.scene.matrix_auto_update = false;

    assert_eq!(demo.render_frame(), FrameSource::Platform);

    let calls = log.borrow();
    assert_eq!(calls[0], Call::SetViewport(Viewport::full(800.0, 600.0)));
    assert_eq!(calls[1], Call::SetAutoClear(true));
    assert!(matches!(calls[2], Call::Render { .. }));
    assert_eq!(calls.len(), 3);
    assert!(demo.stage.scene.matrix_auto_update);
    assert!(demo.stage.renderer.auto_clear());
    assert_eq!(demo.stage.renderer.viewport(), Viewport::full(800.0, 600.0));
}

#[test]
fn disabled_session_always_renders_mono() {
    let log = new_log();
    let platform = MockPlatform::unsupported();
    let session = XrSession::new(&platform, XrConfig::default());
    let mut demo = XrDemo::new(stage(&log), session);

    for _ in 0..3 {
        assert_eq!(demo.render_frame(), FrameSource::Platform);
    }
    assert_eq!(count(&log, |c| matches!(c, Call::Render { .. })), 3);
    assert_eq!(count(&log, |c| *c == Call::SubmitFrame), 0);
}

#[test]
fn first_tick_after_activation_only_requests_display_frame() {
    let log = new_log();
    let mut demo = presenting_demo(&log);
    assert_eq!(demo.session.state(), PresentState::JustActivated);

    assert_eq!(demo.render_frame(), FrameSource::Display);

    assert_eq!(*log.borrow(), vec![Call::RequestAnimationFrame]);
    assert_eq!(demo.session.state(), PresentState::Presenting);
}

#[test]
fn stereo_tick_renders_both_eyes_in_order() {
    let log = new_log();
    let mut demo = presenting_demo(&log);
    demo.render_frame();
    log.borrow_mut().clear();

    assert_eq!(demo.render_frame(), FrameSource::Display);

    let data = eye_frame_data();
    let expected = vec![
        Call::GetFrameData,
        Call::SetAutoClear(false),
        Call::Clear,
        Call::SetViewport(Viewport::new(0.0, 0.0, 400.0, 600.0)),
        Call::Render {
            projection: Mat4::from_cols_array(&data.left_projection),
            world: Mat4::from_cols_array(&data.left_view),
        },
        Call::ClearDepth,
        Call::SetViewport(Viewport::new(400.0, 0.0, 400.0, 600.0)),
        Call::Render {
            projection: Mat4::from_cols_array(&data.right_projection),
            world: Mat4::from_cols_array(&data.right_view),
        },
        Call::RequestAnimationFrame,
        Call::SubmitFrame,
    ];
    assert_eq!(*log.borrow(), expected);
    assert!(!demo.stage.scene.matrix_auto_update);
    assert!(!demo.stage.renderer.auto_clear());
    assert_eq!(demo.stage.renderer.viewport(), Viewport::new(400.0, 0.0, 400.0, 600.0));
    assert_eq!(demo.session.frame_data(), &data);
}

#[test]
fn every_stereo_tick_submits_exactly_once() {
    let log = new_log();
    let mut demo = presenting_demo(&log);
    demo.render_frame();
    log.borrow_mut().clear();

    for _ in 0..5 {
        demo.render_frame();
    }

    assert_eq!(count(&log, |c| *c == Call::GetFrameData), 5);
    assert_eq!(count(&log, |c| matches!(c, Call::Render { .. })), 10);
    assert_eq!(count(&log, |c| *c == Call::ClearDepth), 5);
    assert_eq!(count(&log, |c| *c == Call::SubmitFrame), 5);
}

#[test]
fn stopping_presentation_falls_back_to_mono() {
    let log = new_log();
    let mut demo = presenting_demo(&log);
    demo.render_frame();
    demo.render_frame();

    demo.session.deactivate();
    log.borrow_mut().clear();

    assert_eq!(demo.render_frame(), FrameSource::Platform);
    assert_eq!(demo.session.state(), PresentState::NotPresenting);
    assert_eq!(count(&log, |c| *c == Call::SubmitFrame), 0);
    assert_eq!(count(&log, |c| *c == Call::SetAutoClear(true)), 1);
    assert!(demo.stage.scene.matrix_auto_update);
}

#[test]
fn reactivation_skips_the_first_frame_again() {
    let log = new_log();
    let mut demo = presenting_demo(&log);
    demo.render_frame();
    demo.render_frame();
    demo.session.deactivate();
    demo.render_frame();

    block_on(demo.toggle());
    log.borrow_mut().clear();

    assert_eq!(demo.render_frame(), FrameSource::Display);
    assert_eq!(*log.borrow(), vec![Call::RequestAnimationFrame]);
}

#[test]
fn presentation_started_elsewhere_still_skips_first_frame() {
    let log = new_log();
    let display = MockDisplay::new("hmd", true, &log);
    let platform = MockPlatform::new(vec![display.clone()]);
    let mut session = XrSession::new(&platform, XrConfig::default());
    block_on(session.discover_displays(&platform));
    let mut demo = XrDemo::new(stage(&log), session);

    display.set_presenting(true);

    assert_eq!(demo.render_frame(), FrameSource::Display);
    assert_eq!(*log.borrow(), vec![Call::RequestAnimationFrame]);
}

#[test]
fn present_layer_names_the_renderer_surface() {
    let log = new_log();
    let demo = presenting_demo(&log);
    assert_eq!(demo.present_layer(), layer());
}

#[test]
fn repeated_activate_event_keeps_rendering_in_stereo() {
    let log = new_log();
    let platform = MockPlatform::new(vec![
        MockDisplay::new("hmd", true, &log).with_frame_data(eye_frame_data())
    ]);
    let mut session = XrSession::new(&platform, XrConfig::default());
    block_on(session.discover_displays(&platform));
    let mut demo = XrDemo::new(stage(&log), session);
    block_on(demo.toggle());
    demo.render_frame();
    demo.render_frame();

    platform.emit(DisplayEvent::Activate);
    block_on(demo.handle_events());
    log.borrow_mut().clear();

    assert_eq!(demo.render_frame(), FrameSource::Display);
    assert_eq!(demo.session.state(), PresentState::Presenting);
    assert_eq!(count(&log, |c| matches!(c, Call::RequestPresent(_))), 0);
    assert_eq!(count(&log, |c| matches!(c, Call::Render { .. })), 2);
    assert_eq!(count(&log, |c| *c == Call::SubmitFrame), 1);
}

#[test]
fn resize_updates_viewport_and_aspect_on_next_mono_tick() {
    let log = new_log();
    let mut stage = stage(&log);

    stage.resize(1000, 500);
    stage.resize(0, 500);
    stage.resize(1000, 0);
    assert_eq!((stage.width, stage.height), (1000, 500));

    let platform = MockPlatform::new(Vec::new());
    let session = XrSession::new(&platform, XrConfig::default());
    let mut demo = XrDemo::<MockDisplay, _>::new(stage, session);
    assert_eq!(demo.render_frame(), FrameSource::Platform);

    let settings = CameraSettings::default();
    let projection = Mat4::perspective_rh(
        settings.fov_y_degrees.to_radians(),
        2.0,
        settings.near,
        settings.far,
    );
    let calls = log.borrow();
    assert_eq!(calls[0], Call::SetViewport(Viewport::full(1000.0, 500.0)));
    assert!(calls.iter().any(|c| matches!(
        c,
        Call::Render { projection: p, .. } if *p == projection
    )));
}
