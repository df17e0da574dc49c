// Session lifecycle tests
//
// The subscriber must be torn down before the middleware runtime on every
// exit path: explicit shutdown, drop, and unwinding out of a panic.

mod common;

use common::{bgr_pixel, lifecycle_calls, Call, RecordingTransport};
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use topic_viewer::{run_viewer, LifecycleState, Session, ViewerApp, ViewerConfig, ViewerError};

#[test]
fn test_shutdown_unsubscribes_before_runtime() {
    let (transport, journal) = RecordingTransport::new();
    let mut session = Session::new(Box::new(transport));
    session.start("/cones").unwrap();

    session.shutdown();

    assert_eq!(
        lifecycle_calls(&journal),
        vec![
            Call::Subscribe("/cones".to_string()),
            Call::Unsubscribe(1),
            Call::Shutdown
        ]
    );
    assert_eq!(session.state(), LifecycleState::Terminated);
}

#[test]
fn test_shutdown_runs_once() {
    let (transport, journal) = RecordingTransport::new();
    let mut session = Session::new(Box::new(transport));
    session.start("/cones").unwrap();

    session.shutdown();
    session.shutdown();
    drop(session);

    assert_eq!(lifecycle_calls(&journal).len(), 3);
}

#[test]
fn test_drop_tears_down_in_order() {
    let (transport, journal) = RecordingTransport::new();
    {
        let mut session = Session::new(Box::new(transport));
        session.start("/cones").unwrap();
    }

    assert_eq!(
        lifecycle_calls(&journal)[1..],
        [Call::Unsubscribe(1), Call::Shutdown]
    );
}

#[test]
fn test_panic_unwinding_tears_down_in_order() {
    let (transport, journal) = RecordingTransport::new();

    let result = panic::catch_unwind(AssertUnwindSafe(move || {
        let mut session = Session::new(Box::new(transport));
        session.start("/cones").unwrap();
        panic!("event loop crashed");
    }));

    assert!(result.is_err());
    assert_eq!(
        lifecycle_calls(&journal)[1..],
        [Call::Unsubscribe(1), Call::Shutdown]
    );
}

#[test]
fn test_failed_bind_still_shuts_runtime_down() {
    let (transport, journal) = RecordingTransport::new();
    let transport = transport.failing_subscribe();

    let mut session = Session::new(Box::new(transport));
    assert!(session.start("/cones").is_err());
    assert_eq!(session.state(), LifecycleState::Uninitialized);
    drop(session);

    // No subscription was bound, so only the runtime is torn down
    assert_eq!(
        lifecycle_calls(&journal),
        vec![Call::Subscribe("/cones".to_string()), Call::Shutdown]
    );
}

#[test]
fn test_invalid_config_still_shuts_runtime_down() {
    let (transport, journal) = RecordingTransport::new();
    let config = ViewerConfig::new().with_topic("");

    let result = run_viewer(config, Box::new(transport));

    assert!(matches!(result, Err(ViewerError::Config(_))));
    assert_eq!(lifecycle_calls(&journal), vec![Call::Shutdown]);
}

#[test]
fn test_run_viewer_failed_bind_shuts_runtime_down() {
    let (transport, journal) = RecordingTransport::new();
    let transport = transport.failing_subscribe();

    let result = run_viewer(ViewerConfig::new(), Box::new(transport));

    assert!(matches!(result, Err(ViewerError::Transport(_))));
    assert_eq!(
        lifecycle_calls(&journal),
        vec![Call::Subscribe("/cones".to_string()), Call::Shutdown]
    );
}

#[test]
fn test_app_pumps_and_refreshes_through_session() {
    let (transport, journal) = RecordingTransport::new();
    let publisher = transport.publisher("/cones");
    let mut session = Session::new(Box::new(transport));
    session.start("/cones").unwrap();

    let config = ViewerConfig::default().with_refresh_interval(Duration::from_millis(50));
    let mut app = ViewerApp::new(config, session);

    publisher.publish(bgr_pixel(10, 20, 30));
    assert_eq!(app.pump(), 1);
    assert!(app.refresh());
    assert_eq!(
        app.display().canvas().image().unwrap().get_pixel(0, 0).0,
        [30, 20, 10]
    );

    app.shutdown();
    assert_eq!(
        lifecycle_calls(&journal)[1..],
        [Call::Unsubscribe(1), Call::Shutdown]
    );
}
