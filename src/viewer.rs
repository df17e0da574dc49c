// Viewer - Lifecycle, event loop wiring and teardown ordering
//
// Startup: middleware runtime -> subscriber -> event loop -> window ->
// timers. Two timers share the winit loop: a fast pump that delivers
// middleware messages and a slower refresh that repaints from the latest
// frame. Shutdown always destroys the subscriber before the runtime.

use crate::config::ViewerConfig;
use crate::display::{Display, ViewerWindow};
use crate::error::ViewerError;
use crate::frame::Frame;
use crate::middleware::{Transport, TransportError};
use crate::subscriber::ImageSubscriber;
use crate::timer::{earliest_deadline, IntervalTimer};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

/// Viewer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Runtime created, no subscription yet
    Uninitialized,
    /// Subscription bound, messages flowing
    Running,
    /// Teardown in progress
    ShuttingDown,
    /// Subscription and runtime gone
    Terminated,
}

/// Middleware runtime plus the subscriber bound on it
///
/// Teardown runs at most once, from [`Session::shutdown`] or from `Drop`,
/// so the subscriber goes before the runtime on every exit path.
pub struct Session {
    transport: Box<dyn Transport>,
    subscriber: Option<ImageSubscriber>,
    state: LifecycleState,
}

impl Session {
    /// Take ownership of an initialised runtime
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            subscriber: None,
            state: LifecycleState::Uninitialized,
        }
    }

    /// Bind the image subscriber
    pub fn start(&mut self, topic: &str) -> Result<(), TransportError> {
        if self.state != LifecycleState::Uninitialized {
            return Err(TransportError::Shutdown);
        }

        let subscriber = ImageSubscriber::new(self.transport.as_mut(), topic)?;
        self.subscriber = Some(subscriber);
        self.state = LifecycleState::Running;
        Ok(())
    }

    /// Deliver pending messages to the subscriber
    ///
    /// # Returns
    /// Number of messages delivered (0 when not running)
    pub fn pump(&mut self, timeout: Duration) -> Result<usize, TransportError> {
        match self.subscriber.as_mut() {
            Some(subscriber) => subscriber.spin_once(self.transport.as_mut(), timeout),
            None => Ok(0),
        }
    }

    /// Latest frame held by the subscriber
    pub fn latest_frame(&self) -> Option<Arc<Frame>> {
        self.subscriber.as_ref().and_then(ImageSubscriber::latest_frame)
    }

    pub fn subscriber(&self) -> Option<&ImageSubscriber> {
        self.subscriber.as_ref()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Destroy the subscriber, then shut the runtime down
    ///
    /// Errors are logged; teardown continues regardless.
    pub fn shutdown(&mut self) {
        if self.state == LifecycleState::Terminated {
            return;
        }
        self.state = LifecycleState::ShuttingDown;

        if let Some(subscriber) = self.subscriber.take() {
            if let Err(e) = subscriber.destroy(self.transport.as_mut()) {
                log::warn!("Failed to destroy subscriber: {}", e);
            }
        }
        if let Err(e) = self.transport.shutdown() {
            log::warn!("Failed to shut down middleware: {}", e);
        }

        self.state = LifecycleState::Terminated;
        log::info!("Session terminated");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// winit application: owns the session, display, window and timers
pub struct ViewerApp {
    config: ViewerConfig,
    session: Session,
    display: Display,
    window: Option<ViewerWindow>,
    pump_timer: Option<IntervalTimer>,
    refresh_timer: Option<IntervalTimer>,
    error: Option<ViewerError>,
}

impl ViewerApp {
    pub fn new(config: ViewerConfig, session: Session) -> Self {
        Self {
            config,
            session,
            display: Display::new(),
            window: None,
            pump_timer: None,
            refresh_timer: None,
            error: None,
        }
    }

    /// Start (or restart) both timers from `now`
    pub fn start_timers(&mut self, now: Instant) {
        self.pump_timer = Some(IntervalTimer::new(self.config.pump_interval(), now));
        self.refresh_timer = Some(IntervalTimer::new(self.config.refresh_interval(), now));
    }

    /// Pump tick: deliver pending middleware messages
    ///
    /// Transport errors are logged; the next tick tries again.
    pub fn pump(&mut self) -> usize {
        match self.session.pump(self.config.pump_timeout()) {
            Ok(delivered) => delivered,
            Err(e) => {
                log::warn!("Message pump failed: {}", e);
                0
            }
        }
    }

    /// Refresh tick: repaint from the latest frame
    ///
    /// # Returns
    /// `true` if the canvas changed
    pub fn refresh(&mut self) -> bool {
        let latest = self.session.latest_frame();
        let changed = self.display.refresh(latest.as_deref());
        if changed {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        changed
    }

    /// Run every due timer
    ///
    /// # Returns
    /// Earliest next deadline, `None` while the timers are stopped
    pub fn run_due_timers(&mut self, now: Instant) -> Option<Instant> {
        if self.pump_timer.as_mut().is_some_and(|t| t.poll(now)) {
            self.pump();
        }
        if self.refresh_timer.as_mut().is_some_and(|t| t.poll(now)) {
            self.refresh();
        }
        earliest_deadline(self.pump_timer.iter().chain(self.refresh_timer.iter()))
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Tear the session down
    pub fn shutdown(&mut self) {
        self.pump_timer = None;
        self.refresh_timer = None;
        self.session.shutdown();
    }

    /// Fatal error that stopped the event loop, if any
    pub fn take_error(&mut self) -> Option<ViewerError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        log::error!("{}", err);
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match ViewerWindow::create(event_loop, &self.config.window) {
            Ok(window) => {
                window.request_redraw();
                self.window = Some(window);
                self.start_timers(Instant::now());
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(ViewerWindow::id) != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                log::info!("Escape pressed, exiting...");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let result = match self.window.as_mut() {
                    Some(window) => window.resize(size),
                    None => Ok(()),
                };
                if let Err(err) = result {
                    self.fail(event_loop, err);
                }
            }
            WindowEvent::RedrawRequested => {
                let result = match self.window.as_mut() {
                    Some(window) => window.paint(self.display.canvas()),
                    None => Ok(()),
                };
                if let Err(err) = result {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(deadline) = self.run_due_timers(Instant::now()) {
            event_loop.set_control_flow(ControlFlow::WaitUntil(deadline));
        }
    }
}

/// Run the viewer until its window is closed
///
/// # Arguments
/// * `config` - Viewer configuration
/// * `transport` - Initialised middleware runtime
///
/// # Returns
/// Ok on a normal close, or the fatal error that stopped the viewer. The
/// session is torn down before this returns in both cases.
pub fn run_viewer(config: ViewerConfig, transport: Box<dyn Transport>) -> Result<(), ViewerError> {
    // Session first: it shuts the runtime down on every early return below
    let mut session = Session::new(transport);
    config.validate()?;
    session.start(&config.topic)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    log::info!("Starting viewer...");
    log::info!("  Topic: {}", config.topic);
    log::info!("  Pump interval: {:?}", config.pump_interval());
    log::info!("  Refresh interval: {:?}", config.refresh_interval());

    let mut app = ViewerApp::new(config, session);
    let result = event_loop.run_app(&mut app);
    app.shutdown();

    result?;
    match app.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
