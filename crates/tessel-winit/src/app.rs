use std::collections::HashMap;
use std::time::Instant;

pub use winit::error::{EventLoopError, OsError};
use winit::event_loop::ActiveEventLoop;
use winit::window::WindowId;

use tessel_core::config::Config;
use tessel_core::profiling::{self, profile_scope};

use crate::{
    event::{Event, EventBatch, EventQueue, HandleStatus},
    time::{FpsCounter, FrameLimiter, FrameTime, TimeTracker},
    window::{Window, WindowDescriptor},
};

struct WindowResources {
    events: EventQueue,
    scale_factor: f64,
}

pub struct AppCtx<'a> {
    event_loop: &'a ActiveEventLoop,
    windows: &'a mut HashMap<WindowId, WindowResources>,
    config: &'a Config,
}

impl AppCtx<'_> {
    pub fn create_window(&mut self, mut descriptor: WindowDescriptor) -> Result<Window, OsError> {
        descriptor.hide_cursor |= self.config.hide_cursor;
        let window = Window::new(self.event_loop, descriptor)?;

        self.windows.insert(
            window.id(),
            WindowResources {
                events: EventQueue::new(),
                scale_factor: window.scale_factor(),
            },
        );

        Ok(window)
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn exit(&self) {
        self.event_loop.exit();
    }
}

pub trait App {
    /// Called once when the app starts, before the first update.
    #[allow(unused_variables)]
    fn on_start(&mut self, ctx: &mut AppCtx) {}

    /// Called once per frame before any window renders.
    #[allow(unused_variables)]
    fn update(&mut self, ctx: &mut AppCtx, time: &FrameTime) {}

    /// Called once per window that needs rendering, with the native events
    /// queued for it since its last frame.
    ///
    /// Returning `false` ends the application.
    fn render(&mut self, ctx: &mut AppCtx, window_id: WindowId, events: &mut EventBatch) -> bool;

    /// Called when the app is about to exit.
    #[allow(unused_variables)]
    fn on_exit(&mut self, ctx: &mut AppCtx) {}
}

pub type AppFactory = fn(ctx: &mut AppCtx) -> Result<Box<dyn App>, OsError>;

struct AppProxy {
    factory: AppFactory,
    config: Config,
    app: Option<Box<dyn App>>,
    windows: HashMap<WindowId, WindowResources>,
    time_tracker: TimeTracker,
    limiter: FrameLimiter,
    fps: FpsCounter,
    frame_start: Option<Instant>,
    exiting: bool,
}

impl AppProxy {
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if self.exiting {
            return;
        }
        self.exiting = true;

        if let Some(app) = self.app.as_mut() {
            let mut ctx = AppCtx {
                event_loop,
                windows: &mut self.windows,
                config: &self.config,
            };
            app.on_exit(&mut ctx);
        }
        event_loop.exit();
    }
}

impl winit::application::ApplicationHandler for AppProxy {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }

        let mut ctx = AppCtx {
            event_loop,
            windows: &mut self.windows,
            config: &self.config,
        };
        match (self.factory)(&mut ctx) {
            Ok(mut app) => {
                app.on_start(&mut ctx);
                self.app = Some(app);
            }
            Err(err) => {
                tracing::error!("failed to start application: {}", err);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // A frame ran since the last wait: cap the rate before the next one.
        if let Some(frame_start) = self.frame_start.take() {
            self.limiter.wait(frame_start);
            self.fps.frame(Instant::now());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: winit::event::WindowEvent,
    ) {
        use winit::event::WindowEvent;

        if self.app.is_none() || self.exiting {
            return;
        }

        match event {
            WindowEvent::RedrawRequested => {
                profile_scope!("frame");

                let mut keep_running = true;
                {
                    let Some(app) = self.app.as_mut() else {
                        return;
                    };
                    let mut ctx = AppCtx {
                        event_loop,
                        windows: &mut self.windows,
                        config: &self.config,
                    };

                    if self.frame_start.is_none() {
                        profiling::new_frame();
                        self.frame_start = Some(Instant::now());
                        let frame_time = self.time_tracker.tick();
                        app.update(&mut ctx, &frame_time);
                    }

                    let Some(window) = ctx.windows.get_mut(&window_id) else {
                        return;
                    };
                    let mut events = window.events.drain();

                    if !app.render(&mut ctx, window_id, &mut events) {
                        keep_running = false;
                    }

                    events.dispatch(|event| match event {
                        Event::CloseRequested => {
                            tracing::info!("Close requested for window {:?}", window_id);
                            keep_running = false;
                            HandleStatus::consumed()
                        }
                        _ => HandleStatus::ignored(),
                    });
                }

                if !keep_running {
                    self.shutdown(event_loop);
                }
            }
            event => {
                let Some(window) = self.windows.get_mut(&window_id) else {
                    return;
                };
                if let WindowEvent::ScaleFactorChanged { scale_factor, .. } = event {
                    window.scale_factor = scale_factor;
                }
                if let Some(event) = Event::from_winit(event, window.scale_factor) {
                    window.events.push(event);
                }
            }
        }
    }
}

/// Run the application with configuration read from the environment.
pub fn run_app(factory: AppFactory) -> Result<(), EventLoopError> {
    run_app_with(Config::from_env(), factory)
}

/// Run the application until it exits.
///
/// Installs logging and profiling as configured, then polls the event loop
/// continuously; each frame is capped to `config.target_fps`.
pub fn run_app_with(config: Config, factory: AppFactory) -> Result<(), EventLoopError> {
    use winit::event_loop::{ControlFlow, EventLoop};

    tessel_core::logging::init_with_filter(&config.log_filter);
    if let Some(backend) = config.profiling.backend() {
        profiling::init_profiling(backend);
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app_proxy = AppProxy {
        factory,
        limiter: FrameLimiter::new(config.target_fps),
        config,
        app: None,
        windows: HashMap::new(),
        time_tracker: TimeTracker::new(),
        fps: FpsCounter::new(),
        frame_start: None,
        exiting: false,
    };
    event_loop.run_app(&mut app_proxy)
}
