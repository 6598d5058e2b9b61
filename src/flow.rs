//! Application event loop.
//!
//! The viewer runs on a single winit event loop. Key releases go to the
//! [`Context`], which may hand back a model request. Requests run as tasks on a
//! tokio runtime; their progress and final outcome come back to the event loop
//! as [`ViewerEvent`]s through an `EventLoopProxy`, so the scene is only ever
//! changed on the event loop thread.
//!
//! # Lifecycle
//!
//! 1. `resumed` opens the window and prints the key hints
//! 2. `new_events` requests a redraw once the next frame is due
//! 3. `window_event` dispatches released keys and advances animation on redraw
//! 4. `user_event` applies status lines and outcomes from finished requests
//! 5. `about_to_wait` sleeps until the next frame deadline

use std::{fmt::Debug, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, StartCause, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::{
    context::{Context, Out},
    data_structures::scene_graph::SceneEngine,
    resources::{
        Fetcher,
        model::{LoadOutcome, request_model},
    },
};

const TITLE: &str = "WPS Scene Viewer";
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Messages posted back to the event loop by request tasks.
pub enum ViewerEvent {
    Status { generation: u64, message: String },
    Loaded(LoadOutcome),
}

impl Debug for ViewerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { generation, message } => f
                .debug_struct("Status")
                .field("generation", generation)
                .field("message", message)
                .finish(),
            Self::Loaded(outcome) => f
                .debug_tuple("Loaded")
                .field(&outcome.generation)
                .field(&outcome.format)
                .finish(),
        }
    }
}

/// Paces redraws to at most one per interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameClock {
    interval: Duration,
    next_frame: Instant,
}

impl FrameClock {
    /// First frame is due at `start`.
    pub fn new(start: Instant, interval: Duration) -> Self {
        Self {
            interval,
            next_frame: start,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.next_frame
    }

    /// Whether a frame is due at `now`. A due frame pushes the deadline one
    /// interval past `now`.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now < self.next_frame {
            return false;
        }
        self.next_frame = now + self.interval;
        true
    }
}

pub struct App<E: SceneEngine, F: Fetcher> {
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<ViewerEvent>,
    fetcher: F,
    ctx: Context<E>,
    window: Option<Arc<Window>>,
    started: Instant,
    clock: FrameClock,
}

impl<E, F> App<E, F>
where
    E: SceneEngine,
    F: Fetcher + Clone + Send + Sync + 'static,
{
    pub fn new(
        event_loop: &EventLoop<ViewerEvent>,
        ctx: Context<E>,
        fetcher: F,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        let async_runtime = tokio::runtime::Runtime::new()?;
        let started = Instant::now();
        Ok(Self {
            async_runtime,
            proxy,
            fetcher,
            ctx,
            window: None,
            started,
            clock: FrameClock::new(started, FRAME_INTERVAL),
        })
    }

    fn handle_output(&self, out: Out) {
        match out {
            Out::Load(request) => {
                let fetcher = self.fetcher.clone();
                let proxy = self.proxy.clone();
                self.async_runtime.spawn(async move {
                    let generation = request.generation;
                    let status = proxy.clone();
                    let outcome = request_model(&fetcher, request, move |message: String| {
                        let event = ViewerEvent::Status {
                            generation,
                            message,
                        };
                        if let Err(e) = status.send_event(event) {
                            log::warn!("{}", e);
                        }
                    })
                    .await;
                    if let Err(e) = proxy.send_event(ViewerEvent::Loaded(outcome)) {
                        log::error!("Event loop was closed before the model arrived: {}", e);
                    }
                });
            }
            Out::Empty => (),
        }
    }

    fn update_title(&self) {
        if let Some(window) = &self.window {
            let active = self
                .ctx
                .engine
                .get_scene_object(&self.ctx.modifier.name)
                .map_or("no model", |o| o.mesh.name.as_str());
            window.set_title(&format!("{} - {} [{}]", TITLE, active, self.ctx.render_mode()));
        }
    }
}

impl<E, F> ApplicationHandler<ViewerEvent> for App<E, F>
where
    E: SceneEngine,
    F: Fetcher + Clone + Send + Sync + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window_attributes = Window::default_attributes().with_title(TITLE);
        match event_loop.create_window(window_attributes) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => {
                log::error!("Cannot create the viewer window: {}", e);
                event_loop.exit();
                return;
            }
        }
        self.ctx.greet();
        self.update_title();
    }

    fn new_events(&mut self, _event_loop: &ActiveEventLoop, _cause: StartCause) {
        if let Some(window) = &self.window {
            if self.clock.tick(Instant::now()) {
                window.request_redraw();
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Status {
                generation,
                message,
            } => self.ctx.on_status(generation, &message),
            ViewerEvent::Loaded(outcome) => {
                self.ctx.apply_outcome(outcome);
                self.update_title();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                // Commands fire on key up.
                if event.state != ElementState::Released || event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    let out = self.ctx.on_key(code);
                    self.handle_output(out);
                    self.update_title();
                }
            }
            WindowEvent::RedrawRequested => {
                let seconds = self.started.elapsed().as_secs_f32();
                self.ctx.engine.evaluate(seconds);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.clock.deadline()));
    }
}

/// Open the viewer window and run until it is closed.
pub fn run<E, F>(ctx: Context<E>, fetcher: F) -> anyhow::Result<()>
where
    E: SceneEngine,
    F: Fetcher + Clone + Send + Sync + 'static,
{
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, ctx, fetcher)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
