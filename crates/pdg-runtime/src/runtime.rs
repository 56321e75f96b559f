// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The runtime context: startup, the cooperative main loop and teardown.

use crate::collaborators::{FrameRenderer, IdleService, InputPoller, Subsystem};
use crate::config::RuntimeConfig;
use crate::input::{InputDispatcher, InputState};
use anyhow::{bail, Context, Result};
use log::LevelFilter;
use pdg_core::event::{PortDrawInfo, ShutdownInfo, StartupInfo};
use pdg_core::{Clock, EventManager, EventPayload, EventType, SystemClock, TimerManager, WakeHandle};
use pdg_telemetry::{logging, FrameStats, LoopCounters};
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// The step of a loop iteration the runtime is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Firing due timers. Also the state between iterations.
    CheckTimers,
    /// Drawing a frame if the redraw deadline has passed.
    MaybeDraw,
    /// Blocked on the wake signal.
    Sleep,
    /// Redelivering events from the cross-thread queue.
    DrainQueue,
    /// Polling platform input.
    PollInput,
    /// Giving network and audio their slice.
    IdleCollaborators,
    /// Torn down.
    Stopped,
}

/// One step of the fixed teardown sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeardownStage {
    /// Network service.
    Network,
    /// Audio service.
    Audio,
    /// Renderer and platform input.
    Graphics,
    /// Timer manager.
    Timers,
    /// Event manager and its queue.
    Events,
    /// Resource subsystem.
    Resources,
    /// Runtime configuration.
    Config,
    /// Logger.
    Log,
}

impl fmt::Display for TeardownStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TeardownStage::Network => "network",
            TeardownStage::Audio => "audio",
            TeardownStage::Graphics => "graphics",
            TeardownStage::Timers => "timers",
            TeardownStage::Events => "events",
            TeardownStage::Resources => "resources",
            TeardownStage::Config => "config",
            TeardownStage::Log => "log",
        };
        f.write_str(name)
    }
}

/// What [`Runtime::shutdown`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    /// The code passed to the last [`QuitHandle::quit`], 0 if none.
    pub exit_code: i32,
    /// The stages torn down, in order. Stages with nothing to tear down are
    /// left out.
    pub teardown: Vec<TeardownStage>,
    /// Loop totals at shutdown.
    pub counters: LoopCounters,
}

#[derive(Debug, Default)]
struct QuitState {
    quitting: AtomicBool,
    exit_code: AtomicI32,
}

/// Requests the main loop to stop. Cloneable and usable from any thread or
/// handler.
#[derive(Debug, Clone)]
pub struct QuitHandle {
    state: Arc<QuitState>,
    wake: WakeHandle,
}

impl QuitHandle {
    fn new(wake: WakeHandle) -> Self {
        Self {
            state: Arc::default(),
            wake,
        }
    }

    /// Asks the loop to stop after the current iteration and exit with
    /// `exit_code`. Wakes a sleeping loop.
    pub fn quit(&self, exit_code: i32) {
        self.state.exit_code.store(exit_code, Ordering::Release);
        if !self.state.quitting.swap(true, Ordering::AcqRel) {
            log::info!("Quit requested (exit code {exit_code})");
        }
        self.wake.signal();
    }

    /// Returns `true` once a quit has been requested.
    pub fn is_quitting(&self) -> bool {
        self.state.quitting.load(Ordering::Acquire)
    }

    /// The exit code of the last quit request.
    pub fn exit_code(&self) -> i32 {
        self.state.exit_code.load(Ordering::Acquire)
    }
}

/// Assembles a [`Runtime`] from its configuration and collaborators.
#[derive(Default)]
pub struct RuntimeBuilder {
    config: Option<RuntimeConfig>,
    config_path: Option<PathBuf>,
    clock: Option<Arc<dyn Clock>>,
    args: Vec<String>,
    init_logging: bool,
    renderer: Option<Box<dyn FrameRenderer>>,
    input: Option<Box<dyn InputPoller>>,
    network: Option<Box<dyn IdleService>>,
    audio: Option<Box<dyn IdleService>>,
    resources: Option<Box<dyn Subsystem>>,
}

impl RuntimeBuilder {
    /// Starts from the default configuration, the system clock and no
    /// collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `config`.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Loads the configuration from a JSON file at build time. Takes
    /// precedence over [`config`](Self::config).
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Reads time from `clock` instead of the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Command line arguments, program name first. Passed to the startup
    /// event and scanned for `-loglevel=`.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Installs the global logger at build time.
    pub fn init_logging(mut self, enabled: bool) -> Self {
        self.init_logging = enabled;
        self
    }

    /// Attaches a renderer. Without one the runtime is headless.
    pub fn renderer(mut self, renderer: Box<dyn FrameRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Attaches a platform input poller.
    pub fn input_poller(mut self, poller: Box<dyn InputPoller>) -> Self {
        self.input = Some(poller);
        self
    }

    /// Attaches the network service.
    pub fn network(mut self, service: Box<dyn IdleService>) -> Self {
        self.network = Some(service);
        self
    }

    /// Attaches the audio service.
    pub fn audio(mut self, service: Box<dyn IdleService>) -> Self {
        self.audio = Some(service);
        self
    }

    /// Attaches the resource subsystem, touched only at teardown.
    pub fn resources(mut self, resources: Box<dyn Subsystem>) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Creates the runtime.
    ///
    /// Fails only when a configuration file was given and cannot be loaded.
    pub fn build(self) -> Result<Runtime> {
        let RuntimeBuilder {
            config,
            config_path,
            clock,
            args,
            init_logging,
            renderer,
            input,
            network,
            audio,
            resources,
        } = self;

        let config = match config_path {
            Some(path) => RuntimeConfig::from_file(&path)
                .with_context(|| format!("loading runtime config from {}", path.display()))?,
            None => config.unwrap_or_default(),
        };

        if init_logging {
            let level = args
                .iter()
                .any(|arg| arg.starts_with(logging::LOG_LEVEL_ARG))
                .then(|| logging::level_from_args(&args, LevelFilter::Info));
            logging::init(&config.log_filter, level);
        }

        let clock = clock.unwrap_or_else(|| Arc::new(SystemClock::new()) as Arc<dyn Clock>);
        let events = Arc::new(EventManager::with_capacity(config.queue_capacity()));
        let timers = Arc::new(TimerManager::new(Arc::clone(&clock)));
        let frames = FrameStats::new(
            config.target_fps,
            config.fps_sample_frames,
            config.fps_warn_ratio,
        );
        let quit = QuitHandle::new(events.wake_handle());

        log::debug!(
            "Runtime built: renderer={}, input={}, network={}, audio={}, resources={}",
            renderer.is_some(),
            input.is_some(),
            network.is_some(),
            audio.is_some(),
            resources.is_some()
        );

        Ok(Runtime {
            config,
            clock,
            events,
            timers,
            input_state: InputState::new(),
            frames,
            counters: LoopCounters::default(),
            quit,
            phase: LoopPhase::CheckTimers,
            args,
            started: false,
            stopped: false,
            renderer,
            input,
            network,
            audio,
            resources,
        })
    }
}

/// The application context: event manager, timer manager, input state,
/// collaborators and the main loop that drives them.
///
/// All dispatch happens on the thread that calls [`step`](Self::step) or
/// [`run`](Self::run). Other threads interact only through
/// [`EventManager::enqueue_event`] and [`QuitHandle`].
///
/// Dropping a runtime that was not shut down performs the shutdown.
pub struct Runtime {
    config: RuntimeConfig,
    clock: Arc<dyn Clock>,
    events: Arc<EventManager>,
    timers: Arc<TimerManager>,
    input_state: InputState,
    frames: FrameStats,
    counters: LoopCounters,
    quit: QuitHandle,
    phase: LoopPhase,
    args: Vec<String>,
    started: bool,
    stopped: bool,
    renderer: Option<Box<dyn FrameRenderer>>,
    input: Option<Box<dyn InputPoller>>,
    network: Option<Box<dyn IdleService>>,
    audio: Option<Box<dyn IdleService>>,
    resources: Option<Box<dyn Subsystem>>,
}

impl Runtime {
    /// Shorthand for [`RuntimeBuilder::new`].
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// The event manager. Clone the `Arc` to hand it to producer threads.
    pub fn events(&self) -> &Arc<EventManager> {
        &self.events
    }

    /// The timer manager.
    pub fn timers(&self) -> &Arc<TimerManager> {
        &self.timers
    }

    /// The clock every deadline is measured with.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Current time on the runtime's clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// The active configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Key, button and pointer state as last reported by the input poller.
    pub fn input_state(&self) -> &InputState {
        &self.input_state
    }

    /// Loop totals so far.
    pub fn counters(&self) -> &LoopCounters {
        &self.counters
    }

    /// The phase the loop is in.
    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// A handle that stops the loop.
    pub fn quit_handle(&self) -> QuitHandle {
        self.quit.clone()
    }

    /// Returns `true` once a quit has been requested.
    pub fn is_quitting(&self) -> bool {
        self.quit.is_quitting()
    }

    /// Sets the frame rate to aim for. Values `<= 0` fall back to 30.
    pub fn set_target_fps(&mut self, fps: f32) {
        self.frames.set_target_fps(fps);
    }

    /// The frame rate being aimed for.
    pub fn target_fps(&self) -> f32 {
        self.frames.target_fps()
    }

    /// The last measured frame rate, `0.0` when headless.
    pub fn current_fps(&self) -> f32 {
        self.frames.current_fps()
    }

    /// Number of frames drawn so far.
    pub fn frame_num(&self) -> u32 {
        self.frames.frame_num()
    }

    /// Posts [`EventType::STARTUP`] with the command line arguments.
    ///
    /// Called implicitly by the first [`step`](Self::step); calling it again is
    /// a no-op. Fails after shutdown.
    pub fn startup(&mut self) -> Result<()> {
        if self.stopped {
            bail!("runtime has already been shut down");
        }
        if !self.started {
            self.post_startup();
        }
        Ok(())
    }

    fn post_startup(&mut self) {
        self.started = true;
        log::info!(
            "Runtime starting: target {:.1} fps, poll cap {} ms",
            self.frames.target_fps(),
            self.config.effective_poll_interval(self.renderer.is_some())
        );
        let info = StartupInfo {
            reason: 0,
            args: self.args.clone(),
        };
        self.events
            .post_event(EventType::STARTUP, &EventPayload::Startup(info), None);
    }

    /// Runs one loop iteration: fire due timers, maybe draw a frame, sleep
    /// until the nearest deadline or a wake signal, drain the cross-thread
    /// queue, poll input, idle network and audio.
    ///
    /// Returns `false` without doing anything once a quit has been requested
    /// or the runtime has been shut down.
    pub fn step(&mut self) -> bool {
        if self.stopped || self.quit.is_quitting() {
            return false;
        }
        if !self.started {
            self.post_startup();
        }

        self.enter(LoopPhase::CheckTimers);
        let fired = self.timers.check_timers(&self.events);
        self.counters.timers_fired += fired as u64;

        self.enter(LoopPhase::MaybeDraw);
        self.maybe_draw();

        self.enter(LoopPhase::Sleep);
        if !self.quit.is_quitting() {
            let bound = self.sleep_bound();
            if self.events.wait_for_wake(Duration::from_millis(bound)) {
                self.counters.wakeups += 1;
            }
        }

        self.enter(LoopPhase::DrainQueue);
        let drained = self.events.drain_queue();
        self.counters.queued_events += drained as u64;
        if drained > 0 {
            log::trace!("Dequeued {drained} event(s)");
        }

        self.enter(LoopPhase::PollInput);
        self.poll_input();

        self.enter(LoopPhase::IdleCollaborators);
        self.idle_collaborators();

        self.counters.iterations += 1;
        self.phase = LoopPhase::CheckTimers;
        true
    }

    /// How long the sleep step may block, in milliseconds: the nearest timer
    /// deadline, the next redraw deadline and the poll interval cap, whichever
    /// comes first.
    pub fn sleep_bound(&self) -> u64 {
        let has_renderer = self.renderer.is_some();
        let mut bound = self
            .timers
            .ms_till_next_fire()
            .unwrap_or(u64::MAX)
            .min(self.config.effective_poll_interval(has_renderer));
        if has_renderer {
            bound = bound.min(self.frames.ms_till_next_draw(self.clock.now_ms()));
        }
        bound
    }

    /// Starts up, loops until a quit is requested, then shuts down.
    pub fn run(&mut self) -> Result<ShutdownReport> {
        self.startup()?;
        while self.step() {}
        Ok(self.shutdown())
    }

    /// Posts [`EventType::SHUTDOWN`], then tears everything down in a fixed
    /// order: network, audio, graphics, timers, events, resources, config,
    /// log. A second call does nothing.
    pub fn shutdown(&mut self) -> ShutdownReport {
        let exit_code = self.quit.exit_code();
        if self.stopped {
            log::debug!("shutdown: runtime already stopped");
            return ShutdownReport {
                exit_code,
                teardown: Vec::new(),
                counters: self.counters,
            };
        }
        self.stopped = true;
        self.quit.state.quitting.store(true, Ordering::Release);

        log::info!("Runtime shutting down (exit code {exit_code})");
        let info = ShutdownInfo {
            exit_reason: 0,
            exit_code,
        };
        self.events
            .post_event(EventType::SHUTDOWN, &EventPayload::Shutdown(info), None);

        let mut teardown = Vec::with_capacity(8);
        if let Some(network) = self.network.take() {
            close_subsystem(&mut self.counters, network);
            teardown.push(TeardownStage::Network);
        }
        if let Some(audio) = self.audio.take() {
            close_subsystem(&mut self.counters, audio);
            teardown.push(TeardownStage::Audio);
        }
        let renderer = self.renderer.take();
        let input = self.input.take();
        if renderer.is_some() || input.is_some() {
            if let Some(input) = input {
                close_subsystem(&mut self.counters, input);
            }
            if let Some(renderer) = renderer {
                close_subsystem(&mut self.counters, renderer);
            }
            teardown.push(TeardownStage::Graphics);
        }

        self.timers.cancel_all_timers();
        teardown.push(TeardownStage::Timers);

        self.events.close();
        self.events.clear(true);
        teardown.push(TeardownStage::Events);

        if let Some(resources) = self.resources.take() {
            close_subsystem(&mut self.counters, resources);
            teardown.push(TeardownStage::Resources);
        }

        log::debug!("Releasing runtime configuration");
        teardown.push(TeardownStage::Config);

        self.counters.log_summary();
        logging::flush();
        teardown.push(TeardownStage::Log);

        self.phase = LoopPhase::Stopped;
        ShutdownReport {
            exit_code,
            teardown,
            counters: self.counters,
        }
    }

    fn enter(&mut self, phase: LoopPhase) {
        self.phase = phase;
        log::trace!("Loop phase {phase:?}");
    }

    fn maybe_draw(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            self.frames.reset_fps();
            return;
        };
        let now = self.clock.now_ms();
        if !self.frames.is_draw_due(now) {
            return;
        }

        let frame_num = self.frames.begin_frame(now);
        let result = renderer.begin_frame(frame_num);
        check_hook(&mut self.counters, renderer.name(), "begin_frame", result);

        let payload = EventPayload::PortDraw(PortDrawInfo { frame_num });
        self.events.post_event(EventType::PORT_DRAW, &payload, None);

        let result = renderer.end_frame(frame_num);
        check_hook(&mut self.counters, renderer.name(), "end_frame", result);
        self.counters.frames_drawn += 1;
    }

    fn poll_input(&mut self) {
        let Some(poller) = self.input.as_mut() else {
            return;
        };
        let now = self.clock.now_ms();
        let mut dispatcher = InputDispatcher::new(&mut self.input_state, &self.events, now);
        let result = poller.poll_input(&mut dispatcher);
        check_hook(&mut self.counters, poller.name(), "poll_input", result);
    }

    fn idle_collaborators(&mut self) {
        for service in [self.network.as_mut(), self.audio.as_mut()]
            .into_iter()
            .flatten()
        {
            let result = service.idle(&self.events);
            check_hook(&mut self.counters, service.name(), "idle", result);
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if !self.stopped {
            log::info!("Runtime dropped while running. Performing controlled shutdown...");
            self.shutdown();
        }
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("phase", &self.phase)
            .field("started", &self.started)
            .field("stopped", &self.stopped)
            .field("frame_num", &self.frames.frame_num())
            .field("events", &self.events)
            .field("timers", &self.timers)
            .finish_non_exhaustive()
    }
}

fn check_hook(counters: &mut LoopCounters, subsystem: &str, hook: &str, result: Result<()>) {
    if let Err(e) = result {
        counters.collaborator_errors += 1;
        log::error!("{subsystem}: {hook} failed: {e:#}");
    }
}

fn close_subsystem<S: Subsystem + ?Sized>(counters: &mut LoopCounters, mut subsystem: Box<S>) {
    let result = subsystem.shutdown();
    check_hook(counters, subsystem.name(), "shutdown", result);
    log::debug!("{} shut down", subsystem.name());
}
