//! Simulation engine control loop
//!
//! A single thread runs `step()` repeatedly: take at most one control message,
//! advance physics if running, publish a frame. `run()` adds pacing and the
//! fault policy: a failed or panicking tick is logged, the loop backs off,
//! recovers the state and carries on. Only a shutdown request ends it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info};

use crate::channel::{
    ControlPoll, ControlReceiver, ControlSender, FrameReceiver, FrameSender, Publish,
    control_channel, frame_channel,
};
use crate::consts::SIM_DT;
use crate::error::{ControlError, TickError};
use crate::protocol::{ControlMessage, Frame};
use crate::settings::{EngineConfig, SimParams};
use crate::sim::{SimState, TickStats, tick};

pub use crate::sim::RunState;

/// What one loop iteration did
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Stopped; nothing advanced
    Idle,
    /// One physics tick ran and a frame was offered to the data channel
    Ticked { stats: TickStats, publish: Publish },
    /// Shutdown was requested or the control channel closed
    Shutdown,
}

pub struct SimulationEngine {
    state: SimState,
    params: SimParams,
    config: EngineConfig,
    control: ControlReceiver,
    frames: FrameSender,
    shutdown: Arc<AtomicBool>,
    frames_dropped: u64,
}

impl SimulationEngine {
    pub fn new(config: EngineConfig, control: ControlReceiver, frames: FrameSender) -> Self {
        Self {
            state: SimState::new(config.seed),
            params: config.params,
            config,
            control,
            frames,
            shutdown: Arc::new(AtomicBool::new(false)),
            frames_dropped: 0,
        }
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimState {
        &mut self.state
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Frames discarded because the consumer fell behind
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }

    /// Flag that stops the loop at the next step boundary when set
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Apply one control message: command first, then parameters
    fn apply(&mut self, msg: ControlMessage) {
        if let Some(command) = msg.command {
            self.state.apply_command(command, self.params.photons_per_burst);
        }
        if let Some(update) = msg.params {
            self.params = self.params.merged(&update);
            info!(
                "Parameters: burst={} decay={} time_scale={}",
                self.params.photons_per_burst, self.params.global_decay, self.params.time_scale
            );
        }
    }

    /// One loop iteration, without sleeping
    pub fn step(&mut self) -> Result<Step, TickError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Ok(Step::Shutdown);
        }

        match self.control.poll() {
            ControlPoll::Message(msg) => self.apply(msg),
            ControlPoll::Empty => {}
            ControlPoll::Disconnected => return Ok(Step::Shutdown),
        }

        if !self.state.is_running() {
            return Ok(Step::Idle);
        }

        let stats = tick(&mut self.state, &self.params, SIM_DT)?;

        let frame = Frame::capture(&self.state, stats.total_energy);
        let publish = self.frames.publish(frame);
        if publish == Publish::Dropped {
            self.frames_dropped += 1;
        }

        self.log_stats(&stats);
        self.state.tick += 1;

        Ok(Step::Ticked { stats, publish })
    }

    /// `step()` with panics turned into `TickError::Panicked`
    fn guarded_step(&mut self) -> Result<Step, TickError> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.step())) {
            Ok(result) => result,
            Err(payload) => {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(TickError::Panicked(msg))
            }
        }
    }

    fn log_stats(&self, stats: &TickStats) {
        let interval = self.config.stats_interval;
        if interval == 0 || self.state.tick % interval != 0 {
            return;
        }
        debug!(
            "tick {}: photons={} energy={:.1} momentum=({:.3}, {:.3}) collisions={} dropped_frames={}",
            self.state.tick,
            stats.count,
            stats.total_energy,
            stats.total_momentum.x,
            stats.total_momentum.y,
            self.state.collisions,
            self.frames_dropped,
        );
    }

    /// Run until shutdown and hand back the final state
    pub fn run(mut self) -> SimState {
        let dt = Duration::from_secs_f64(SIM_DT);
        let idle = Duration::from_millis(self.config.idle_poll_ms);
        let backoff = Duration::from_millis(self.config.error_backoff_ms);
        info!("Simulation engine ready (seed {})", self.state.seed);

        loop {
            let started = Instant::now();
            match self.guarded_step() {
                Ok(Step::Shutdown) => break,
                Ok(Step::Idle) => thread::sleep(idle),
                Ok(Step::Ticked { .. }) => {
                    if self.config.realtime {
                        if let Some(rest) = dt.checked_sub(started.elapsed()) {
                            thread::sleep(rest);
                        }
                    }
                }
                Err(e) => {
                    error!("Simulation error: {}", e);
                    thread::sleep(backoff);
                    self.state.recover();
                }
            }
        }

        info!(
            "Simulation engine stopped after {} ticks ({} photons, {} collisions)",
            self.state.tick,
            self.state.particles.len(),
            self.state.collisions
        );
        self.state
    }
}

/// Handle to an engine running on its own thread
pub struct EngineHandle {
    control: ControlSender,
    frames: FrameReceiver,
    shutdown: Arc<AtomicBool>,
    join: JoinHandle<SimState>,
}

impl EngineHandle {
    pub fn send(&self, msg: impl Into<ControlMessage>) -> Result<(), ControlError> {
        self.control.send(msg)
    }

    /// A sender the control surface can own
    pub fn control(&self) -> ControlSender {
        self.control.clone()
    }

    pub fn frames(&self) -> &FrameReceiver {
        &self.frames
    }

    /// Ask the engine to stop at the next step boundary
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Stop the engine and wait for its final state
    pub fn join(self) -> thread::Result<SimState> {
        self.shutdown();
        self.join.join()
    }
}

/// Start an engine thread wired to fresh channels
pub fn spawn(config: EngineConfig) -> std::io::Result<EngineHandle> {
    let (control_tx, control_rx) = control_channel(config.control_capacity);
    let (frame_tx, frame_rx) = frame_channel();
    let engine = SimulationEngine::new(config, control_rx, frame_tx);
    let shutdown = engine.shutdown_flag();

    let join = thread::Builder::new()
        .name("photon-engine".into())
        .spawn(move || engine.run())?;

    Ok(EngineHandle {
        control: control_tx,
        frames: frame_rx,
        shutdown,
        join,
    })
}
