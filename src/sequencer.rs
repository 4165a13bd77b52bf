//! Animation Sequencer
//!
//! Walks stages of expression frames, composing, converting and writing
//! both panels in lockstep, then sleeping for the frame delay. The sleep
//! is the only suspension point and wakes early on a stop request.

use crate::display::{Canvas, PanelSet, PanelSide};
use crate::driver::{DriverError, FrameStatus, FrameTarget, PanelDriver};
use crate::expression::{Composer, ExpressionState};
use log::{debug, info, warn};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};
#[cfg(unix)]
use {signal_hook::iterator::Signals, std::os::raw::c_int, std::thread};

/// One frame of a stage: the state for both eyes and how long to hold it
#[derive(Debug, Clone, PartialEq)]
pub struct StageFrame {
    pub state: ExpressionState,
    pub delay_ms: u64,
}

impl StageFrame {
    pub fn new(state: ExpressionState, delay_ms: u64) -> Self {
        Self { state, delay_ms }
    }
}

/// A named run of frames, e.g. "happy"
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub name: String,
    pub frames: Vec<StageFrame>,
}

impl Stage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: Vec::new(),
        }
    }

    pub fn push(&mut self, state: ExpressionState, delay_ms: u64) {
        self.frames.push(StageFrame::new(state, delay_ms));
    }

    /// Append `count` copies of `state`
    pub fn hold(&mut self, state: ExpressionState, count: usize, delay_ms: u64) {
        for _ in 0..count {
            self.push(state, delay_ms);
        }
    }

    /// Lengthen the last frame's delay, used as a pause between stages
    pub fn pause(&mut self, extra_ms: u64) {
        if let Some(last) = self.frames.last_mut() {
            last.delay_ms += extra_ms;
        }
    }

    /// Sum of all frame delays
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.frames.iter().map(|f| f.delay_ms).sum())
    }
}

/// Cross-thread stop flag with an interruptible sleep
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `duration` unless stopped first. Returns true if a stop
    /// was requested before or during the sleep.
    pub fn sleep(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if duration.is_zero() {
            return *stopped;
        }
        let (stopped, _) = cvar
            .wait_timeout_while(stopped, duration, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *stopped
    }

    /// Request a stop when the process receives any of `signals`.
    /// A watcher thread waits for the first delivery.
    #[cfg(unix)]
    pub fn stop_on_signals(&self, signals: &[c_int]) -> std::io::Result<()> {
        let mut incoming = Signals::new(signals)?;
        let stop = self.clone();
        thread::Builder::new()
            .name("stop-signal".into())
            .spawn(move || {
                if let Some(signal) = incoming.forever().next() {
                    info!("Caught signal {}, stopping", signal);
                    stop.request_stop();
                }
            })?;
        Ok(())
    }
}

/// How a run ended when no error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every stage played out; the driver is still active
    Completed,
    /// Stopped early (stop signal or shutdown request); the driver was released
    Stopped,
}

/// Plays stages on a pair of panels
pub struct AnimationSequencer<D: PanelDriver> {
    driver: D,
    composer: Composer,
    canvases: PanelSet<Canvas>,
    native: PanelSet<Vec<u8>>,
    stop: StopSignal,
    frame_index: u64,
}

impl<D: PanelDriver> AnimationSequencer<D> {
    pub fn new(driver: D, composer: Composer, stop: StopSignal) -> Self {
        let size = driver.buffer_size();
        Self {
            driver,
            composer,
            canvases: PanelSet::from_fn(|_| Canvas::new()),
            native: PanelSet::from_fn(|_| vec![0; size]),
            stop,
            frame_index: 0,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Frames written so far across all runs
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Play every stage in order. On stop the driver is released and
    /// `Stopped` returned; on error the driver is released if still active
    /// and the error returned.
    pub fn run(&mut self, stages: &[Stage]) -> Result<RunOutcome, DriverError> {
        match self.play(stages) {
            Ok(RunOutcome::Completed) => Ok(RunOutcome::Completed),
            Ok(RunOutcome::Stopped) => {
                info!("Animation stopped after {} frames", self.frame_index);
                self.release_driver();
                Ok(RunOutcome::Stopped)
            },
            Err(e) => {
                warn!("Animation aborted: {}", e);
                self.release_driver();
                Err(e)
            },
        }
    }

    fn play(&mut self, stages: &[Stage]) -> Result<RunOutcome, DriverError> {
        for stage in stages {
            let started = Instant::now();
            info!("Stage '{}' ({} frames)", stage.name, stage.frames.len());
            for frame in &stage.frames {
                if self.stop.is_stopped() {
                    return Ok(RunOutcome::Stopped);
                }
                if self.render_frame(&frame.state)? == FrameStatus::ShutdownRequested {
                    return Ok(RunOutcome::Stopped);
                }
                if self.stop.sleep(Duration::from_millis(frame.delay_ms)) {
                    return Ok(RunOutcome::Stopped);
                }
            }
            info!(
                "Stage '{}' finished in {:.2}s",
                stage.name,
                started.elapsed().as_secs_f32()
            );
        }
        Ok(RunOutcome::Completed)
    }

    /// Compose and convert both panels, then write both. A frame counts
    /// only once both writes succeeded.
    fn render_frame(&mut self, state: &ExpressionState) -> Result<FrameStatus, DriverError> {
        for side in PanelSide::ALL {
            let canvas = &mut self.canvases[side];
            self.composer.compose(canvas, state, side, self.frame_index);
            self.driver
                .convert_from_24bit(&mut self.native[side], canvas.as_bytes())?;
        }

        let mut status = FrameStatus::Presented;
        for side in PanelSide::ALL {
            let written = self.driver.write_frame(FrameTarget {
                side,
                bytes: &self.native[side],
            })?;
            if written == FrameStatus::ShutdownRequested {
                status = written;
            }
        }
        self.frame_index += 1;
        debug!("Frame {} written", self.frame_index);
        Ok(status)
    }

    fn release_driver(&mut self) {
        if self.driver.is_active() {
            if let Err(e) = self.driver.release() {
                warn!("Release failed: {}", e);
            }
        }
    }
}
