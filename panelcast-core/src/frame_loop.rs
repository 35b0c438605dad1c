//! Frame loop
//!
//! Renders back to back with no pacing until a shutdown is requested. The
//! request is only looked at between frames, so a frame in flight always
//! finishes before teardown starts.
//!
//! ```text
//! Running ──(flag set)──▶ Stopping ──(shutdown once)──▶ Stopped
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use panelcast_hal::Clock;

use crate::error::DisplayError;

/// Default number of frames between FPS reports
pub const FPS_REPORT_INTERVAL: u32 = 120;

/// Something the loop can render to and tear down
pub trait RenderTarget {
    /// Produce one frame
    fn render_frame(&mut self) -> Result<(), DisplayError>;

    /// Release all resources
    fn shutdown(&mut self);
}

/// Loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopState {
    /// Rendering frames
    Running,
    /// Shutdown requested, teardown pending
    Stopping,
    /// Torn down
    Stopped,
}

/// Totals reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopSummary {
    /// Frames attempted
    pub frames: u64,
    /// Frames that failed and were skipped
    pub failures: u64,
}

/// Average frame rate over fixed frame windows
#[derive(Debug, Clone)]
pub struct FpsMeter {
    interval: u32,
    frames: u32,
    checkpoint_us: u64,
    last_fps: Option<f32>,
}

impl FpsMeter {
    /// Report every `interval` frames, measuring from `now_us`
    pub fn new(interval: u32, now_us: u64) -> Self {
        Self {
            interval: interval.max(1),
            frames: 0,
            checkpoint_us: now_us,
            last_fps: None,
        }
    }

    /// Count one frame; returns the average FPS when a window closes
    pub fn tick(&mut self, now_us: u64) -> Option<f32> {
        self.frames += 1;
        if self.frames < self.interval {
            return None;
        }

        let elapsed_us = now_us.saturating_sub(self.checkpoint_us);
        self.frames = 0;
        self.checkpoint_us = now_us;
        if elapsed_us == 0 {
            return None;
        }

        let fps = self.interval as f32 * 1_000_000.0 / elapsed_us as f32;
        self.last_fps = Some(fps);
        Some(fps)
    }

    /// Most recent report
    pub fn last_fps(&self) -> Option<f32> {
        self.last_fps
    }
}

/// Drives a [`RenderTarget`] until a shutdown flag is raised
pub struct FrameLoop<'a, C: Clock> {
    state: LoopState,
    shutdown: &'a AtomicBool,
    clock: C,
    fps: Option<FpsMeter>,
    summary: LoopSummary,
}

impl<'a, C: Clock> FrameLoop<'a, C> {
    /// Create a loop watching `shutdown`, reporting FPS every
    /// [`FPS_REPORT_INTERVAL`] frames
    pub fn new(shutdown: &'a AtomicBool, clock: C) -> Self {
        let fps = FpsMeter::new(FPS_REPORT_INTERVAL, clock.now_micros());
        Self {
            state: LoopState::Running,
            shutdown,
            clock,
            fps: Some(fps),
            summary: LoopSummary::default(),
        }
    }

    /// Change the FPS report interval; `None` silences reports
    pub fn with_fps_interval(mut self, interval: Option<u32>) -> Self {
        self.fps = interval.map(|n| FpsMeter::new(n, self.clock.now_micros()));
        self
    }

    /// Current state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Totals so far
    pub fn summary(&self) -> LoopSummary {
        self.summary
    }

    /// FPS meter, if reporting is enabled
    pub fn fps_meter(&self) -> Option<&FpsMeter> {
        self.fps.as_ref()
    }

    /// Advance by one iteration
    pub fn step<T: RenderTarget>(&mut self, target: &mut T) -> LoopState {
        match self.state {
            LoopState::Running => {
                if self.shutdown.load(Ordering::SeqCst) {
                    debug!("Shutdown requested");
                    self.state = LoopState::Stopping;
                    return self.state;
                }

                self.summary.frames += 1;
                if let Err(e) = target.render_frame() {
                    self.summary.failures += 1;
                    debug!("Frame {} skipped: {}", self.summary.frames, e);
                }

                if let Some(meter) = self.fps.as_mut() {
                    if let Some(fps) = meter.tick(self.clock.now_micros()) {
                        info!("Frame {}: {:.1} FPS", self.summary.frames, fps);
                    }
                }
            }
            LoopState::Stopping => {
                target.shutdown();
                self.state = LoopState::Stopped;
            }
            LoopState::Stopped => {}
        }
        self.state
    }

    /// Run until stopped, then tear the target down
    pub fn run<T: RenderTarget>(&mut self, target: &mut T) -> LoopSummary {
        while self.step(target) != LoopState::Stopped {}
        info!("Rendered {} frames", self.summary.frames);
        self.summary
    }
}
