use std::time::{Duration, Instant};

/// High-level behaviour requested by the caller.
///
/// The render policy decides whether frames animate continuously or the
/// fractal is frozen at a fixed timestamp and only redrawn when input changes.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPolicy {
    /// Run the render loop continuously, optionally clamping the frame rate.
    Animate {
        /// Optional requested frames-per-second cap; `None` follows vsync.
        target_fps: Option<f32>,
    },
    /// Hold shader time at a fixed value and redraw on demand.
    Still {
        /// Timestamp to evaluate the shader at (seconds).
        time: Option<f32>,
    },
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::Animate { target_fps: None }
    }
}

/// Snapshot of the time state supplied to the shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed wall-clock or simulated time in seconds.
    pub seconds: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Abstraction over where time values originate from.
pub trait TimeSource: Send {
    /// Resets the source to its initial state.
    fn reset(&mut self);
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn reset(&mut self) {
        self.origin = Instant::now();
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let elapsed = self.origin.elapsed();
        let sample = TimeSample::new(elapsed.as_secs_f32(), self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source that always reports a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    time: f32,
    frame: u64,
}

impl FixedTimeSource {
    pub fn new(time: f32) -> Self {
        Self { time, frame: 0 }
    }
}

impl TimeSource for FixedTimeSource {
    fn reset(&mut self) {
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.time, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

/// Builds a time source suited to the requested render policy.
pub fn time_source_for_policy(policy: &RenderPolicy) -> BoxedTimeSource {
    match policy {
        RenderPolicy::Animate { .. } => Box::new(SystemTimeSource::new()),
        RenderPolicy::Still { time } => Box::new(FixedTimeSource::new(time.unwrap_or(0.0))),
    }
}

/// Decides when the window loop should request the next redraw.
///
/// Animated policies redraw every frame, or on a fixed interval when an FPS
/// cap is set. Still policies redraw once and then only after
/// [`FrameScheduler::invalidate`].
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    continuous: bool,
    dirty: bool,
    last_frame: Option<Instant>,
}

impl FrameScheduler {
    pub fn new(policy: &RenderPolicy) -> Self {
        match policy {
            RenderPolicy::Animate { target_fps } => Self {
                interval: target_fps
                    .filter(|fps| fps.is_finite() && *fps > 0.0)
                    .map(|fps| Duration::from_secs_f32(1.0 / fps)),
                continuous: true,
                dirty: true,
                last_frame: None,
            },
            RenderPolicy::Still { .. } => Self {
                interval: None,
                continuous: false,
                dirty: true,
                last_frame: None,
            },
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        if !self.continuous {
            return self.dirty;
        }
        match (self.interval, self.last_frame) {
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
            _ => true,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.continuous {
            return None;
        }
        match (self.interval, self.last_frame) {
            (Some(interval), Some(last)) => Some(last + interval),
            _ => None,
        }
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
        self.dirty = false;
    }

    /// Requests a redraw for still policies after an input changed.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }
}
