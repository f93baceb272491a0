use std::ops::RangeInclusive;

use glam::Vec2;

pub const DEFAULT_ZOOM: f32 = 2.0;
pub const DEFAULT_RADIUS: f32 = 0.02;
pub const DEFAULT_ITERATIONS: u32 = 10;

pub const ZOOM_RANGE: RangeInclusive<f32> = 1.0..=10.0;
pub const RADIUS_RANGE: RangeInclusive<f32> = 0.001..=0.2;
pub const ITERATION_RANGE: RangeInclusive<u32> = 1..=30;
pub const ANGLE_RANGE: RangeInclusive<f32> = 0.0..=std::f32::consts::TAU;

/// Device tilt (or slider fallback) in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
}

impl Orientation {
    pub const IDENTITY: Self = Self {
        alpha: 0.0,
        beta: 0.0,
        gamma: 0.0,
    };

    pub fn new(alpha: f32, beta: f32, gamma: f32) -> Self {
        Self { alpha, beta, gamma }
    }

    /// Converts a device-orientation reading, which browsers and sensor APIs
    /// report in degrees.
    pub fn from_degrees(alpha: f32, beta: f32, gamma: f32) -> Self {
        Self {
            alpha: alpha.to_radians(),
            beta: beta.to_radians(),
            gamma: gamma.to_radians(),
        }
    }
}

/// Slider-controlled scalars of the richest shader variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tunables {
    /// Pseudo focal length; larger values narrow the field of view.
    pub zoom: f32,
    /// Inflation radius subtracted from the fractal distance.
    pub radius: f32,
    /// Number of IFS folds per distance sample.
    pub iterations: u32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            radius: DEFAULT_RADIUS,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl Tunables {
    /// Clamps every field into its supported range.
    pub fn clamped(self) -> Self {
        Self {
            zoom: self.zoom.clamp(*ZOOM_RANGE.start(), *ZOOM_RANGE.end()),
            radius: self
                .radius
                .clamp(*RADIUS_RANGE.start(), *RADIUS_RANGE.end()),
            iterations: self
                .iterations
                .clamp(*ITERATION_RANGE.start(), *ITERATION_RANGE.end()),
        }
    }
}

/// Snapshot of everything the per-pixel core consumes for one frame.
///
/// The host loop owns the mutable sources (pointer accumulator, sliders,
/// orientation provider) and hands a copy of this struct to the core each
/// frame. The core never writes back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    pub time: f32,
    pub pointer: Vec2,
    pub orientation: Orientation,
    pub aspect: f32,
    pub tunables: Tunables,
}

impl Default for FrameInputs {
    fn default() -> Self {
        Self {
            time: 0.0,
            pointer: Vec2::ZERO,
            orientation: Orientation::IDENTITY,
            aspect: 1.0,
            tunables: Tunables::default(),
        }
    }
}

impl FrameInputs {
    /// Aspect ratio of a `width` x `height` viewport, guarding against
    /// zero-sized surfaces during minimise.
    pub fn aspect_for(width: u32, height: u32) -> f32 {
        width.max(1) as f32 / height.max(1) as f32
    }
}
