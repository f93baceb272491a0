use std::f32::consts::TAU;
use std::fmt;

use crate::inputs::{
    Orientation, Tunables, DEFAULT_ITERATIONS, DEFAULT_RADIUS, DEFAULT_ZOOM, ITERATION_RANGE,
    RADIUS_RANGE, ZOOM_RANGE,
};

/// Bounded, stepped scalar control.
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    label: &'static str,
    min: f32,
    max: f32,
    step: f32,
    value: f32,
    unit: &'static str,
}

impl Slider {
    pub fn new(label: &'static str, min: f32, max: f32, step: f32, value: f32) -> Self {
        let mut slider = Self {
            label,
            min: min.min(max),
            max: max.max(min),
            step: step.abs(),
            value: min,
            unit: "",
        };
        slider.set(value);
        slider
    }

    pub fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Stores `value` clamped to the range and snapped to the step grid
    /// anchored at `min`. Values already on the grid are kept bit-exact.
    pub fn set(&mut self, value: f32) {
        let value = if value.is_finite() { value } else { self.min };
        let snapped = if self.step > 0.0 {
            let on_grid = self.min + ((value - self.min) / self.step).round() * self.step;
            if (on_grid - value).abs() <= self.step * 1e-3 {
                value
            } else {
                on_grid
            }
        } else {
            value
        };
        self.value = snapped.clamp(self.min, self.max);
    }

    /// Moves by whole steps; negative counts move down.
    pub fn nudge(&mut self, steps: i32) {
        self.set(self.value + steps as f32 * self.step);
    }

    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Slider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decimals = decimals_for(self.step);
        write!(
            f,
            "{}: {:.*}{}",
            self.label, decimals, self.value, self.unit
        )
    }
}

fn decimals_for(step: f32) -> usize {
    let mut decimals = 0;
    let mut scaled = step;
    while decimals < 4 && scaled > 0.0 && (scaled - scaled.round()).abs() > 1e-4 {
        scaled *= 10.0;
        decimals += 1;
    }
    decimals
}

/// Which slider a control event addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderId {
    Alpha,
    Beta,
    Gamma,
    Zoom,
    Radius,
    Iterations,
}

/// The demo's full slider stack: orientation fallback plus tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPanel {
    alpha: Slider,
    beta: Slider,
    gamma: Slider,
    zoom: Slider,
    radius: Slider,
    iterations: Slider,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new(Orientation::IDENTITY, Tunables::default())
    }
}

impl ControlPanel {
    pub fn new(orientation: Orientation, tunables: Tunables) -> Self {
        Self {
            alpha: Slider::new("Alpha", 0.0, TAU, 0.01, orientation.alpha).with_unit(" rad"),
            beta: Slider::new("Beta", 0.0, TAU, 0.01, orientation.beta).with_unit(" rad"),
            gamma: Slider::new("Gamma", 0.0, TAU, 0.01, orientation.gamma).with_unit(" rad"),
            zoom: Slider::new(
                "Zoom",
                *ZOOM_RANGE.start(),
                *ZOOM_RANGE.end(),
                0.01,
                if tunables.zoom.is_finite() { tunables.zoom } else { DEFAULT_ZOOM },
            ),
            radius: Slider::new(
                "Radius",
                *RADIUS_RANGE.start(),
                *RADIUS_RANGE.end(),
                0.001,
                if tunables.radius.is_finite() { tunables.radius } else { DEFAULT_RADIUS },
            ),
            iterations: Slider::new(
                "Iterations",
                *ITERATION_RANGE.start() as f32,
                *ITERATION_RANGE.end() as f32,
                1.0,
                tunables.iterations as f32,
            ),
        }
    }

    pub fn slider(&self, id: SliderId) -> &Slider {
        match id {
            SliderId::Alpha => &self.alpha,
            SliderId::Beta => &self.beta,
            SliderId::Gamma => &self.gamma,
            SliderId::Zoom => &self.zoom,
            SliderId::Radius => &self.radius,
            SliderId::Iterations => &self.iterations,
        }
    }

    pub fn slider_mut(&mut self, id: SliderId) -> &mut Slider {
        match id {
            SliderId::Alpha => &mut self.alpha,
            SliderId::Beta => &mut self.beta,
            SliderId::Gamma => &mut self.gamma,
            SliderId::Zoom => &mut self.zoom,
            SliderId::Radius => &mut self.radius,
            SliderId::Iterations => &mut self.iterations,
        }
    }

    pub fn nudge(&mut self, id: SliderId, steps: i32) -> &Slider {
        let slider = self.slider_mut(id);
        slider.nudge(steps);
        slider
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::new(self.alpha.value(), self.beta.value(), self.gamma.value())
    }

    pub fn tunables(&self) -> Tunables {
        let iterations = self.iterations.value().round() as u32;
        Tunables {
            zoom: self.zoom.value(),
            radius: self.radius.value(),
            iterations: if iterations == 0 { DEFAULT_ITERATIONS } else { iterations },
        }
    }
}
