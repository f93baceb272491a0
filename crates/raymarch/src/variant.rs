use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::inputs::{FrameInputs, Orientation, Tunables};

/// Pointer decay of the simplest raymarch variant.
pub const SIMPLE_POINTER_DECAY: f32 = 0.9;
/// Pointer decay of the orientation-aware variants.
pub const POINTER_DECAY: f32 = 0.92;

/// The four shader configurations the demo ships, from plainest to richest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Animated colour gradient, no raymarching.
    Gradient,
    /// Raymarched fractal steered by pointer drag only.
    Pointer,
    /// Pointer drag plus orientation-coupled folds.
    Oriented,
    /// Everything, including zoom / radius / iteration sliders.
    #[default]
    Tunable,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Gradient,
        Variant::Pointer,
        Variant::Oriented,
        Variant::Tunable,
    ];

    pub fn pointer_decay(self) -> f32 {
        match self {
            Variant::Gradient | Variant::Pointer => SIMPLE_POINTER_DECAY,
            Variant::Oriented | Variant::Tunable => POINTER_DECAY,
        }
    }

    pub fn raymarches(self) -> bool {
        !matches!(self, Variant::Gradient)
    }

    pub fn uses_orientation(self) -> bool {
        matches!(self, Variant::Oriented | Variant::Tunable)
    }

    pub fn uses_tunables(self) -> bool {
        matches!(self, Variant::Tunable)
    }

    /// Replaces the inputs this variant does not wire up with their defaults.
    pub fn effective(self, inputs: FrameInputs) -> FrameInputs {
        let mut effective = inputs;
        if !self.uses_orientation() {
            effective.orientation = Orientation::IDENTITY;
        }
        if self.uses_tunables() {
            effective.tunables = inputs.tunables.clamped();
        } else {
            effective.tunables = Tunables::default();
        }
        effective
    }

    /// Stable index shared with the GPU uniform block.
    pub fn index(self) -> i32 {
        match self {
            Variant::Gradient => 0,
            Variant::Pointer => 1,
            Variant::Oriented => 2,
            Variant::Tunable => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Gradient => f.write_str("gradient"),
            Variant::Pointer => f.write_str("pointer"),
            Variant::Oriented => f.write_str("oriented"),
            Variant::Tunable => f.write_str("tunable"),
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "gradient" | "color" | "0" => Ok(Variant::Gradient),
            "pointer" | "mouse" | "1" => Ok(Variant::Pointer),
            "oriented" | "orientation" | "2" => Ok(Variant::Oriented),
            "tunable" | "full" | "3" => Ok(Variant::Tunable),
            other => Err(format!(
                "unknown variant '{other}'; expected gradient, pointer, oriented, or tunable"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    fn busy_inputs() -> FrameInputs {
        FrameInputs {
            time: 3.0,
            pointer: Vec2::new(0.2, -0.1),
            orientation: Orientation::new(1.0, 2.0, 3.0),
            aspect: 1.5,
            tunables: Tunables {
                zoom: 5.0,
                radius: 0.1,
                iterations: 20,
            },
        }
    }

    #[test]
    fn pointer_variant_masks_orientation_and_tunables() {
        let effective = Variant::Pointer.effective(busy_inputs());
        assert_eq!(effective.orientation, Orientation::IDENTITY);
        assert_eq!(effective.tunables, Tunables::default());
        assert_eq!(effective.pointer, Vec2::new(0.2, -0.1));
        assert_eq!(Variant::Pointer.pointer_decay(), 0.9);
    }

    #[test]
    fn tunable_variant_keeps_everything() {
        let inputs = busy_inputs();
        assert_eq!(Variant::Tunable.effective(inputs), inputs);
        assert_eq!(Variant::Tunable.pointer_decay(), 0.92);
    }

    #[test]
    fn oriented_variant_keeps_orientation_only() {
        let effective = Variant::Oriented.effective(busy_inputs());
        assert_eq!(effective.orientation, Orientation::new(1.0, 2.0, 3.0));
        assert_eq!(effective.tunables, Tunables::default());
    }

    #[test]
    fn parses_names_and_indices() {
        for variant in Variant::ALL {
            assert_eq!(variant.to_string().parse::<Variant>().unwrap(), variant);
            assert_eq!(Variant::from_index(variant.index() as usize), Some(variant));
        }
        assert!("sparkle".parse::<Variant>().is_err());
    }
}
