//! Kaleidoscopic IFS distance estimator with orbit-trap colouring.

use glam::{Mat3, Vec3};

use crate::inputs::{Orientation, Tunables, DEFAULT_ITERATIONS, DEFAULT_RADIUS};

/// Per-fold scale factor.
pub const SCALE: f32 = 1.5;
/// Per-fold translation applied after scaling.
pub const OFFSET: Vec3 = Vec3::new(-1.0, -0.1, -0.5);
/// Weight of each folded position in the accumulated orbit colour.
pub const ORBIT_WEIGHT: f32 = 0.1;

/// Builds `Rz(gamma) * Ry(beta) * Rx(alpha)`: alpha is applied first.
pub fn orientation_matrix(orientation: Orientation) -> Mat3 {
    Mat3::from_rotation_z(orientation.gamma)
        * Mat3::from_rotation_y(orientation.beta)
        * Mat3::from_rotation_x(orientation.alpha)
}

/// Frame-constant parameters of the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldParams {
    /// Rotation applied inside every fold, not to the input point.
    pub rotation: Mat3,
    pub radius: f32,
    pub iterations: u32,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            rotation: Mat3::IDENTITY,
            radius: DEFAULT_RADIUS,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl FieldParams {
    pub fn new(orientation: Orientation, tunables: Tunables) -> Self {
        Self {
            rotation: orientation_matrix(orientation),
            radius: tunables.radius,
            iterations: tunables.iterations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSample {
    pub distance: f32,
    /// Sum of folded positions, unclamped.
    pub orbit: Vec3,
}

/// Distance from `p` to the fractal surface plus its orbit-trap colour.
///
/// `total_scale` starts at 1 and only ever grows by `SCALE`, so the
/// division is always well defined for finite inputs.
pub fn distance_field(p: Vec3, params: &FieldParams) -> FieldSample {
    let mut z = p;
    let mut total_scale = 1.0_f32;
    let mut orbit = Vec3::ZERO;

    for _ in 0..params.iterations {
        z = z.abs();
        z *= SCALE;
        z += OFFSET;
        total_scale *= SCALE;
        z = params.rotation * z;
        orbit += z * ORBIT_WEIGHT;
    }

    FieldSample {
        distance: z.length() / total_scale - params.radius,
        orbit,
    }
}
