use glam::Vec3;

use crate::field::{distance_field, FieldParams};

/// Sample budget used by every call site.
pub const MAX_STEPS: u32 = 70;
/// Travel distance beyond which a ray counts as escaped.
pub const MAX_DIST: f32 = 1000.0;
/// Field distance below which a ray counts as a hit.
pub const MIN_DIST: f32 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchResult {
    /// Total distance travelled along the ray.
    pub distance: f32,
    /// Orbit colour of the last field sample.
    pub orbit: Vec3,
    /// Index of the stopping sample, or `max_samples` if the budget ran out.
    pub steps: u32,
}

impl MarchResult {
    pub fn escaped(&self) -> bool {
        self.distance >= MAX_DIST
    }
}

/// Sphere-traces the field from `origin` along `dir` (expected unit length).
///
/// Always returns after at most `max_samples` field evaluations.
pub fn ray_march(origin: Vec3, dir: Vec3, max_samples: u32, params: &FieldParams) -> MarchResult {
    let mut distance = 0.0_f32;
    let mut orbit = Vec3::ZERO;

    for step in 0..max_samples {
        let p = origin + dir * distance;
        let sample = distance_field(p, params);
        distance += sample.distance;
        orbit = sample.orbit;
        if distance > MAX_DIST || sample.distance < MIN_DIST {
            return MarchResult {
                distance,
                orbit,
                steps: step,
            };
        }
    }

    MarchResult {
        distance,
        orbit,
        steps: max_samples,
    }
}
