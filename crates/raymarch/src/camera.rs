//! Primary-ray construction and conversion of march results into colour.

use glam::{Mat3, Vec2, Vec3, Vec4};

use crate::field::FieldParams;
use crate::inputs::FrameInputs;
use crate::march::{ray_march, MarchResult, MAX_DIST, MAX_STEPS};
use crate::variant::Variant;

/// Camera position before pointer rotation.
pub const CAMERA_ORIGIN: Vec3 = Vec3::new(0.0, 0.0, -5.5);
/// Radians of camera orbit per unit of pointer offset.
pub const POINTER_SENSITIVITY: f32 = 3.0;
/// Colour of rays that escape the field.
pub const BACKGROUND: Vec3 = Vec3::new(0.1, 0.1, 0.1);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Colour before and after the step-count brightness falloff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadeSample {
    pub base: Vec3,
    pub brightness: f32,
    /// `None` for the gradient variant, which does not march.
    pub march: Option<MarchResult>,
}

impl ShadeSample {
    pub fn color(&self) -> Vec4 {
        (self.base * self.brightness).extend(1.0)
    }
}

/// Ambient-occlusion proxy: rays that stop early render brighter. A hit on
/// the very first sample renders black.
pub fn step_brightness(steps: u32) -> f32 {
    if steps == 0 {
        0.0
    } else {
        1.0 - steps as f32 / MAX_STEPS as f32
    }
}

/// Animated colour ramp of the gradient variant; `uv` in `[0, 1]`.
pub fn gradient(time: f32, uv: Vec2) -> Vec3 {
    let phase = Vec3::splat(time) + Vec3::new(uv.x, uv.y, uv.x) + Vec3::new(0.0, 2.0, 4.0);
    Vec3::splat(0.5) + 0.5 * Vec3::new(phase.x.cos(), phase.y.cos(), phase.z.cos())
}

/// Frame-constant view of the fractal, built once from [`FrameInputs`].
///
/// `Scene` is plain data, so any number of threads may shade pixels from a
/// shared reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scene {
    variant: Variant,
    time: f32,
    aspect: f32,
    zoom: f32,
    camera: Mat3,
    field: FieldParams,
}

impl Scene {
    pub fn new(variant: Variant, inputs: FrameInputs) -> Self {
        let inputs = variant.effective(inputs);
        let rot_y = Mat3::from_rotation_y(-inputs.pointer.x * POINTER_SENSITIVITY);
        let rot_x = Mat3::from_rotation_x(inputs.pointer.y * POINTER_SENSITIVITY);
        Self {
            variant,
            time: inputs.time,
            aspect: if inputs.aspect > 0.0 { inputs.aspect } else { 1.0 },
            zoom: inputs.tunables.zoom,
            camera: rot_y * rot_x,
            field: FieldParams::new(inputs.orientation, inputs.tunables),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn field(&self) -> &FieldParams {
        &self.field
    }

    /// Maps `uv` in `[0, 1]` to `[-1, 1] x [-1/aspect, 1/aspect]`.
    pub fn to_ndc(&self, uv: Vec2) -> Vec2 {
        let ndc = uv * 2.0 - Vec2::ONE;
        Vec2::new(ndc.x, ndc.y / self.aspect)
    }

    pub fn primary_ray(&self, ndc: Vec2) -> Ray {
        Ray {
            origin: self.camera * CAMERA_ORIGIN,
            direction: self.camera * Vec3::new(ndc.x, ndc.y, self.zoom).normalize(),
        }
    }

    pub fn shade_sample(&self, uv: Vec2) -> ShadeSample {
        if !self.variant.raymarches() {
            return ShadeSample {
                base: gradient(self.time, uv),
                brightness: 1.0,
                march: None,
            };
        }

        let ray = self.primary_ray(self.to_ndc(uv));
        let march = ray_march(ray.origin, ray.direction, MAX_STEPS, &self.field);
        let base = if march.distance < MAX_DIST {
            march.orbit.clamp(Vec3::ZERO, Vec3::ONE)
        } else {
            BACKGROUND
        };
        ShadeSample {
            base,
            brightness: step_brightness(march.steps),
            march: Some(march),
        }
    }

    /// RGBA colour of the pixel at `uv`.
    pub fn shade(&self, uv: Vec2) -> [f32; 4] {
        self.shade_sample(uv).color().to_array()
    }
}
