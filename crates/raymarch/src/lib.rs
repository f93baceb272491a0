//! CPU reference implementation of the kaleidoscopic fractal raymarcher.
//!
//! The crate is organised bottom-up:
//!
//! ```text
//!   FrameInputs ──▶ Variant::effective ──▶ Scene::new
//!                                             │
//!        pixel uv ──▶ Scene::shade ──▶ ray_march ──▶ distance_field
//! ```
//!
//! Everything below [`Scene`] is a pure function of its arguments. The
//! mutable, cross-frame state a host needs (the damped pointer accumulator,
//! slider stack, orientation provider) lives in [`pointer`], [`controls`] and
//! [`orientation`]; the host snapshots it into a [`FrameInputs`] each frame.
//! [`frame::render_frame`] evaluates a whole image on a scoped worker pool.

pub mod camera;
pub mod controls;
pub mod field;
pub mod frame;
pub mod inputs;
pub mod march;
pub mod orientation;
pub mod pointer;
pub mod variant;

pub use camera::{Ray, Scene, ShadeSample, BACKGROUND, CAMERA_ORIGIN, POINTER_SENSITIVITY};
pub use controls::{ControlPanel, Slider, SliderId};
pub use field::{distance_field, orientation_matrix, FieldParams, FieldSample};
pub use frame::{pixel_uv, render_frame, Frame, RenderError};
pub use inputs::{FrameInputs, Orientation, Tunables};
pub use march::{ray_march, MarchResult, MAX_DIST, MAX_STEPS, MIN_DIST};
pub use orientation::{
    select_orientation_source, ImmediateOrientationSource, OrientationCapability,
    OrientationSource, PermissionState, PermissionedOrientationSource, SliderOrientation,
};
pub use pointer::PointerOffset;
pub use variant::Variant;
