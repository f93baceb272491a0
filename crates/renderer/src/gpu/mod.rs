//! GPU orchestration for the preview window.
//!
//! - `context` owns wgpu instance/device/surface wiring and rebuilds the
//!   swapchain when the window resizes.
//! - `pipeline` compiles the fullscreen triangle and fractal GLSL into a
//!   single render pipeline with one uniform bind group.
//! - `uniforms` mirrors the `FractalParams` std140 block.
//! - `state` glues everything together behind the `GpuState` API used by
//!   `window`.

mod context;
mod pipeline;
mod state;
mod uniforms;

pub use context::AdapterSummary;
pub(crate) use state::GpuState;
pub use uniforms::FractalUniforms;
