//! Renderer crate for kaleido.
//!
//! The module glues the `winit` preview window, the `wgpu` pipeline and the
//! generated fractal GLSL together, and exports still frames through the CPU
//! core. The overall flow is:
//!
//! ```text
//!   CLI / kaleido
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!          │                 │                                  │
//!          │                 └─ SceneControls::frame_inputs ────┴─▶ FractalUniforms ─▶ GPU UBO
//!          │
//!   export_still ──▶ raymarch::render_frame ──▶ PNG
//! ```
//!
//! `WindowState` owns the GPU resources (surface, device, pipeline, uniform
//! buffer) and the interaction state; `Renderer` is the thin entry point.

mod compile;
mod export;
mod gpu;
mod input;
mod runtime;
mod types;
mod window;

use anyhow::Result;

pub use compile::fragment_shader_source;
pub use export::{export_still, RenderExportError, StillRequest};
pub use gpu::{AdapterSummary, FractalUniforms};
pub use input::{action_for_key, ControlAction, Release, SceneControls};
pub use runtime::{
    time_source_for_policy, BoxedTimeSource, FixedTimeSource, FrameScheduler, RenderPolicy,
    SystemTimeSource, TimeSample, TimeSource,
};
pub use types::{Antialiasing, ColorSpaceMode, RendererConfig};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the preview window and blocks until it is closed.
    pub fn run(self) -> Result<()> {
        window::run_window(self.config)
    }
}
