use raymarch::{Orientation, OrientationCapability, Tunables, Variant};

use crate::runtime::RenderPolicy;

/// Output color handling for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Pick the gamma-encoded swapchain; the fractal colours are authored for it.
    #[default]
    Auto,
    /// Treat shader outputs as gamma-encoded; use non-sRGB surfaces.
    Gamma,
    /// Treat shader outputs as linear and let an sRGB swapchain convert them.
    Linear,
}

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` is assembled by the CLI from the config file and flags,
/// and seeds every piece of mutable window state: the slider stack, the
/// pointer accumulator and the orientation provider.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Shader variant shown first; keys `1`-`4` switch at runtime.
    pub variant: Variant,
    /// Initial slider values for zoom, radius and iteration count.
    pub tunables: Tunables,
    /// Slider-backed orientation used until a device reading arrives.
    pub orientation_fallback: Orientation,
    /// Which orientation provider the window installs.
    pub orientation_source: OrientationCapability,
    /// Per-frame pointer decay override; `None` uses the variant's factor.
    pub pointer_decay: Option<f32>,
    /// Start in borderless fullscreen.
    pub fullscreen: bool,
    /// Toggle fullscreen on a left click without drag.
    pub fullscreen_on_click: bool,
    /// Anti-aliasing mode requested by the caller.
    pub antialiasing: Antialiasing,
    /// Desired color handling for the swapchain.
    pub color_space: ColorSpaceMode,
    /// High-level render behaviour requested by the caller.
    pub policy: RenderPolicy,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            variant: Variant::default(),
            tunables: Tunables::default(),
            orientation_fallback: Orientation::IDENTITY,
            orientation_source: OrientationCapability::default(),
            pointer_decay: None,
            fullscreen: false,
            fullscreen_on_click: true,
            antialiasing: Antialiasing::default(),
            color_space: ColorSpaceMode::default(),
            policy: RenderPolicy::default(),
        }
    }
}

impl RendererConfig {
    pub fn pointer_decay(&self) -> f32 {
        self.pointer_decay
            .unwrap_or_else(|| self.variant.pointer_decay())
    }
}
