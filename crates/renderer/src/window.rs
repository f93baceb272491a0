use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use tracing::{debug, error, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder};
use winit::window::{Fullscreen, Window, WindowBuilder};

use crate::gpu::{AdapterSummary, FractalUniforms, GpuState};
use crate::input::{action_for_key, ControlAction, Release, SceneControls};
use crate::runtime::{
    time_source_for_policy, BoxedTimeSource, FrameScheduler, RenderPolicy, TimeSample,
};
use crate::types::RendererConfig;

const SOFTWARE_FPS_CAP: f32 = 15.0;

/// GPU state plus the interaction state it renders.
///
/// `gpu` is declared before `window` so the surface is dropped first.
pub(crate) struct WindowState {
    gpu: GpuState,
    window: Arc<Window>,
    controls: SceneControls,
    fullscreen_on_click: bool,
}

impl WindowState {
    pub(crate) fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(window.as_ref(), size, config.antialiasing, config.color_space)?;
        Ok(Self {
            gpu,
            window,
            controls: SceneControls::new(config),
            fullscreen_on_click: config.fullscreen_on_click,
        })
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub(crate) fn adapter(&self) -> &AdapterSummary {
        self.gpu.adapter()
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    pub(crate) fn render_frame(&mut self, sample: TimeSample) -> Result<(), wgpu::SurfaceError> {
        let inputs = self.controls.frame_inputs(sample.seconds, self.size());
        let uniforms = FractalUniforms::from_inputs(self.controls.variant(), inputs);
        self.gpu.render(&uniforms)
    }

    fn is_fullscreen(&self) -> bool {
        self.window.fullscreen().is_some()
    }

    fn set_fullscreen(&self, enabled: bool) {
        let mode = enabled.then_some(Fullscreen::Borderless(None));
        self.window.set_fullscreen(mode);
        debug!(enabled, "fullscreen changed");
    }

    /// Applies a key action; returns `false` when the window should close.
    fn apply(&mut self, action: ControlAction) -> bool {
        match action {
            ControlAction::SelectVariant(variant) => {
                self.controls.select_variant(variant);
            }
            ControlAction::Nudge(id, steps) => self.controls.nudge(id, steps),
            ControlAction::ToggleFullscreen => self.set_fullscreen(!self.is_fullscreen()),
            ControlAction::Escape => {
                if !self.is_fullscreen() {
                    return false;
                }
                self.set_fullscreen(false);
            }
        }
        true
    }

    fn handle_release(&mut self) {
        if self.controls.release() != Release::Click {
            return;
        }
        if let Some(state) = self.controls.request_orientation_permission() {
            info!(?state, "orientation permission updated");
        }
        if self.fullscreen_on_click && !self.is_fullscreen() {
            self.set_fullscreen(true);
        }
    }
}

pub(crate) struct RenderPolicyDriver {
    scheduler: FrameScheduler,
    time_source: BoxedTimeSource,
}

impl RenderPolicyDriver {
    pub(crate) fn new(policy: &RenderPolicy) -> Self {
        Self {
            scheduler: FrameScheduler::new(policy),
            time_source: time_source_for_policy(policy),
        }
    }

    pub(crate) fn sample(&mut self) -> TimeSample {
        self.time_source.sample()
    }

    pub(crate) fn mark_rendered(&mut self) {
        self.scheduler.mark_rendered(Instant::now());
    }

    pub(crate) fn invalidate(&mut self) {
        self.scheduler.invalidate();
    }

    pub(crate) fn ready_for_frame(&self, now: Instant) -> bool {
        self.scheduler.ready_for_frame(now)
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }
}

/// Caps animation on software rasterizers unless the caller chose a rate.
fn effective_policy(config: &RendererConfig, adapter: &AdapterSummary) -> RenderPolicy {
    match config.policy {
        RenderPolicy::Animate { target_fps: None } if adapter.is_software() => {
            warn!(
                adapter = %adapter.name,
                backend = ?adapter.backend,
                cap = SOFTWARE_FPS_CAP,
                "software rasterizer detected; capping preview frame rate (override with --fps)"
            );
            RenderPolicy::Animate {
                target_fps: Some(SOFTWARE_FPS_CAP),
            }
        }
        ref policy => policy.clone(),
    }
}

/// Opens the preview window and runs the event loop until it closes.
pub(crate) fn run_window(config: RendererConfig) -> Result<()> {
    let event_loop = EventLoopBuilder::new()
        .build()
        .map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let mut builder = WindowBuilder::new()
        .with_title("kaleido")
        .with_inner_size(window_size);
    if config.fullscreen {
        builder = builder.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    let window = builder
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create preview window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, &config)
        .map_err(|err| anyhow!("failed to initialise window renderer: {err:#}"))?;
    let policy = effective_policy(&config, state.adapter());
    let mut driver = RenderPolicyDriver::new(&policy);
    info!(
        variant = %config.variant,
        width = window_size.width,
        height = window_size.height,
        ?policy,
        "preview window ready"
    );

    if driver.ready_for_frame(Instant::now()) {
        state.window().request_redraw();
    }

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    elwt.exit();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if event.state != ElementState::Pressed {
                        return;
                    }
                    let Some(action) = action_for_key(&event.logical_key) else {
                        return;
                    };
                    // Held slider keys repeat; one-shot actions do not.
                    if event.repeat && !matches!(action, ControlAction::Nudge(..)) {
                        return;
                    }
                    if !state.apply(action) {
                        elwt.exit();
                        return;
                    }
                    driver.invalidate();
                }
                WindowEvent::CursorMoved { position, .. } => {
                    let height = state.size().height;
                    if state.controls.cursor_moved(position, height) {
                        driver.invalidate();
                    }
                }
                WindowEvent::MouseInput {
                    state: button_state,
                    button: MouseButton::Left,
                    ..
                } => {
                    match button_state {
                        ElementState::Pressed => state.controls.press(),
                        ElementState::Released => state.handle_release(),
                    }
                    driver.invalidate();
                }
                WindowEvent::Resized(new_size) => {
                    state.resize(new_size);
                    driver.invalidate();
                }
                WindowEvent::RedrawRequested => match state.render_frame(driver.sample()) {
                    Ok(()) => {
                        driver.mark_rendered();
                        if state.controls.pointer_in_motion() {
                            driver.invalidate();
                        }
                    }
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.resize(state.size());
                        driver.invalidate();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("surface out of memory; closing preview");
                        elwt.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        warn!("surface timeout; retrying next frame");
                    }
                    Err(other) => {
                        warn!(error = ?other, "surface error; retrying next frame");
                    }
                },
                _ => {}
            }
        }
        Event::AboutToWait => {
            let now = Instant::now();
            if driver.ready_for_frame(now) {
                tracing::trace!("scheduler: issuing redraw now");
                state.window().request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = driver.next_deadline() {
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                tracing::trace!("scheduler: idle (no redraw requested)");
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(device_type: wgpu::DeviceType) -> AdapterSummary {
        AdapterSummary {
            name: "test adapter".into(),
            backend: wgpu::Backend::Vulkan,
            device_type,
        }
    }

    #[test]
    fn software_adapters_cap_uncapped_animation() {
        let config = RendererConfig::default();
        assert_eq!(
            effective_policy(&config, &adapter(wgpu::DeviceType::Cpu)),
            RenderPolicy::Animate {
                target_fps: Some(SOFTWARE_FPS_CAP)
            }
        );
        assert_eq!(
            effective_policy(&config, &adapter(wgpu::DeviceType::DiscreteGpu)),
            RenderPolicy::default()
        );
    }

    #[test]
    fn explicit_rates_survive_software_adapters() {
        let config = RendererConfig {
            policy: RenderPolicy::Animate {
                target_fps: Some(60.0),
            },
            ..RendererConfig::default()
        };
        assert_eq!(
            effective_policy(&config, &adapter(wgpu::DeviceType::Cpu)),
            config.policy
        );
        let still = RendererConfig {
            policy: RenderPolicy::Still { time: Some(1.0) },
            ..RendererConfig::default()
        };
        assert_eq!(
            effective_policy(&still, &adapter(wgpu::DeviceType::Cpu)),
            still.policy
        );
    }
}
