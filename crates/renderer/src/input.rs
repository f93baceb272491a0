//! Window-independent interaction state.
//!
//! `SceneControls` owns every piece of cross-frame state the fractal reads:
//! the active variant, the slider stack, the damped pointer accumulator and
//! the orientation provider. The winit loop feeds it raw events and asks it
//! for one [`FrameInputs`] snapshot per redraw.

use glam::Vec2;
use raymarch::{
    select_orientation_source, ControlPanel, FrameInputs, OrientationSource, PermissionState,
    PointerOffset, SliderId, Variant,
};
use tracing::{debug, info};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::keyboard::{Key, NamedKey};

use crate::types::RendererConfig;

/// Cursor travel, in physical pixels, below which a press counts as a click.
const CLICK_SLOP: f64 = 4.0;
/// Offset magnitude below which a released pointer is considered at rest.
const POINTER_REST: f32 = 1e-5;

/// What a key press asks the window to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    SelectVariant(Variant),
    Nudge(SliderId, i32),
    ToggleFullscreen,
    Escape,
}

/// Maps a logical key to its control; `None` for unbound keys.
pub fn action_for_key(key: &Key) -> Option<ControlAction> {
    match key {
        Key::Named(NamedKey::F11) => Some(ControlAction::ToggleFullscreen),
        Key::Named(NamedKey::Escape) => Some(ControlAction::Escape),
        Key::Character(value) => {
            let mut chars = value.chars();
            let ch = chars.next()?.to_ascii_lowercase();
            if chars.next().is_some() {
                return None;
            }
            let action = match ch {
                '1'..='4' => {
                    let index = ch as usize - '1' as usize;
                    ControlAction::SelectVariant(Variant::from_index(index)?)
                }
                'q' => ControlAction::Nudge(SliderId::Alpha, 5),
                'a' => ControlAction::Nudge(SliderId::Alpha, -5),
                'w' => ControlAction::Nudge(SliderId::Beta, 5),
                's' => ControlAction::Nudge(SliderId::Beta, -5),
                'e' => ControlAction::Nudge(SliderId::Gamma, 5),
                'd' => ControlAction::Nudge(SliderId::Gamma, -5),
                'r' => ControlAction::Nudge(SliderId::Zoom, 10),
                'f' => ControlAction::Nudge(SliderId::Zoom, -10),
                't' => ControlAction::Nudge(SliderId::Radius, 5),
                'g' => ControlAction::Nudge(SliderId::Radius, -5),
                'y' => ControlAction::Nudge(SliderId::Iterations, 1),
                'h' => ControlAction::Nudge(SliderId::Iterations, -1),
                _ => return None,
            };
            Some(action)
        }
        _ => None,
    }
}

#[derive(Debug, Default)]
struct MouseState {
    position: Option<PhysicalPosition<f64>>,
    pressed_anchor: Option<PhysicalPosition<f64>>,
    travelled: f64,
}

impl MouseState {
    /// Returns the cursor delta since the last event while a button is held.
    fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) -> Option<(f64, f64)> {
        let previous = self.position.replace(position);
        self.pressed_anchor?;
        let previous = previous?;
        let delta = (position.x - previous.x, position.y - previous.y);
        self.travelled += delta.0.hypot(delta.1);
        Some(delta)
    }

    fn press(&mut self) {
        self.pressed_anchor = Some(self.position.unwrap_or_default());
        self.travelled = 0.0;
    }

    /// Ends the press; `true` when it never moved far enough to be a drag.
    fn release(&mut self) -> bool {
        let was_pressed = self.pressed_anchor.take().is_some();
        was_pressed && self.travelled < CLICK_SLOP
    }
}

/// Result of releasing the left button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Click,
    Drag,
}

pub struct SceneControls {
    variant: Variant,
    panel: ControlPanel,
    pointer: PointerOffset,
    decay_override: Option<f32>,
    orientation: Box<dyn OrientationSource>,
    mouse: MouseState,
}

impl SceneControls {
    pub fn new(config: &RendererConfig) -> Self {
        let panel = ControlPanel::new(config.orientation_fallback, config.tunables);
        let orientation =
            select_orientation_source(config.orientation_source, panel.orientation());
        Self {
            variant: config.variant,
            panel,
            pointer: PointerOffset::new(config.pointer_decay()),
            decay_override: config.pointer_decay,
            orientation,
            mouse: MouseState::default(),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    pub fn pointer(&self) -> &PointerOffset {
        &self.pointer
    }

    pub fn orientation_source(&self) -> &dyn OrientationSource {
        self.orientation.as_ref()
    }

    /// Switches variant; the pointer decay follows unless overridden.
    pub fn select_variant(&mut self, variant: Variant) -> bool {
        if variant == self.variant {
            return false;
        }
        self.variant = variant;
        if self.decay_override.is_none() {
            self.pointer.set_decay(variant.pointer_decay());
        }
        info!(%variant, "switched shader variant");
        true
    }

    pub fn nudge(&mut self, id: SliderId, steps: i32) {
        let slider = self.panel.nudge(id, steps);
        debug!(slider = %slider.display(), "slider changed");
        if matches!(id, SliderId::Alpha | SliderId::Beta | SliderId::Gamma) {
            self.orientation.set_fallback(self.panel.orientation());
        }
    }

    pub fn press(&mut self) {
        self.mouse.press();
        self.pointer.begin_drag();
    }

    pub fn release(&mut self) -> Release {
        self.pointer.end_drag();
        if self.mouse.release() {
            Release::Click
        } else {
            Release::Drag
        }
    }

    /// Feeds a cursor position; returns `true` when it moved the pointer
    /// offset. Pixel deltas are normalised by viewport height with `y` up.
    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>, viewport_height: u32) -> bool {
        let Some((dx, dy)) = self.mouse.handle_cursor_moved(position) else {
            return false;
        };
        let scale = 1.0 / viewport_height.max(1) as f64;
        self.pointer.drag_by((dx * scale) as f32, (-dy * scale) as f32);
        true
    }

    /// Advances the orientation permission flow; returns the new state when
    /// it changed.
    pub fn request_orientation_permission(&mut self) -> Option<PermissionState> {
        self.orientation
            .request_permission()
            .then(|| self.orientation.permission())
    }

    /// Sensor reading in degrees, forwarded to the orientation provider.
    pub fn push_orientation_reading(&mut self, alpha: f32, beta: f32, gamma: f32) {
        self.orientation.push_reading(alpha, beta, gamma);
    }

    /// `true` while the pointer is held or still easing back.
    pub fn pointer_in_motion(&self) -> bool {
        self.pointer.is_dragging() || self.pointer.value().length() > POINTER_REST
    }

    /// Snapshots this frame's inputs, advancing the pointer damping by one
    /// frame.
    pub fn frame_inputs(&mut self, time: f32, size: PhysicalSize<u32>) -> FrameInputs {
        let pointer: Vec2 = self.pointer.tick();
        FrameInputs {
            time,
            pointer,
            orientation: self.orientation.current_orientation(),
            aspect: FrameInputs::aspect_for(size.width, size.height),
            tunables: self.panel.tunables(),
        }
    }
}

#[cfg(test)]
mod tests {
    use raymarch::{Orientation, OrientationCapability, Tunables};

    use super::*;

    fn character(value: &str) -> Key {
        Key::Character(value.into())
    }

    fn controls() -> SceneControls {
        SceneControls::new(&RendererConfig::default())
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(
            action_for_key(&character("1")),
            Some(ControlAction::SelectVariant(Variant::Gradient))
        );
        assert_eq!(
            action_for_key(&character("4")),
            Some(ControlAction::SelectVariant(Variant::Tunable))
        );
        assert_eq!(
            action_for_key(&character("Q")),
            Some(ControlAction::Nudge(SliderId::Alpha, 5))
        );
        assert_eq!(
            action_for_key(&character("h")),
            Some(ControlAction::Nudge(SliderId::Iterations, -1))
        );
        assert_eq!(
            action_for_key(&Key::Named(NamedKey::F11)),
            Some(ControlAction::ToggleFullscreen)
        );
        assert_eq!(action_for_key(&character("5")), None);
        assert_eq!(action_for_key(&character("qq")), None);
    }

    #[test]
    fn drag_accumulates_and_decays_after_release() {
        let mut controls = controls();
        let size = PhysicalSize::new(200, 100);
        controls.cursor_moved(PhysicalPosition::new(50.0, 50.0), 100);
        controls.press();
        assert!(controls.cursor_moved(PhysicalPosition::new(60.0, 40.0), 100));
        assert_eq!(controls.release(), Release::Drag);
        assert_eq!(controls.pointer().value(), Vec2::new(0.1, 0.1));

        let inputs = controls.frame_inputs(0.0, size);
        assert!((inputs.pointer.x - 0.1 * 0.92).abs() < 1e-6);
        assert_eq!(inputs.aspect, 2.0);
        assert!(controls.pointer_in_motion());
    }

    #[test]
    fn hover_does_not_move_pointer() {
        let mut controls = controls();
        assert!(!controls.cursor_moved(PhysicalPosition::new(10.0, 10.0), 100));
        assert!(!controls.cursor_moved(PhysicalPosition::new(90.0, 90.0), 100));
        assert_eq!(controls.pointer().value(), Vec2::ZERO);
        assert!(!controls.pointer_in_motion());
    }

    #[test]
    fn short_press_is_a_click() {
        let mut controls = controls();
        controls.cursor_moved(PhysicalPosition::new(10.0, 10.0), 100);
        controls.press();
        controls.cursor_moved(PhysicalPosition::new(11.0, 10.0), 100);
        assert_eq!(controls.release(), Release::Click);
    }

    #[test]
    fn variant_switch_updates_decay() {
        let mut controls = controls();
        assert_eq!(controls.pointer().decay(), 0.92);
        assert!(controls.select_variant(Variant::Pointer));
        assert_eq!(controls.pointer().decay(), 0.9);
        assert!(!controls.select_variant(Variant::Pointer));

        let mut pinned = SceneControls::new(&RendererConfig {
            pointer_decay: Some(0.5),
            ..RendererConfig::default()
        });
        pinned.select_variant(Variant::Gradient);
        assert_eq!(pinned.pointer().decay(), 0.5);
    }

    #[test]
    fn orientation_sliders_feed_fallback() {
        let mut controls = controls();
        controls.nudge(SliderId::Beta, 5);
        let inputs = controls.frame_inputs(1.0, PhysicalSize::new(10, 10));
        assert!((inputs.orientation.beta - 0.05).abs() < 1e-5);
        assert_eq!(inputs.tunables, Tunables::default());
    }

    #[test]
    fn permission_flow_gates_readings() {
        let mut controls = SceneControls::new(&RendererConfig {
            orientation_source: OrientationCapability::Permissioned,
            ..RendererConfig::default()
        });
        controls.push_orientation_reading(90.0, 0.0, 0.0);
        assert_eq!(
            controls.orientation_source().current_orientation(),
            Orientation::IDENTITY
        );
        assert_eq!(
            controls.request_orientation_permission(),
            Some(PermissionState::Pending)
        );
        assert_eq!(
            controls.request_orientation_permission(),
            Some(PermissionState::Granted)
        );
        assert_eq!(controls.request_orientation_permission(), None);
        controls.push_orientation_reading(90.0, 0.0, 0.0);
        let alpha = controls.orientation_source().current_orientation().alpha;
        assert!((alpha - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }
}
