use glam::Vec2;

use crate::variant::POINTER_DECAY;

/// Exponentially damped pointer-drag accumulator.
///
/// Drag deltas accumulate while a drag is active; once released, every
/// [`tick`](Self::tick) multiplies the offset by `decay`, so the view eases
/// back toward rest without ever snapping to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerOffset {
    offset: Vec2,
    decay: f32,
    dragging: bool,
}

impl Default for PointerOffset {
    fn default() -> Self {
        Self::new(POINTER_DECAY)
    }
}

impl PointerOffset {
    pub fn new(decay: f32) -> Self {
        Self {
            offset: Vec2::ZERO,
            decay: decay.clamp(0.0, 1.0),
            dragging: false,
        }
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn set_decay(&mut self, decay: f32) {
        self.decay = decay.clamp(0.0, 1.0);
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Adds a drag delta expressed in viewport-relative units.
    pub fn drag_by(&mut self, dx: f32, dy: f32) {
        self.offset += Vec2::new(dx, dy);
    }

    /// Advances one frame; decays the offset unless a drag is in progress.
    pub fn tick(&mut self) -> Vec2 {
        if !self.dragging {
            self.offset *= self.decay;
        }
        self.offset
    }

    pub fn value(&self) -> Vec2 {
        self.offset
    }
}
