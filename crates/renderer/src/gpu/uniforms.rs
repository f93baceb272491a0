use bytemuck::{Pod, Zeroable};
use raymarch::{orientation_matrix, FrameInputs, Variant};

/// CPU mirror of the `FractalParams` std140 block.
///
/// `mat3` columns are padded to `vec4` in std140, so the rotation is stored
/// as three 16-byte columns.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalUniforms {
    pub rotation: [[f32; 4]; 3],
    pub pointer: [f32; 2],
    pub time: f32,
    pub aspect: f32,
    pub zoom: f32,
    pub radius: f32,
    pub iterations: i32,
    pub variant: i32,
}

unsafe impl Zeroable for FractalUniforms {}
unsafe impl Pod for FractalUniforms {}

impl Default for FractalUniforms {
    fn default() -> Self {
        Self::from_inputs(Variant::default(), FrameInputs::default())
    }
}

impl FractalUniforms {
    /// Packs one frame's inputs after masking what `variant` does not use.
    pub fn from_inputs(variant: Variant, inputs: FrameInputs) -> Self {
        let inputs = variant.effective(inputs);
        let rotation = orientation_matrix(inputs.orientation);
        let column = |v: glam::Vec3| [v.x, v.y, v.z, 0.0];
        Self {
            rotation: [
                column(rotation.x_axis),
                column(rotation.y_axis),
                column(rotation.z_axis),
            ],
            pointer: inputs.pointer.to_array(),
            time: inputs.time,
            aspect: if inputs.aspect > 0.0 { inputs.aspect } else { 1.0 },
            zoom: inputs.tunables.zoom,
            radius: inputs.tunables.radius,
            iterations: inputs.tunables.iterations.min(i32::MAX as u32) as i32,
            variant: variant.index(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use std::mem::{offset_of, size_of};

    use glam::Vec2;
    use raymarch::{Orientation, Tunables};

    use super::*;

    #[test]
    fn layout_matches_std140_block() {
        assert_eq!(size_of::<FractalUniforms>(), 80);
        assert_eq!(size_of::<FractalUniforms>() % 16, 0);
        assert_eq!(offset_of!(FractalUniforms, rotation), 0);
        assert_eq!(offset_of!(FractalUniforms, pointer), 48);
        assert_eq!(offset_of!(FractalUniforms, time), 56);
        assert_eq!(offset_of!(FractalUniforms, aspect), 60);
        assert_eq!(offset_of!(FractalUniforms, zoom), 64);
        assert_eq!(offset_of!(FractalUniforms, radius), 68);
        assert_eq!(offset_of!(FractalUniforms, iterations), 72);
        assert_eq!(offset_of!(FractalUniforms, variant), 76);
    }

    #[test]
    fn packs_effective_inputs() {
        let inputs = FrameInputs {
            time: 2.5,
            pointer: Vec2::new(0.1, -0.2),
            orientation: Orientation::new(0.0, 0.0, std::f32::consts::FRAC_PI_2),
            aspect: 2.0,
            tunables: Tunables {
                zoom: 4.0,
                radius: 0.05,
                iterations: 12,
            },
        };

        let tunable = FractalUniforms::from_inputs(Variant::Tunable, inputs);
        assert_eq!(tunable.variant, 3);
        assert_eq!(tunable.iterations, 12);
        assert_eq!(tunable.zoom, 4.0);
        assert_eq!(tunable.pointer, [0.1, -0.2]);
        // Rz(90deg) sends +X to +Y.
        assert!((tunable.rotation[0][1] - 1.0).abs() < 1e-6);
        assert_eq!(tunable.rotation[0][3], 0.0);

        let pointer = FractalUniforms::from_inputs(Variant::Pointer, inputs);
        assert_eq!(pointer.iterations, 10);
        assert_eq!(pointer.zoom, 2.0);
        assert_eq!(pointer.rotation[0], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(pointer.as_bytes().len(), 80);
    }
}
