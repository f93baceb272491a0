//! CPU evaluation of a whole frame.
//!
//! Every pixel is an independent call to [`Scene::shade`], so the image is
//! cut into horizontal bands that a scoped worker pool drains from a
//! channel. Each band is an exclusive `&mut` slice of the output buffer;
//! workers share nothing else.

use std::num::NonZeroUsize;
use std::thread;
use std::time::Instant;

use crossbeam_channel::unbounded;
use glam::Vec2;
use tracing::debug;

use crate::camera::Scene;

const BAND_ROWS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("frame dimensions must be non-zero (got {width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("a render worker panicked")]
    WorkerPanicked,
}

/// Linear RGBA image produced by [`render_frame`], rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    /// Packs the frame into RGBA8, clamping each channel to `[0, 1]`.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|pixel| pixel.map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect()
    }
}

/// Shader-space coordinate of the centre of pixel `(x, y)`; `v` grows upward.
pub fn pixel_uv(x: u32, y: u32, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) / width as f32,
        1.0 - (y as f32 + 0.5) / height as f32,
    )
}

/// Shades every pixel of a `width` x `height` frame using `workers` threads
/// (`0` picks the available parallelism).
pub fn render_frame(
    scene: &Scene,
    width: u32,
    height: u32,
    workers: usize,
) -> Result<Frame, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyFrame { width, height });
    }

    let requested = if workers == 0 {
        thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
    } else {
        workers
    };
    // Never more threads than bands; extra workers would only idle.
    let band_count = (height as usize).div_ceil(BAND_ROWS);
    let workers = requested.min(band_count).max(1);
    let started = Instant::now();
    let row_len = width as usize;
    let mut pixels = vec![[0.0_f32; 4]; row_len * height as usize];

    let (band_tx, band_rx) = unbounded();
    for (band, slice) in pixels.chunks_mut(row_len * BAND_ROWS).enumerate() {
        // The receiver is alive, so sending cannot fail.
        let _ = band_tx.send((band * BAND_ROWS, slice));
    }
    drop(band_tx);

    let panicked = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let band_rx = band_rx.clone();
                scope.spawn(move || {
                    for (first_row, slice) in band_rx.iter() {
                        for (offset, pixel) in slice.iter_mut().enumerate() {
                            let x = (offset % row_len) as u32;
                            let y = (first_row + offset / row_len) as u32;
                            *pixel = scene.shade(pixel_uv(x, y, width, height));
                        }
                    }
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join())
            .filter(Result::is_err)
            .count()
    });
    drop(band_rx);
    if panicked > 0 {
        return Err(RenderError::WorkerPanicked);
    }

    debug!(
        width,
        height,
        workers,
        variant = %scene.variant(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "cpu frame rendered"
    );

    Ok(Frame {
        width,
        height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::FrameInputs;
    use crate::variant::Variant;

    #[test]
    fn rejects_empty_frames() {
        let scene = Scene::new(Variant::Tunable, FrameInputs::default());
        assert!(matches!(
            render_frame(&scene, 0, 10, 1),
            Err(RenderError::EmptyFrame { width: 0, height: 10 })
        ));
    }

    #[test]
    fn pixel_centres_map_into_unit_square() {
        assert_eq!(pixel_uv(0, 0, 2, 2), Vec2::new(0.25, 0.75));
        assert_eq!(pixel_uv(1, 1, 2, 2), Vec2::new(0.75, 0.25));
    }

    #[test]
    fn rgba8_packing_clamps() {
        let frame = Frame {
            width: 1,
            height: 1,
            pixels: vec![[1.5, -0.2, 0.5, 1.0]],
        };
        assert_eq!(frame.to_rgba8(), vec![255, 0, 128, 255]);
    }

    #[test]
    fn oversized_worker_counts_are_bounded_by_bands() {
        let scene = Scene::new(Variant::Tunable, FrameInputs::default());
        let crowded = render_frame(&scene, 2, 2, 200_000).unwrap();
        let single = render_frame(&scene, 2, 2, 1).unwrap();
        assert_eq!(crowded, single);
        assert_eq!(crowded.pixels().len(), 4);
    }
}
