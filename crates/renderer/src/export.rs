//! Still-frame export through the CPU core.
//!
//! The window path shades on the GPU; exports evaluate the same algorithm
//! with [`raymarch::render_frame`] so they work headless and stay
//! bit-reproducible across machines.

use std::path::{Path, PathBuf};
use std::time::Instant;

use raymarch::{render_frame, FrameInputs, RenderError, Scene, Variant};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum RenderExportError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("unsupported export format for {}; only .png is written", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("failed to write {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// One still frame to evaluate and write to disk.
#[derive(Debug, Clone)]
pub struct StillRequest {
    pub variant: Variant,
    /// Frame inputs; `aspect` is recomputed from `width` and `height`.
    pub inputs: FrameInputs,
    pub width: u32,
    pub height: u32,
    /// Worker threads for the CPU renderer; `0` uses available parallelism.
    pub workers: usize,
    pub path: PathBuf,
}

fn ensure_png(path: &Path) -> Result<(), RenderExportError> {
    let is_png = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png {
        Ok(())
    } else {
        Err(RenderExportError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }
}

/// Renders `request` on the CPU and writes it as an RGBA8 PNG.
pub fn export_still(request: &StillRequest) -> Result<PathBuf, RenderExportError> {
    ensure_png(&request.path)?;

    let started = Instant::now();
    let inputs = FrameInputs {
        aspect: FrameInputs::aspect_for(request.width, request.height),
        ..request.inputs
    };
    let scene = Scene::new(request.variant, inputs);
    let frame = render_frame(&scene, request.width, request.height, request.workers)?;

    image::save_buffer_with_format(
        &request.path,
        &frame.to_rgba8(),
        frame.width(),
        frame.height(),
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|source| RenderExportError::Encode {
        path: request.path.clone(),
        source,
    })?;

    info!(
        path = %request.path.display(),
        width = request.width,
        height = request.height,
        variant = %request.variant,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "still frame exported"
    );
    Ok(request.path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(path: PathBuf) -> StillRequest {
        StillRequest {
            variant: Variant::Tunable,
            inputs: FrameInputs::default(),
            width: 12,
            height: 8,
            workers: 2,
            path,
        }
    }

    #[test]
    fn writes_png_with_requested_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let written = export_still(&request(path.clone())).unwrap();
        assert_eq!(written, path);

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (12, 8));
        assert!(image.pixels().all(|pixel| pixel[3] == 255));
    }

    #[test]
    fn rejects_non_png_targets() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_still(&request(dir.path().join("frame.exr"))).unwrap_err();
        assert!(matches!(err, RenderExportError::UnsupportedFormat { .. }));
    }

    #[test]
    fn rejects_empty_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = request(dir.path().join("frame.png"));
        request.height = 0;
        let err = export_still(&request).unwrap_err();
        assert!(matches!(
            err,
            RenderExportError::Render(RenderError::EmptyFrame { .. })
        ));
    }
}
