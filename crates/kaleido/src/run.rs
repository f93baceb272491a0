use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use raymarch::{FrameInputs, Orientation};
use renderer::{
    export_still, Antialiasing, ColorSpaceMode, RenderPolicy, Renderer, RendererConfig,
    StillRequest,
};
use sceneconfig::{AntialiasSetting, ColorSpaceSetting, SceneConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::{RenderArgs, RunArgs};
use crate::paths::AppPaths;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Reads the resolved config file. A missing discovered file yields the
/// defaults; a missing file named with `--config` is an error.
pub fn load_config(paths: &AppPaths) -> Result<SceneConfig> {
    let path = paths.config_file();
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound && !paths.source().requires_file() => {
            tracing::debug!(
                path = %path.display(),
                source = %paths.source(),
                "no config file found; using defaults"
            );
            return Ok(SceneConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {}", path.display()))
        }
    };
    let config = SceneConfig::from_toml_str(&raw)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), variant = %config.variant, "loaded config");
    Ok(config)
}

fn discover_config(explicit: Option<&Path>) -> Result<(AppPaths, SceneConfig)> {
    let paths = AppPaths::discover(explicit)?;
    let config = load_config(&paths)?;
    Ok((paths, config))
}

fn antialias_setting(value: Antialiasing) -> Result<AntialiasSetting> {
    match value {
        Antialiasing::Auto => Ok(AntialiasSetting::Auto),
        Antialiasing::Off => Ok(AntialiasSetting::Off),
        Antialiasing::Samples(samples) => AntialiasSetting::from_samples(samples)
            .ok_or_else(|| anyhow!("unsupported sample count {samples}")),
    }
}

fn antialiasing(setting: Option<AntialiasSetting>) -> Antialiasing {
    match setting {
        None | Some(AntialiasSetting::Auto) => Antialiasing::Auto,
        Some(other) => match other.samples() {
            Some(samples) if samples > 1 => Antialiasing::Samples(samples),
            _ => Antialiasing::Off,
        },
    }
}

fn color_space_setting(mode: ColorSpaceMode) -> ColorSpaceSetting {
    match mode {
        ColorSpaceMode::Auto => ColorSpaceSetting::Auto,
        ColorSpaceMode::Gamma => ColorSpaceSetting::Gamma,
        ColorSpaceMode::Linear => ColorSpaceSetting::Linear,
    }
}

fn color_space(setting: ColorSpaceSetting) -> ColorSpaceMode {
    match setting {
        ColorSpaceSetting::Auto => ColorSpaceMode::Auto,
        ColorSpaceSetting::Gamma => ColorSpaceMode::Gamma,
        ColorSpaceSetting::Linear => ColorSpaceMode::Linear,
    }
}

/// Layers window flags over the file config and re-validates the result.
pub fn apply_run_overrides(mut config: SceneConfig, args: &RunArgs) -> Result<SceneConfig> {
    if let Some(variant) = args.variant {
        config.variant = variant;
    }
    if let Some((width, height)) = args.size {
        config.window.width = width;
        config.window.height = height;
    }
    if let Some(fps) = args.fps {
        config.window.fps = Some(fps);
    }
    if let Some(mode) = args.antialias {
        config.window.antialias = Some(antialias_setting(mode)?);
    }
    if let Some(mode) = args.color_space {
        config.window.color_space = color_space_setting(mode);
    }
    if args.fullscreen {
        config.window.fullscreen = true;
    }
    if let Some(source) = args.orientation {
        config.orientation.source = source;
    }
    config.validate()?;
    Ok(config)
}

/// Layers still-export flags over the file config and re-validates the result.
pub fn apply_render_overrides(mut config: SceneConfig, args: &RenderArgs) -> Result<SceneConfig> {
    if let Some(variant) = args.variant {
        config.variant = variant;
    }
    if let Some((width, height)) = args.size {
        config.still.width = width;
        config.still.height = height;
    }
    if let Some(time) = args.time {
        config.still.time = time;
    }
    if let Some(Orientation { alpha, beta, gamma }) = args.orientation {
        config.orientation.alpha = alpha;
        config.orientation.beta = beta;
        config.orientation.gamma = gamma;
    }
    if let Some(zoom) = args.zoom {
        config.tunables.zoom = zoom;
    }
    if let Some(radius) = args.radius {
        config.tunables.radius = radius;
    }
    if let Some(iterations) = args.iterations {
        config.tunables.iterations = iterations;
    }
    config.validate()?;
    Ok(config)
}

pub fn renderer_config(config: &SceneConfig, args: &RunArgs) -> RendererConfig {
    let policy = match args.still_time {
        Some(time) => RenderPolicy::Still {
            time: Some(time.as_secs_f32()),
        },
        None => RenderPolicy::Animate {
            target_fps: config.window.fps.filter(|fps| *fps > 0.0),
        },
    };
    RendererConfig {
        surface_size: (config.window.width, config.window.height),
        variant: config.variant,
        tunables: config.tunables(),
        orientation_fallback: config.orientation.fallback(),
        orientation_source: config.orientation.source,
        pointer_decay: config.pointer.decay,
        fullscreen: config.window.fullscreen,
        fullscreen_on_click: config.window.fullscreen_on_click,
        antialiasing: antialiasing(config.window.antialias),
        color_space: color_space(config.window.color_space),
        policy,
    }
}

pub fn still_request(config: &SceneConfig, args: &RenderArgs) -> StillRequest {
    let (width, height) = (config.still.width, config.still.height);
    StillRequest {
        variant: config.variant,
        inputs: FrameInputs {
            time: config.still.time.as_secs_f32(),
            pointer: args.pointer.unwrap_or_default(),
            orientation: config.orientation.fallback(),
            aspect: FrameInputs::aspect_for(width, height),
            tunables: config.tunables(),
        },
        width,
        height,
        workers: args.workers,
        path: args.output.clone(),
    }
}

pub fn run(config_path: Option<&Path>, args: RunArgs) -> Result<()> {
    let (paths, config) = discover_config(config_path)?;
    let config = apply_run_overrides(config, &args)?;
    tracing::debug!(
        config = %paths.config_file().display(),
        source = %paths.source(),
        "resolved kaleido config"
    );
    let renderer_config = renderer_config(&config, &args);
    Renderer::new(renderer_config).run()
}

pub fn render(config_path: Option<&Path>, args: RenderArgs) -> Result<()> {
    let (_, config) = discover_config(config_path)?;
    let config = apply_render_overrides(config, &args)?;
    let request = still_request(&config, &args);
    let written = export_still(&request)
        .with_context(|| format!("failed to render {}", request.path.display()))?;
    println!("{}", written.display());
    Ok(())
}

pub fn config_where(config_path: Option<&Path>) -> Result<()> {
    let paths = AppPaths::discover(config_path)?;
    let status = if paths.config_file().is_file() {
        "present"
    } else {
        "missing; defaults apply"
    };
    println!("Configuration:");
    println!("  directory: {}", paths.config_dir().display());
    println!("  file:      {} ({status})", paths.config_file().display());
    println!("  source:    {}", paths.source());
    Ok(())
}

pub fn config_show(config_path: Option<&Path>) -> Result<()> {
    let (_, config) = discover_config(config_path)?;
    let rendered = config
        .to_toml_string()
        .context("failed to serialise config")?;
    print!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use glam::Vec2;
    use raymarch::{OrientationCapability, Variant};

    use super::*;

    fn render_args() -> RenderArgs {
        RenderArgs {
            output: PathBuf::from("frame.png"),
            size: None,
            time: None,
            pointer: None,
            orientation: None,
            zoom: None,
            radius: None,
            iterations: None,
            variant: None,
            workers: 0,
        }
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let paths = AppPaths::discover(Some(&missing)).unwrap();
        let err = load_config(&paths).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config"));
    }

    #[test]
    fn explicit_config_is_loaded_and_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.toml");
        fs::write(&path, "variant = \"oriented\"\n[tunables]\nzoom = 3.5\n").unwrap();
        let config = load_config(&AppPaths::discover(Some(&path)).unwrap()).unwrap();
        assert_eq!(config.variant, Variant::Oriented);
        assert_eq!(config.tunables.zoom, 3.5);

        fs::write(&path, "[tunables]\nzoom = 99.0\n").unwrap();
        let err = load_config(&AppPaths::discover(Some(&path)).unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("tunables.zoom"));
    }

    #[test]
    fn run_flags_override_file_values() {
        let args = RunArgs {
            variant: Some(Variant::Pointer),
            size: Some((640, 360)),
            fps: Some(30.0),
            antialias: Some(Antialiasing::Samples(4)),
            color_space: Some(ColorSpaceMode::Linear),
            fullscreen: true,
            orientation: Some(OrientationCapability::Immediate),
            still_time: None,
        };
        let config = apply_run_overrides(SceneConfig::default(), &args).unwrap();
        let renderer = renderer_config(&config, &args);

        assert_eq!(renderer.variant, Variant::Pointer);
        assert_eq!(renderer.surface_size, (640, 360));
        assert_eq!(
            renderer.policy,
            RenderPolicy::Animate {
                target_fps: Some(30.0)
            }
        );
        assert_eq!(renderer.antialiasing, Antialiasing::Samples(4));
        assert_eq!(renderer.color_space, ColorSpaceMode::Linear);
        assert!(renderer.fullscreen);
        assert_eq!(
            renderer.orientation_source,
            OrientationCapability::Immediate
        );
        assert_eq!(renderer.pointer_decay(), 0.9);
    }

    #[test]
    fn still_time_selects_still_policy() {
        let args = RunArgs {
            still_time: Some(Duration::from_millis(1500)),
            ..RunArgs::default()
        };
        let config = apply_run_overrides(SceneConfig::default(), &args).unwrap();
        assert_eq!(
            renderer_config(&config, &args).policy,
            RenderPolicy::Still { time: Some(1.5) }
        );
    }

    #[test]
    fn antialias_settings_map_to_renderer_modes() {
        assert_eq!(antialiasing(None), Antialiasing::Auto);
        assert_eq!(antialiasing(Some(AntialiasSetting::Off)), Antialiasing::Off);
        assert_eq!(
            antialiasing(Some(AntialiasSetting::Samples8)),
            Antialiasing::Samples(8)
        );
        assert!(antialias_setting(Antialiasing::Samples(3)).is_err());
    }

    #[test]
    fn render_flags_build_still_request() {
        let mut args = render_args();
        args.size = Some((64, 32));
        args.time = Some(Duration::from_secs(2));
        args.pointer = Some(Vec2::new(0.1, -0.1));
        args.orientation = Some(Orientation::new(0.5, 0.0, 1.0));
        args.iterations = Some(6);
        args.variant = Some(Variant::Tunable);

        let config = apply_render_overrides(SceneConfig::default(), &args).unwrap();
        let request = still_request(&config, &args);

        assert_eq!((request.width, request.height), (64, 32));
        assert_eq!(request.variant, Variant::Tunable);
        assert_eq!(request.inputs.time, 2.0);
        assert_eq!(request.inputs.aspect, 2.0);
        assert_eq!(request.inputs.pointer, Vec2::new(0.1, -0.1));
        assert_eq!(request.inputs.orientation, Orientation::new(0.5, 0.0, 1.0));
        assert_eq!(request.inputs.tunables.iterations, 6);
    }

    #[test]
    fn out_of_range_render_flags_are_rejected() {
        let mut args = render_args();
        args.zoom = Some(0.5);
        assert!(apply_render_overrides(SceneConfig::default(), &args).is_err());
    }
}
