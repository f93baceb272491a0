use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use glam::Vec2;
use raymarch::{Orientation, OrientationCapability, Variant};
use renderer::{Antialiasing, ColorSpaceMode};

#[derive(Parser, Debug)]
#[command(
    name = "kaleido",
    author,
    version,
    about = "Interactive kaleidoscopic fractal raymarcher",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Configuration file; defaults to `kaleido.toml` in the config directory.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Shader variant: `gradient`, `pointer`, `oriented`, or `tunable`.
    #[arg(long, value_name = "VARIANT", value_parser = parse_variant)]
    pub variant: Option<Variant>,

    /// Window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// FPS cap for the preview window (0=uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<Antialiasing>,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(long, value_name = "MODE", value_parser = parse_color_space)]
    pub color_space: Option<ColorSpaceMode>,

    /// Start in borderless fullscreen.
    #[arg(long)]
    pub fullscreen: bool,

    /// Orientation provider: `sliders`, `immediate`, or `permissioned`.
    #[arg(long, value_name = "SOURCE", value_parser = parse_orientation_source)]
    pub orientation: Option<OrientationCapability>,

    /// Freeze time at this timestamp (seconds or e.g. `2s 500ms`) and redraw on input only.
    #[arg(long, value_name = "TIME", value_parser = parse_time)]
    pub still_time: Option<Duration>,
}

impl RunArgs {
    /// Combines flags given before `run` with those given after it; the
    /// later ones win where both are set.
    pub fn merged_with(self, later: RunArgs) -> RunArgs {
        RunArgs {
            variant: later.variant.or(self.variant),
            size: later.size.or(self.size),
            fps: later.fps.or(self.fps),
            antialias: later.antialias.or(self.antialias),
            color_space: later.color_space.or(self.color_space),
            fullscreen: later.fullscreen || self.fullscreen,
            orientation: later.orientation.or(self.orientation),
            still_time: later.still_time.or(self.still_time),
        }
    }
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Destination PNG path.
    #[arg(short, long, value_name = "FILE.png")]
    pub output: PathBuf,

    /// Image size (e.g. `1920x1080`); defaults to the `[still]` table.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Timestamp to evaluate (seconds or e.g. `2s 500ms`).
    #[arg(long, value_name = "TIME", value_parser = parse_time)]
    pub time: Option<Duration>,

    /// Pointer offset in viewport-height units (e.g. `0.1,-0.05`).
    #[arg(long, value_name = "X,Y", value_parser = parse_pointer, allow_hyphen_values = true)]
    pub pointer: Option<Vec2>,

    /// Fold orientation in radians (e.g. `0.5,0,1.2`).
    #[arg(long, value_name = "A,B,G", value_parser = parse_angles)]
    pub orientation: Option<Orientation>,

    #[arg(long, value_name = "ZOOM")]
    pub zoom: Option<f32>,

    #[arg(long, value_name = "RADIUS")]
    pub radius: Option<f32>,

    #[arg(long, value_name = "COUNT")]
    pub iterations: Option<u32>,

    /// Shader variant: `gradient`, `pointer`, `oriented`, or `tunable`.
    #[arg(long, value_name = "VARIANT", value_parser = parse_variant)]
    pub variant: Option<Variant>,

    /// Worker threads for the CPU renderer (0=all cores).
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub workers: usize,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the interactive preview window (default).
    Run(RunArgs),
    /// Render a still frame on the CPU and write it as PNG.
    Render(RenderArgs),
    /// Inspect configuration paths and values.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved configuration directory and file.
    Where,
    /// Print the effective configuration as TOML.
    Show,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_variant(value: &str) -> Result<Variant, String> {
    value.parse()
}

pub fn parse_orientation_source(value: &str) -> Result<OrientationCapability, String> {
    value.parse()
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(Antialiasing::Auto),
        "off" | "none" | "disable" | "disabled" | "0" => Ok(Antialiasing::Off),
        _ => {
            let samples: u32 = normalized.parse().map_err(|_| {
                format!("invalid anti-alias sample count '{trimmed}'; use auto/off or 2/4/8/16")
            })?;

            if samples == 1 {
                return Ok(Antialiasing::Off);
            }

            if !matches!(samples, 2 | 4 | 8 | 16) {
                return Err(format!(
                    "unsupported sample count {samples}; supported values are 2, 4, 8, or 16"
                ));
            }

            Ok(Antialiasing::Samples(samples))
        }
    }
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" => Ok(ColorSpaceMode::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceMode::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    if width == 0 || height == 0 {
        return Err("size must be greater than zero".into());
    }
    Ok((width, height))
}

/// Accepts plain seconds (`2.5`) or a humantime duration (`2s 500ms`).
pub fn parse_time(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err("time must be a non-negative number of seconds".into());
        }
        return Ok(Duration::from_secs_f64(seconds));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid time '{trimmed}': {err}"))
}

fn parse_floats<const N: usize>(value: &str, label: &str) -> Result<[f32; N], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!(
            "expected {N} comma-separated {label} values, got {}",
            parts.len()
        ));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        let parsed: f32 = part
            .parse()
            .map_err(|_| format!("invalid {label} value '{part}'"))?;
        if !parsed.is_finite() {
            return Err(format!("{label} values must be finite"));
        }
        *slot = parsed;
    }
    Ok(out)
}

pub fn parse_pointer(value: &str) -> Result<Vec2, String> {
    let [x, y] = parse_floats::<2>(value, "pointer")?;
    Ok(Vec2::new(x, y))
}

pub fn parse_angles(value: &str) -> Result<Orientation, String> {
    let [alpha, beta, gamma] = parse_floats::<3>(value, "orientation")?;
    Ok(Orientation::new(alpha, beta, gamma))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_size(" 64 X 32 ").unwrap(), (64, 32));
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("1280").is_err());
    }

    #[test]
    fn parses_antialias_modes() {
        assert_eq!(parse_antialias("auto").unwrap(), Antialiasing::Auto);
        assert_eq!(parse_antialias("1").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("8").unwrap(), Antialiasing::Samples(8));
        assert!(parse_antialias("3").is_err());
        assert!(parse_antialias("").is_err());
    }

    #[test]
    fn parses_times() {
        assert_eq!(parse_time("2.5").unwrap(), Duration::from_millis(2500));
        assert_eq!(parse_time("1m 3s").unwrap(), Duration::from_secs(63));
        assert!(parse_time("-1").is_err());
        assert!(parse_time("later").is_err());
    }

    #[test]
    fn parses_vectors() {
        assert_eq!(parse_pointer("0.1,-0.2").unwrap(), Vec2::new(0.1, -0.2));
        assert_eq!(
            parse_angles("0.5, 0, 1.25").unwrap(),
            Orientation::new(0.5, 0.0, 1.25)
        );
        assert!(parse_pointer("1,2,3").is_err());
        assert!(parse_angles("a,b,c").is_err());
    }

    #[test]
    fn bare_invocation_runs_the_window() {
        let cli = Cli::try_parse_from(["kaleido", "--variant", "pointer", "--size", "640x480"])
            .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.variant, Some(Variant::Pointer));
        assert_eq!(cli.run.size, Some((640, 480)));
    }

    #[test]
    fn flags_before_run_subcommand_are_kept() {
        let cli = Cli::try_parse_from([
            "kaleido",
            "--variant",
            "pointer",
            "--fullscreen",
            "run",
            "--size",
            "640x480",
            "--variant",
            "oriented",
            "--fps",
            "30",
        ])
        .unwrap();
        let Some(Command::Run(later)) = cli.command else {
            panic!("expected run subcommand");
        };
        let merged = cli.run.merged_with(later);
        assert_eq!(merged.variant, Some(Variant::Oriented));
        assert_eq!(merged.size, Some((640, 480)));
        assert_eq!(merged.fps, Some(30.0));
        assert!(merged.fullscreen);
    }

    #[test]
    fn render_subcommand_accepts_negative_pointer() {
        let cli = Cli::try_parse_from([
            "kaleido",
            "render",
            "--output",
            "frame.png",
            "--pointer",
            "-0.1,0.2",
            "--config",
            "scene.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("scene.toml")));
        match cli.command {
            Some(Command::Render(args)) => {
                assert_eq!(args.pointer, Some(Vec2::new(-0.1, 0.2)));
                assert_eq!(args.workers, 0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
