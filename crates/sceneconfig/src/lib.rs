//! TOML configuration for the kaleido demo.
//!
//! Every table is optional; a missing file or an empty document yields the
//! same defaults the shader uses. Values are range-checked on load so the
//! renderer can trust them.

use std::fmt;
use std::time::Duration;

use raymarch::inputs::{
    ANGLE_RANGE, DEFAULT_ITERATIONS, DEFAULT_RADIUS, DEFAULT_ZOOM, ITERATION_RANGE, RADIUS_RANGE,
    ZOOM_RANGE,
};
use raymarch::{Orientation, OrientationCapability, Tunables, Variant};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SceneConfig {
    pub version: u32,
    pub variant: Variant,
    pub tunables: TunablesConfig,
    pub pointer: PointerConfig,
    pub orientation: OrientationConfig,
    pub window: WindowConfig,
    pub still: StillConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            variant: Variant::default(),
            tunables: TunablesConfig::default(),
            pointer: PointerConfig::default(),
            orientation: OrientationConfig::default(),
            window: WindowConfig::default(),
            still: StillConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TunablesConfig {
    pub zoom: f32,
    pub radius: f32,
    pub iterations: u32,
}

impl Default for TunablesConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            radius: DEFAULT_RADIUS,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl From<TunablesConfig> for Tunables {
    fn from(value: TunablesConfig) -> Self {
        Tunables {
            zoom: value.zoom,
            radius: value.radius,
            iterations: value.iterations,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Overrides the variant's per-frame decay factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decay: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrientationConfig {
    pub source: OrientationCapability,
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
}

impl OrientationConfig {
    pub fn fallback(&self) -> Orientation {
        Orientation::new(self.alpha, self.beta, self.gamma)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f32>,
    pub fullscreen: bool,
    pub fullscreen_on_click: bool,
    #[serde(
        deserialize_with = "deserialize_antialias_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub antialias: Option<AntialiasSetting>,
    pub color_space: ColorSpaceSetting,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: None,
            fullscreen: false,
            fullscreen_on_click: true,
            antialias: None,
            color_space: ColorSpaceSetting::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StillConfig {
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub time: Duration,
    pub width: u32,
    pub height: u32,
}

impl Default for StillConfig {
    fn default() -> Self {
        Self {
            time: Duration::ZERO,
            width: 1920,
            height: 1080,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }

    pub fn samples(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Off => Some(1),
            Self::Samples2 => Some(2),
            Self::Samples4 => Some(4),
            Self::Samples8 => Some(8),
            Self::Samples16 => Some(16),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpaceSetting {
    #[default]
    Auto,
    Gamma,
    Linear,
}

impl fmt::Display for ColorSpaceSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorSpaceSetting::Auto => f.write_str("auto"),
            ColorSpaceSetting::Gamma => f.write_str("gamma"),
            ColorSpaceSetting::Linear => f.write_str("linear"),
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            let raw = value.to_string();
            Some(parse_antialias(&raw).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    let samples = normalized.strip_prefix("samples").unwrap_or(&normalized);
    match samples {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        _ => Err(format!("invalid antialias setting '{normalized}'")),
    }
}

impl SceneConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SceneConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn tunables(&self) -> Tunables {
        self.tunables.into()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected {CONFIG_VERSION}",
                self.version
            )));
        }

        let tunables = &self.tunables;
        if !ZOOM_RANGE.contains(&tunables.zoom) {
            return Err(ConfigError::Invalid(format!(
                "tunables.zoom must be within {}..={} (got {})",
                ZOOM_RANGE.start(),
                ZOOM_RANGE.end(),
                tunables.zoom
            )));
        }
        if !RADIUS_RANGE.contains(&tunables.radius) {
            return Err(ConfigError::Invalid(format!(
                "tunables.radius must be within {}..={} (got {})",
                RADIUS_RANGE.start(),
                RADIUS_RANGE.end(),
                tunables.radius
            )));
        }
        if !ITERATION_RANGE.contains(&tunables.iterations) {
            return Err(ConfigError::Invalid(format!(
                "tunables.iterations must be within {}..={} (got {})",
                ITERATION_RANGE.start(),
                ITERATION_RANGE.end(),
                tunables.iterations
            )));
        }

        if let Some(decay) = self.pointer.decay {
            if !(decay > 0.0 && decay <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "pointer.decay must be in (0, 1] (got {decay})"
                )));
            }
        }

        for (name, angle) in [
            ("alpha", self.orientation.alpha),
            ("beta", self.orientation.beta),
            ("gamma", self.orientation.gamma),
        ] {
            if !ANGLE_RANGE.contains(&angle) {
                return Err(ConfigError::Invalid(format!(
                    "orientation.{name} must be within 0..=2π radians (got {angle})"
                )));
            }
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(
                "window.width and window.height must be greater than zero".into(),
            ));
        }
        if let Some(fps) = self.window.fps {
            if !(fps >= 0.0) {
                return Err(ConfigError::Invalid("window.fps must be >= 0".into()));
            }
        }

        if self.still.width == 0 || self.still.height == 0 {
            return Err(ConfigError::Invalid(
                "still.width and still.height must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
