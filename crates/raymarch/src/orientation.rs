//! Providers of the per-frame [`Orientation`].
//!
//! Hosts differ in how tilt data becomes available: some platforms deliver
//! sensor readings immediately, others gate them behind a user permission
//! prompt, and desktops have no sensor at all. Each case is a separate
//! [`OrientationSource`] chosen once at startup by
//! [`select_orientation_source`], so the render loop only ever asks for the
//! current value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::inputs::Orientation;

/// Query surface shared by every orientation provider.
pub trait OrientationSource: Send {
    fn current_orientation(&self) -> Orientation;

    /// Delivers a sensor reading in degrees. Sources without a sensor ignore it.
    fn push_reading(&mut self, _alpha: f32, _beta: f32, _gamma: f32) {}

    /// Updates the slider values reported while no sensor data is usable.
    fn set_fallback(&mut self, fallback: Orientation);

    /// Permission flow hook; `true` when the call changed the source's state.
    fn request_permission(&mut self) -> bool {
        false
    }

    fn permission(&self) -> PermissionState {
        PermissionState::NotRequired
    }
}

/// What the host platform offers for orientation input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationCapability {
    /// No sensor; sliders drive orientation.
    #[default]
    Sliders,
    /// Sensor readings are available without a prompt.
    Immediate,
    /// Sensor readings require an explicit user grant first.
    Permissioned,
}

impl fmt::Display for OrientationCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrientationCapability::Sliders => f.write_str("sliders"),
            OrientationCapability::Immediate => f.write_str("immediate"),
            OrientationCapability::Permissioned => f.write_str("permissioned"),
        }
    }
}

impl FromStr for OrientationCapability {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sliders" | "slider" | "none" => Ok(Self::Sliders),
            "immediate" | "sensor" => Ok(Self::Immediate),
            "permissioned" | "permission" | "prompt" => Ok(Self::Permissioned),
            other => Err(format!(
                "unknown orientation source '{other}'; expected sliders, immediate, or permissioned"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    NotRequired,
    /// Not asked yet.
    Prompt,
    /// Asked, awaiting the user's answer.
    Pending,
    Granted,
    Denied,
}

/// Orientation taken straight from the three fallback sliders.
#[derive(Debug, Clone, Copy, Default)]
pub struct SliderOrientation {
    value: Orientation,
}

impl SliderOrientation {
    pub fn new(value: Orientation) -> Self {
        Self { value }
    }
}

impl OrientationSource for SliderOrientation {
    fn current_orientation(&self) -> Orientation {
        self.value
    }

    fn set_fallback(&mut self, fallback: Orientation) {
        self.value = fallback;
    }
}

/// Sensor source that uses readings as soon as they arrive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateOrientationSource {
    fallback: Orientation,
    latest: Option<Orientation>,
}

impl ImmediateOrientationSource {
    pub fn new(fallback: Orientation) -> Self {
        Self {
            fallback,
            latest: None,
        }
    }
}

impl OrientationSource for ImmediateOrientationSource {
    fn current_orientation(&self) -> Orientation {
        self.latest.unwrap_or(self.fallback)
    }

    fn push_reading(&mut self, alpha: f32, beta: f32, gamma: f32) {
        if self.latest.is_none() {
            debug!("first orientation reading received");
        }
        self.latest = Some(Orientation::from_degrees(alpha, beta, gamma));
    }

    fn set_fallback(&mut self, fallback: Orientation) {
        self.fallback = fallback;
    }
}

/// Sensor source that discards readings until the user grants access.
#[derive(Debug, Clone, Copy)]
pub struct PermissionedOrientationSource {
    inner: ImmediateOrientationSource,
    state: PermissionState,
}

impl PermissionedOrientationSource {
    pub fn new(fallback: Orientation) -> Self {
        Self {
            inner: ImmediateOrientationSource::new(fallback),
            state: PermissionState::Prompt,
        }
    }

    /// Accepts a pending prompt; readings are used from now on.
    pub fn grant(&mut self) {
        if self.state == PermissionState::Pending {
            info!("orientation permission granted");
            self.state = PermissionState::Granted;
        }
    }

    /// Rejects a pending prompt; the slider fallback stays in effect for good.
    pub fn deny(&mut self) {
        if self.state == PermissionState::Pending {
            warn!("orientation permission denied; keeping slider orientation");
            self.state = PermissionState::Denied;
        }
    }
}

impl OrientationSource for PermissionedOrientationSource {
    fn current_orientation(&self) -> Orientation {
        match self.state {
            PermissionState::Granted => self.inner.current_orientation(),
            _ => self.inner.fallback,
        }
    }

    fn push_reading(&mut self, alpha: f32, beta: f32, gamma: f32) {
        if self.state == PermissionState::Granted {
            self.inner.push_reading(alpha, beta, gamma);
        }
    }

    fn set_fallback(&mut self, fallback: Orientation) {
        self.inner.set_fallback(fallback);
    }

    /// First call raises the prompt; a second call while pending acts as
    /// the user's confirmation.
    fn request_permission(&mut self) -> bool {
        match self.state {
            PermissionState::Prompt => {
                info!("requesting orientation permission");
                self.state = PermissionState::Pending;
                true
            }
            PermissionState::Pending => {
                self.grant();
                true
            }
            _ => false,
        }
    }

    fn permission(&self) -> PermissionState {
        self.state
    }
}

/// Picks the provider matching the host capability.
pub fn select_orientation_source(
    capability: OrientationCapability,
    fallback: Orientation,
) -> Box<dyn OrientationSource> {
    debug!(%capability, "selecting orientation source");
    match capability {
        OrientationCapability::Sliders => Box::new(SliderOrientation::new(fallback)),
        OrientationCapability::Immediate => Box::new(ImmediateOrientationSource::new(fallback)),
        OrientationCapability::Permissioned => {
            Box::new(PermissionedOrientationSource::new(fallback))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_source_prefers_readings() {
        let fallback = Orientation::new(0.1, 0.2, 0.3);
        let mut source = ImmediateOrientationSource::new(fallback);
        assert_eq!(source.current_orientation(), fallback);
        source.push_reading(90.0, 0.0, 0.0);
        let current = source.current_orientation();
        assert!((current.alpha - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn permissioned_source_ignores_readings_until_granted() {
        let fallback = Orientation::new(0.5, 0.5, 0.5);
        let mut source = PermissionedOrientationSource::new(fallback);
        assert_eq!(source.permission(), PermissionState::Prompt);

        source.push_reading(45.0, 45.0, 45.0);
        assert_eq!(source.current_orientation(), fallback);

        assert!(source.request_permission());
        assert_eq!(source.permission(), PermissionState::Pending);
        source.push_reading(45.0, 45.0, 45.0);
        assert_eq!(source.current_orientation(), fallback);

        assert!(source.request_permission());
        assert_eq!(source.permission(), PermissionState::Granted);
        source.push_reading(180.0, 0.0, 0.0);
        assert!((source.current_orientation().alpha - std::f32::consts::PI).abs() < 1e-6);
        assert!(!source.request_permission());
    }

    #[test]
    fn denied_permission_keeps_fallback() {
        let mut source = PermissionedOrientationSource::new(Orientation::IDENTITY);
        source.grant();
        assert_eq!(source.permission(), PermissionState::Prompt);
        source.request_permission();
        source.deny();
        source.push_reading(10.0, 20.0, 30.0);
        assert_eq!(source.permission(), PermissionState::Denied);
        assert!(!source.request_permission());
        source.grant();
        assert_eq!(source.permission(), PermissionState::Denied);
        assert_eq!(source.current_orientation(), Orientation::IDENTITY);

        source.set_fallback(Orientation::new(1.0, 0.0, 0.0));
        assert_eq!(source.current_orientation().alpha, 1.0);
    }

    #[test]
    fn selection_matches_capability() {
        let fallback = Orientation::new(0.3, 0.0, 0.0);
        let mut sliders = select_orientation_source(OrientationCapability::Sliders, fallback);
        sliders.push_reading(90.0, 90.0, 90.0);
        assert_eq!(sliders.current_orientation(), fallback);
        assert_eq!(sliders.permission(), PermissionState::NotRequired);

        let gated = select_orientation_source(OrientationCapability::Permissioned, fallback);
        assert_eq!(gated.permission(), PermissionState::Prompt);

        assert_eq!(
            "prompt".parse::<OrientationCapability>().unwrap(),
            OrientationCapability::Permissioned
        );
    }
}
