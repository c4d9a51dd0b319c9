// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use once_cell::sync::Lazy;
use serde::Deserialize;
use crate::telemetry::particulate::CHANNEL_NAMES;
use crate::telemetry::{GroupSpec, NegativeBinPolicy, TelemetryError};
pub const TEMPERATURE: &str = "Temperature";
pub const HUMIDITY: &str = "Humidity";
pub const PRESSURE: &str = "Pressure";
pub const LIGHT: &str = "Light";
pub const GASES: &str = "Gases";
pub const PARTICULATES: &str = "Particulate matters";
/// Enviro+ board with a PMS5003 attached.
pub static ENVIRO_PLUS_CHANNELS: Lazy<Vec<GroupSpec>> = Lazy::new(|| {
    vec![
        GroupSpec::new(TEMPERATURE, "C", &["Temperature"]),
        GroupSpec::new(HUMIDITY, "%", &["Humidity"]),
        GroupSpec::new(PRESSURE, "mBar", &["Pressure"]),
        GroupSpec::new(LIGHT, "Lux", &["Light"]),
        GroupSpec::new(GASES, "kΩ", &["OX*10", "RED", "NH3"]),
        GroupSpec::new(PARTICULATES, "/100cl", &CHANNEL_NAMES),
    ]
});
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub tick_interval_seconds: f64,
    /// Ticks kept per channel. 8640 is 24 hours at 10 s.
    pub capacity: usize,
    pub read_timeout_seconds: f64,
    pub negative_bins: NegativeBinPolicy,
    pub output_dir: PathBuf,
    pub channel_set: Vec<GroupSpec>,
}
impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tick_interval_seconds: 10.0,
            capacity: 8640,
            read_timeout_seconds: 5.0,
            negative_bins: NegativeBinPolicy::Keep,
            output_dir: PathBuf::from("dashboard"),
            channel_set: ENVIRO_PLUS_CHANNELS.clone(),
        }
    }
}
impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self, TelemetryError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
    pub fn from_json(text: &str) -> Result<Self, TelemetryError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
    pub fn validate(&self) -> Result<(), TelemetryError> {
        positive_secs(self.tick_interval_seconds)
            .ok_or(TelemetryError::InvalidInterval(self.tick_interval_seconds))?;
        positive_secs(self.read_timeout_seconds)
            .ok_or(TelemetryError::InvalidReadTimeout(self.read_timeout_seconds))?;
        if self.capacity == 0 {
            return Err(TelemetryError::InvalidCapacity);
        }
        if self.channel_set.is_empty() {
            return Err(TelemetryError::EmptyChannelSet);
        }
        for spec in &self.channel_set {
            spec.validate()?;
        }
        Ok(())
    }
    pub fn tick_interval(&self) -> Duration {
        positive_secs(self.tick_interval_seconds).unwrap_or(Duration::from_secs(10))
    }
    pub fn read_timeout(&self) -> Duration {
        positive_secs(self.read_timeout_seconds).unwrap_or(Duration::from_secs(5))
    }
}
fn positive_secs(secs: f64) -> Option<Duration> {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).ok()
    } else {
        None
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn defaults_describe_the_enviro_board() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity, 8640);
        assert_eq!(config.tick_interval(), Duration::from_secs(10));
        assert_eq!(config.channel_set.len(), 6);
        let pm = config
            .channel_set
            .iter()
            .find(|g| g.title == PARTICULATES)
            .unwrap();
        assert_eq!(pm.channels.len(), 6);
    }
    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = DashboardConfig::from_json(
            r#"{"tick_interval_seconds": 5, "capacity": 20, "negative_bins": "clamp"}"#,
        )
        .unwrap();
        assert_eq!(config.capacity, 20);
        assert_eq!(config.tick_interval(), Duration::from_secs(5));
        assert_eq!(config.negative_bins, NegativeBinPolicy::Clamp);
        assert_eq!(config.channel_set, *ENVIRO_PLUS_CHANNELS);
    }
    #[test]
    fn custom_channel_set_parses() {
        let config = DashboardConfig::from_json(
            r#"{"channel_set": [{"title": "Light", "unit": "Lux", "channels": ["Light"]}]}"#,
        )
        .unwrap();
        assert_eq!(config.channel_set, vec![GroupSpec::new("Light", "Lux", &["Light"])]);
    }
    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            DashboardConfig::from_json(r#"{"capacity": 0}"#),
            Err(TelemetryError::InvalidCapacity)
        ));
        assert!(matches!(
            DashboardConfig::from_json(r#"{"tick_interval_seconds": -1}"#),
            Err(TelemetryError::InvalidInterval(_))
        ));
        assert!(matches!(
            DashboardConfig::from_json(r#"{"read_timeout_seconds": 0}"#),
            Err(TelemetryError::InvalidReadTimeout(_))
        ));
        assert!(matches!(
            DashboardConfig::from_json(r#"{"channel_set": []}"#),
            Err(TelemetryError::EmptyChannelSet)
        ));
        assert!(matches!(
            DashboardConfig::from_json(r#"{"frequency": 10}"#),
            Err(TelemetryError::ConfigParse(_))
        ));
    }
}
