// src/sensors.rs
//! Simulated Enviro+ board. Stands in for the BME280 / LTR559 / MICS6814 /
//! PMS5003 drivers so the dashboard runs without the hardware attached.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::config::{DashboardConfig, GASES, HUMIDITY, LIGHT, PARTICULATES, PRESSURE, TEMPERATURE};
use crate::telemetry::{
    GroupBinding, GroupReading, NegativeBinPolicy, SensorFault, SensorProvider, TelemetryError,
    Transform,
};
/// Raw MICS6814 resistances (ohms) are divided down to fit one chart:
/// oxidising by 100 (plotted as "OX*10"), reducing and NH3 by 1000.
pub const GAS_DIVISORS: [f64; 3] = [100.0, 1000.0, 1000.0];
/// Bounded random walk with an occasional failed read.
pub struct DriftSensor {
    rng: StdRng,
    values: Vec<f64>,
    step: f64,
    bounds: (f64, f64),
    fault_rate: f64,
}
impl DriftSensor {
    pub fn new(start: &[f64], step: f64, bounds: (f64, f64), fault_rate: f64) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            values: start.to_vec(),
            step,
            bounds,
            fault_rate,
        }
    }
}
impl SensorProvider for DriftSensor {
    fn read(&mut self) -> Result<GroupReading, SensorFault> {
        if self.rng.gen_bool(self.fault_rate) {
            return Err(SensorFault::Driver("i2c read failed".into()));
        }
        for value in &mut self.values {
            let delta = self.rng.gen_range(-self.step..=self.step);
            *value = (*value + delta).clamp(self.bounds.0, self.bounds.1);
        }
        Ok(GroupReading::new(self.values.clone()))
    }
}
/// PMS5003 stand-in: reports cumulative counts per 0.1 L, smallest size first.
pub struct ParticleCounter {
    rng: StdRng,
    timeout_rate: f64,
}
impl ParticleCounter {
    pub fn new(timeout_rate: f64) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            timeout_rate,
        }
    }
}
impl SensorProvider for ParticleCounter {
    fn read(&mut self) -> Result<GroupReading, SensorFault> {
        if self.rng.gen_bool(self.timeout_rate) {
            return Err(SensorFault::Driver("PMS5003 read timeout".into()));
        }
        let mut bins = [
            self.rng.gen_range(300.0..900.0),
            self.rng.gen_range(80.0..300.0),
            self.rng.gen_range(10.0..60.0),
            self.rng.gen_range(0.0..10.0),
            self.rng.gen_range(0.0..4.0),
            self.rng.gen_range(0.0..2.0),
        ];
        for bin in &mut bins {
            *bin = f64::round(*bin);
        }
        let mut counts = [0.0; 6];
        let mut above = 0.0;
        for idx in (0..bins.len()).rev() {
            above += bins[idx];
            counts[idx] = above;
        }
        Ok(GroupReading::new(counts.to_vec()))
    }
}
/// Static table from group title to its provider and transform.
pub fn simulated_bindings(config: &DashboardConfig) -> Result<Vec<GroupBinding>, TelemetryError> {
    config
        .channel_set
        .iter()
        .map(|spec| simulated_binding(&spec.title, config.negative_bins))
        .collect()
}
fn simulated_binding(
    title: &str,
    negative_bins: NegativeBinPolicy,
) -> Result<GroupBinding, TelemetryError> {
    let binding = match title {
        TEMPERATURE => GroupBinding::new(
            title,
            DriftSensor::new(&[21.0], 0.2, (-10.0, 45.0), 0.02),
            Transform::Identity,
        ),
        HUMIDITY => GroupBinding::new(
            title,
            DriftSensor::new(&[45.0], 0.5, (0.0, 100.0), 0.02),
            Transform::Identity,
        ),
        PRESSURE => GroupBinding::new(
            title,
            DriftSensor::new(&[1013.0], 0.3, (950.0, 1060.0), 0.02),
            Transform::Identity,
        ),
        LIGHT => GroupBinding::new(
            title,
            DriftSensor::new(&[250.0], 15.0, (0.0, 2000.0), 0.02),
            Transform::Identity,
        ),
        GASES => GroupBinding::new(
            title,
            DriftSensor::new(
                &[20_000.0, 350_000.0, 90_000.0],
                2_000.0,
                (1_000.0, 1_000_000.0),
                0.02,
            ),
            Transform::Scale(GAS_DIVISORS.to_vec()),
        ),
        PARTICULATES => GroupBinding::new(
            title,
            ParticleCounter::new(0.05),
            Transform::Particulate(negative_bins),
        ),
        other => return Err(TelemetryError::UnknownGroup(other.to_owned())),
    };
    Ok(binding)
}
