#[cfg(test)]
use std::collections::VecDeque;
use crate::telemetry::error::SensorFault;
/// Raw values from one provider call, one per channel (or the six cumulative
/// counts for a particulate group).
#[derive(Clone, Debug, PartialEq)]
pub struct GroupReading {
    pub values: Vec<f64>,
}
impl GroupReading {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
        }
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
}
/// Anything that can be read once per tick for one chart group.
///
/// Driver errors must come back as a [`SensorFault`]; a read may block up to
/// the sampler's read timeout.
pub trait SensorProvider: Send {
    fn read(&mut self) -> Result<GroupReading, SensorFault>;
}
/// Scripted provider. Once the script is exhausted every read faults.
#[cfg(test)]
pub struct ManualProvider {
    queue: VecDeque<Result<GroupReading, SensorFault>>,
}
#[cfg(test)]
impl ManualProvider {
    pub fn new(readings: impl IntoIterator<Item = Result<GroupReading, SensorFault>>) -> Self {
        Self {
            queue: readings.into_iter().collect(),
        }
    }
    pub fn values(rows: impl IntoIterator<Item = Vec<f64>>) -> Self {
        Self::new(rows.into_iter().map(|row| Ok(GroupReading::new(row))))
    }
}
#[cfg(test)]
impl SensorProvider for ManualProvider {
    fn read(&mut self) -> Result<GroupReading, SensorFault> {
        self.queue
            .pop_front()
            .unwrap_or_else(|| Err(SensorFault::Driver("script exhausted".into())))
    }
}
/// Adapts a closure into a provider.
#[cfg(test)]
pub struct FnProvider<F>(pub F);
#[cfg(test)]
impl<F> SensorProvider for FnProvider<F>
where
    F: FnMut() -> Result<GroupReading, SensorFault> + Send,
{
    fn read(&mut self) -> Result<GroupReading, SensorFault> {
        (self.0)()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn manual_provider_replays_then_faults() {
        let mut provider = ManualProvider::new(vec![
            Ok(GroupReading::new(vec![1.0])),
            Err(SensorFault::Driver("i2c nack".into())),
        ]);
        assert_eq!(provider.read(), Ok(GroupReading::new(vec![1.0])));
        assert!(provider.read().is_err());
        assert!(matches!(provider.read(), Err(SensorFault::Driver(_))));
    }
    #[test]
    fn closures_are_providers() {
        let mut n = 0.0;
        let mut provider = FnProvider(move || {
            n += 1.0;
            Ok(GroupReading::new(vec![n]))
        });
        assert_eq!(provider.read().map(|r| r.values), Ok(vec![1.0]));
        assert_eq!(provider.read().map(|r| r.values), Ok(vec![2.0]));
    }
}
