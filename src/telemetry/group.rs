use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use crate::telemetry::buffer::{ChannelBuffer, Sample};
use crate::telemetry::error::TelemetryError;
/// Static description of one chart: what it is called and which channels it plots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub title: String,
    pub unit: String,
    pub channels: Vec<String>,
}
impl GroupSpec {
    pub fn new(title: &str, unit: &str, channels: &[&str]) -> Self {
        Self {
            title: title.to_owned(),
            unit: unit.to_owned(),
            channels: channels.iter().map(|c| (*c).to_owned()).collect(),
        }
    }
    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.channels.is_empty() {
            return Err(TelemetryError::EmptyGroup(self.title.clone()));
        }
        let mut seen = HashSet::new();
        for channel in &self.channels {
            if !seen.insert(channel.as_str()) {
                return Err(TelemetryError::DuplicateChannel {
                    group: self.title.clone(),
                    channel: channel.clone(),
                });
            }
        }
        Ok(())
    }
}
/// A titled set of channels drawn together against the shared time axis.
#[derive(Clone, Debug)]
pub struct ChartGroup {
    title: String,
    unit: String,
    channels: Vec<ChannelBuffer>,
}
impl ChartGroup {
    pub fn from_spec(spec: &GroupSpec, capacity: usize) -> Self {
        Self {
            title: spec.title.clone(),
            unit: spec.unit.clone(),
            channels: spec
                .channels
                .iter()
                .map(|name| ChannelBuffer::new(name.as_str(), capacity))
                .collect(),
        }
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn unit(&self) -> &str {
        &self.unit
    }
    pub fn channels(&self) -> &[ChannelBuffer] {
        &self.channels
    }
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
    /// Appends one row, positionally. The row length is fixed by the caller
    /// (the store) to the channel count; anything else is a bug.
    pub(crate) fn append_row(&mut self, row: &[Sample]) {
        debug_assert_eq!(row.len(), self.channels.len());
        for (channel, sample) in self.channels.iter_mut().zip(row) {
            channel.append(*sample);
        }
    }
    pub(crate) fn append_missing(&mut self) {
        for channel in &mut self.channels {
            channel.append(None);
        }
    }
    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.clear();
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn spec_rejects_duplicate_and_empty_channels() {
        let dup = GroupSpec::new("Gases", "kΩ", &["RED", "RED"]);
        assert!(matches!(
            dup.validate(),
            Err(TelemetryError::DuplicateChannel { .. })
        ));
        let empty = GroupSpec::new("Light", "Lux", &[]);
        assert!(matches!(empty.validate(), Err(TelemetryError::EmptyGroup(_))));
    }
    #[test]
    fn rows_land_on_channels_in_order() {
        let spec = GroupSpec::new("Gases", "kΩ", &["OX*10", "RED", "NH3"]);
        let mut group = ChartGroup::from_spec(&spec, 8);
        group.append_row(&[Some(1.0), None, Some(3.0)]);
        group.append_missing();
        let names: Vec<&str> = group.channels().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["OX*10", "RED", "NH3"]);
        assert_eq!(group.channels()[1].snapshot(), vec![None, None]);
        assert_eq!(group.channels()[2].snapshot(), vec![Some(3.0), None]);
    }
}
