use serde::Serialize;
use crate::telemetry::buffer::{Sample, Tick, TimeAxis};
use crate::telemetry::error::TelemetryError;
use crate::telemetry::group::ChartGroup;
use crate::telemetry::range::{domain_range, value_range, AxisRange};
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChannelSeries {
    pub name: String,
    pub samples: Vec<Sample>,
}
/// Read-only copy of one chart group, taken at a single point in time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupSnapshot {
    pub title: String,
    pub unit: String,
    pub axis: Vec<Tick>,
    pub series: Vec<ChannelSeries>,
    pub value_range: AxisRange<f64>,
    pub domain_range: AxisRange<Tick>,
}
impl GroupSnapshot {
    /// Caller must hold the store lock so `group` and `axis` belong to the same tick.
    pub(crate) fn capture(group: &ChartGroup, axis: &TimeAxis) -> Self {
        Self {
            title: group.title().to_owned(),
            unit: group.unit().to_owned(),
            axis: axis.snapshot(),
            series: group
                .channels()
                .iter()
                .map(|c| ChannelSeries {
                    name: c.name().to_owned(),
                    samples: c.snapshot(),
                })
                .collect(),
            value_range: value_range(group),
            domain_range: domain_range(axis),
        }
    }
    pub fn len(&self) -> usize {
        self.axis.len()
    }
    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }
    pub fn latest_tick(&self) -> Option<Tick> {
        self.axis.last().copied()
    }
    /// Newest value per channel rounded to one decimal; `None` if that read failed
    /// or nothing has been sampled yet.
    pub fn latest_readings(&self) -> Vec<(String, Option<f64>)> {
        self.series
            .iter()
            .map(|s| {
                let latest = s.samples.last().copied().flatten();
                (s.name.clone(), latest.map(|v| (v * 10.0).round() / 10.0))
            })
            .collect()
    }
    pub fn to_json(&self) -> Result<String, TelemetryError> {
        serde_json::to_string(self).map_err(TelemetryError::Export)
    }
}
