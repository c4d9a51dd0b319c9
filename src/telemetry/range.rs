use serde::Serialize;
use crate::telemetry::buffer::{Tick, TimeAxis};
use crate::telemetry::group::ChartGroup;
/// Axis bounds for a chart. `NoRange` means there is nothing to scale to yet;
/// renderers keep their default axis instead of failing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AxisRange<T> {
    NoRange,
    Bounds { min: T, max: T },
}
impl<T: Copy> AxisRange<T> {
    pub fn bounds(&self) -> Option<(T, T)> {
        match *self {
            AxisRange::NoRange => None,
            AxisRange::Bounds { min, max } => Some((min, max)),
        }
    }
}
/// Min/max over every present sample of every channel in the group.
pub fn value_range(group: &ChartGroup) -> AxisRange<f64> {
    fold_values(
        group
            .channels()
            .iter()
            .flat_map(|c| c.iter().copied())
            .flatten(),
    )
}
fn fold_values(values: impl Iterator<Item = f64>) -> AxisRange<f64> {
    values.fold(AxisRange::NoRange, |acc, v| match acc {
        AxisRange::NoRange => AxisRange::Bounds { min: v, max: v },
        AxisRange::Bounds { min, max } => AxisRange::Bounds {
            min: min.min(v),
            max: max.max(v),
        },
    })
}
/// First and last tick on the axis (by sequence number).
pub fn domain_range(axis: &TimeAxis) -> AxisRange<Tick> {
    let min = axis.iter().min();
    let max = axis.iter().max();
    match (min, max) {
        (Some(min), Some(max)) => AxisRange::Bounds {
            min: *min,
            max: *max,
        },
        _ => AxisRange::NoRange,
    }
}
