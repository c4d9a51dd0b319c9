use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;
use log::{error, info};
use crate::telemetry::buffer::{Sample, Tick, TimeAxis};
use crate::telemetry::error::TelemetryError;
use crate::telemetry::group::{ChartGroup, GroupSpec};
use crate::telemetry::snapshot::GroupSnapshot;
/// Outcome of one group for one tick, as handed to the store.
#[derive(Clone, Debug, PartialEq)]
pub enum GroupRow {
    Values(Vec<Sample>),
    Fault,
}
struct StoreState {
    axis: TimeAxis,
    groups: Vec<ChartGroup>,
}
/// Owns the time axis and every channel buffer.
///
/// All mutation and every export go through one lock, so a reader never sees
/// a tick or a reset half applied.
pub struct TelemetryStore {
    specs: Vec<GroupSpec>,
    capacity: usize,
    state: Mutex<StoreState>,
}
impl TelemetryStore {
    pub fn new(capacity: usize, specs: &[GroupSpec]) -> Result<Self, TelemetryError> {
        if capacity == 0 {
            return Err(TelemetryError::InvalidCapacity);
        }
        if specs.is_empty() {
            return Err(TelemetryError::EmptyChannelSet);
        }
        let mut titles = HashSet::new();
        for spec in specs {
            spec.validate()?;
            if !titles.insert(spec.title.as_str()) {
                return Err(TelemetryError::DuplicateGroup(spec.title.clone()));
            }
        }
        let groups = specs
            .iter()
            .map(|spec| ChartGroup::from_spec(spec, capacity))
            .collect();
        Ok(Self {
            specs: specs.to_vec(),
            capacity,
            state: Mutex::new(StoreState {
                axis: TimeAxis::new(capacity),
                groups,
            }),
        })
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    pub fn specs(&self) -> &[GroupSpec] {
        &self.specs
    }
    pub fn group_index(&self, title: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.title == title)
    }
    /// Number of ticks currently held.
    pub fn len(&self) -> usize {
        self.state().axis.len()
    }
    /// Appends one tick: the marker once, then exactly one sample to every
    /// channel of every group.
    ///
    /// `rows` is positional over the groups. A group without a row, or whose
    /// row does not match its channel count, is recorded as missing.
    pub fn append_tick(&self, at: SystemTime, rows: Vec<GroupRow>) -> Tick {
        let mut state = self.state();
        let StoreState { axis, groups } = &mut *state;
        let tick = axis.next_tick(at);
        axis.append(tick);
        let mut rows = rows.into_iter();
        for group in groups.iter_mut() {
            match rows.next() {
                Some(GroupRow::Values(row)) if row.len() == group.channel_count() => {
                    group.append_row(&row)
                }
                Some(GroupRow::Values(row)) => {
                    error!(
                        "group `{}`: row has {} samples for {} channels, recording missing",
                        group.title(),
                        row.len(),
                        group.channel_count()
                    );
                    group.append_missing();
                }
                Some(GroupRow::Fault) | None => group.append_missing(),
            }
        }
        debug_assert!(groups
            .iter()
            .flat_map(|g| g.channels())
            .all(|c| c.len() == axis.len()));
        tick
    }
    /// Empties the axis and every channel. Capacity is unchanged.
    pub fn reset(&self) {
        let mut state = self.state();
        let dropped = state.axis.len();
        state.axis.clear();
        for group in &mut state.groups {
            group.clear();
        }
        info!("telemetry reset, dropped {dropped} ticks");
    }
    /// Copies one group together with the axis under a single lock
    /// acquisition. `None` for an unknown title.
    pub fn export_group(&self, title: &str) -> Option<GroupSnapshot> {
        let index = self.group_index(title)?;
        let state = self.state();
        Some(GroupSnapshot::capture(&state.groups[index], &state.axis))
    }
    fn state(&self) -> MutexGuard<'_, StoreState> {
        // Every critical section leaves the buffers aligned before it can
        // panic, so a poisoned lock still guards consistent data.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
/// Handle for the external reset trigger (e.g. a button press).
#[derive(Clone)]
pub struct ResetController {
    store: Arc<TelemetryStore>,
}
impl ResetController {
    pub fn new(store: Arc<TelemetryStore>) -> Self {
        Self { store }
    }
    /// Clears all history. Safe to call repeatedly.
    pub fn reset(&self) {
        self.store.reset();
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::range::AxisRange;
    use std::thread;
    fn board() -> Vec<GroupSpec> {
        vec![
            GroupSpec::new("Temperature", "C", &["Temperature"]),
            GroupSpec::new("Gases", "kΩ", &["OX*10", "RED", "NH3"]),
        ]
    }
    fn export_every(store: &TelemetryStore) -> Vec<GroupSnapshot> {
        store
            .specs()
            .iter()
            .map(|spec| store.export_group(&spec.title).unwrap())
            .collect()
    }
    fn assert_aligned(store: &TelemetryStore) {
        for snap in export_every(store) {
            for series in &snap.series {
                assert_eq!(series.samples.len(), snap.axis.len());
            }
        }
    }
    #[test]
    fn rejects_bad_construction() {
        assert!(matches!(
            TelemetryStore::new(0, &board()),
            Err(TelemetryError::InvalidCapacity)
        ));
        assert!(matches!(
            TelemetryStore::new(4, &[]),
            Err(TelemetryError::EmptyChannelSet)
        ));
        let mut dup = board();
        dup.push(GroupSpec::new("Gases", "x", &["A"]));
        assert!(matches!(
            TelemetryStore::new(4, &dup),
            Err(TelemetryError::DuplicateGroup(_))
        ));
    }
    #[test]
    fn capacity_and_alignment_hold_for_every_tick() {
        let store = TelemetryStore::new(5, &board()).unwrap();
        for i in 0..12 {
            let gas = if i % 3 == 0 {
                GroupRow::Fault
            } else {
                GroupRow::Values(vec![Some(1.0), Some(2.0), Some(3.0)])
            };
            store.append_tick(
                SystemTime::now(),
                vec![GroupRow::Values(vec![Some(i as f64)]), gas],
            );
            assert!(store.len() <= 5);
            assert_aligned(&store);
        }
        assert_eq!(store.len(), 5);
        let temp = store.export_group("Temperature").unwrap();
        let values: Vec<Sample> = temp.series[0].samples.clone();
        assert_eq!(
            values,
            vec![Some(7.0), Some(8.0), Some(9.0), Some(10.0), Some(11.0)]
        );
    }
    #[test]
    fn malformed_or_absent_rows_become_missing() {
        let store = TelemetryStore::new(4, &board()).unwrap();
        store.append_tick(
            SystemTime::now(),
            vec![GroupRow::Values(vec![Some(1.0), Some(2.0)])],
        );
        assert_aligned(&store);
        let temp = store.export_group("Temperature").unwrap();
        assert_eq!(temp.series[0].samples, vec![None]);
        let gases = store.export_group("Gases").unwrap();
        assert!(gases.series.iter().all(|s| s.samples == vec![None]));
    }
    #[test]
    fn reset_clears_everything_and_is_idempotent() {
        let store = Arc::new(TelemetryStore::new(4, &board()).unwrap());
        let controller = ResetController::new(Arc::clone(&store));
        controller.reset();
        for _ in 0..3 {
            store.append_tick(SystemTime::now(), vec![GroupRow::Fault, GroupRow::Fault]);
        }
        controller.reset();
        controller.reset();
        assert_eq!(store.len(), 0);
        for snap in export_every(&store) {
            assert!(snap.series.iter().all(|s| s.samples.is_empty()));
            assert_eq!(snap.value_range, AxisRange::NoRange);
            assert_eq!(snap.domain_range, AxisRange::NoRange);
        }
        assert_eq!(store.capacity(), 4);
        let tick = store.append_tick(SystemTime::now(), vec![]);
        assert_eq!(tick.seq, 1);
    }
    #[test]
    fn exports_never_observe_a_partial_reset() {
        let store = Arc::new(TelemetryStore::new(64, &board()).unwrap());
        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..400 {
                    if i % 7 == 0 {
                        store.reset();
                    } else {
                        store.append_tick(
                            SystemTime::now(),
                            vec![
                                GroupRow::Values(vec![Some(1.0)]),
                                GroupRow::Values(vec![Some(1.0), None, Some(2.0)]),
                            ],
                        );
                    }
                }
            })
        };
        for _ in 0..400 {
            for snap in export_every(&store) {
                let ticks = snap.axis.len();
                for series in &snap.series {
                    assert_eq!(series.samples.len(), ticks);
                }
                // Seqs restart at 1 on reset, so a half-cleared axis would not be contiguous.
                let seqs: Vec<u64> = snap.axis.iter().map(|t| t.seq).collect();
                assert!(seqs.iter().enumerate().all(|(i, seq)| *seq == i as u64 + 1));
            }
            assert!(store.export_group("Noise").is_none());
        }
        writer.join().unwrap();
    }
}
