use std::collections::VecDeque;
use std::time::SystemTime;
use serde::Serialize;
/// One channel value at one tick. `None` marks a failed read, not an absent tick.
pub type Sample = Option<f64>;
/// Marker appended to the time axis once per tick.
///
/// Ordered by `seq` first, so ranges over the axis follow tick order even if
/// the wall clock steps backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Tick {
    pub seq: u64,
    pub at: SystemTime,
}
/// Fixed-capacity FIFO that drops the oldest entry once full.
#[derive(Clone, Debug)]
struct Ring<T> {
    items: VecDeque<T>,
    capacity: usize,
}
impl<T: Clone> Ring<T> {
    fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }
    fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }
    fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}
/// Rolling history of one named signal.
#[derive(Clone, Debug)]
pub struct ChannelBuffer {
    name: String,
    samples: Ring<Sample>,
}
impl ChannelBuffer {
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            samples: Ring::new(capacity),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn len(&self) -> usize {
        self.samples.items.len()
    }
    pub fn append(&mut self, sample: Sample) {
        debug_assert!(
            sample.map_or(true, |v| !v.is_nan()),
            "NaN must be recorded as a missing sample"
        );
        self.samples.push(sample);
    }
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.items.iter()
    }
    /// Owned copy in append order, oldest first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.to_vec()
    }
    pub fn clear(&mut self) {
        self.samples.items.clear();
    }
}
/// Tick markers shared by every channel of every group.
#[derive(Clone, Debug)]
pub struct TimeAxis {
    ticks: Ring<Tick>,
}
impl TimeAxis {
    pub fn new(capacity: usize) -> Self {
        Self {
            ticks: Ring::new(capacity),
        }
    }
    pub fn len(&self) -> usize {
        self.ticks.items.len()
    }
    /// Marker for the next tick: counter restarts at 1 on an empty axis.
    pub fn next_tick(&self, at: SystemTime) -> Tick {
        let seq = self.latest().map_or(1, |last| last.seq + 1);
        Tick { seq, at }
    }
    pub fn append(&mut self, tick: Tick) {
        self.ticks.push(tick);
    }
    pub fn iter(&self) -> impl Iterator<Item = &Tick> {
        self.ticks.items.iter()
    }
    pub fn latest(&self) -> Option<Tick> {
        self.ticks.items.back().copied()
    }
    pub fn snapshot(&self) -> Vec<Tick> {
        self.ticks.to_vec()
    }
    pub fn clear(&mut self) {
        self.ticks.items.clear();
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn ring_evicts_oldest_and_keeps_order() {
        let mut buffer = ChannelBuffer::new("Temperature", 3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            buffer.append(Some(v));
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.snapshot(), vec![Some(2.0), Some(3.0), Some(4.0)]);
    }
    #[test]
    fn missing_samples_hold_their_position() {
        let mut buffer = ChannelBuffer::new("NH3", 4);
        buffer.append(Some(5.0));
        buffer.append(None);
        buffer.append(Some(3.0));
        assert_eq!(buffer.snapshot(), vec![Some(5.0), None, Some(3.0)]);
    }
    #[test]
    fn clear_keeps_capacity() {
        let mut buffer = ChannelBuffer::new("Light", 2);
        buffer.append(Some(1.0));
        buffer.append(Some(2.0));
        buffer.clear();
        assert_eq!(buffer.len(), 0);
        for v in [7.0, 8.0, 9.0] {
            buffer.append(Some(v));
        }
        assert_eq!(buffer.snapshot(), vec![Some(8.0), Some(9.0)]);
    }
    #[test]
    fn snapshot_is_detached_from_writer() {
        let mut buffer = ChannelBuffer::new("RED", 4);
        buffer.append(Some(1.0));
        let before = buffer.snapshot();
        buffer.append(Some(2.0));
        assert_eq!(before, vec![Some(1.0)]);
    }
    #[test]
    fn tick_counter_restarts_after_clear() {
        let now = SystemTime::now();
        let mut axis = TimeAxis::new(2);
        for _ in 0..3 {
            let tick = axis.next_tick(now);
            axis.append(tick);
        }
        let seqs: Vec<u64> = axis.iter().map(|t| t.seq).collect();
        assert_eq!(seqs, vec![2, 3]);
        axis.clear();
        assert_eq!(axis.next_tick(now).seq, 1);
    }
}
