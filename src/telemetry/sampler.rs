use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime};
use log::{debug, error, info, trace, warn};
use crate::telemetry::buffer::{Sample, Tick};
use crate::telemetry::error::{SensorFault, TelemetryError};
use crate::telemetry::particulate::{CumulativeCounts, NegativeBinPolicy, BIN_COUNT};
use crate::telemetry::source::{GroupReading, SensorProvider};
use crate::telemetry::store::{GroupRow, TelemetryStore};
type Outcome = Result<Vec<Sample>, SensorFault>;
/// How a raw reading becomes one sample per channel.
#[derive(Clone, Debug, PartialEq)]
pub enum Transform {
    Identity,
    /// Divide each raw value by the divisor at the same position.
    Scale(Vec<f64>),
    /// Six cumulative counts in, six disjoint bins out.
    Particulate(NegativeBinPolicy),
}
impl Transform {
    fn check(&self, group: &str, channels: usize) -> Result<(), TelemetryError> {
        let expected = match self {
            Transform::Identity => channels,
            Transform::Scale(divisors) => {
                if divisors.iter().any(|d| !d.is_finite() || *d == 0.0) {
                    return Err(TelemetryError::InvalidScale(group.to_owned()));
                }
                divisors.len()
            }
            Transform::Particulate(_) => BIN_COUNT,
        };
        if expected != channels {
            return Err(TelemetryError::ChannelMismatch {
                group: group.to_owned(),
                expected,
                actual: channels,
            });
        }
        Ok(())
    }
    pub fn apply(&self, reading: GroupReading, channels: usize) -> Outcome {
        match self {
            Transform::Identity => {
                expect_len(&reading, channels)?;
                Ok(reading.values.into_iter().map(finite).collect())
            }
            Transform::Scale(divisors) => {
                expect_len(&reading, channels)?;
                Ok(reading
                    .values
                    .iter()
                    .zip(divisors)
                    .map(|(v, d)| finite(v / d))
                    .collect())
            }
            Transform::Particulate(policy) => {
                let counts = CumulativeCounts::from_slice(&reading.values).ok_or(
                    SensorFault::Shape {
                        expected: BIN_COUNT,
                        actual: reading.len(),
                    },
                )?;
                // All six bins or none.
                if counts.0.iter().any(|c| !c.is_finite()) {
                    return Err(SensorFault::NonFinite);
                }
                Ok(counts.derive_bins(*policy).0.into_iter().map(Some).collect())
            }
        }
    }
}
fn expect_len(reading: &GroupReading, expected: usize) -> Result<(), SensorFault> {
    if reading.len() != expected {
        return Err(SensorFault::Shape {
            expected,
            actual: reading.len(),
        });
    }
    Ok(())
}
fn finite(value: f64) -> Sample {
    value.is_finite().then_some(value)
}
/// One row of the static provider table: which group a provider feeds and
/// how its readings are turned into samples.
pub struct GroupBinding {
    pub group: String,
    pub provider: Box<dyn SensorProvider>,
    pub transform: Transform,
}
impl GroupBinding {
    pub fn new(
        group: impl Into<String>,
        provider: impl SensorProvider + 'static,
        transform: Transform,
    ) -> Self {
        Self {
            group: group.into(),
            provider: Box::new(provider),
            transform,
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Reading,
    Appending,
}
/// Long-lived thread that owns one group's provider and answers read requests.
///
/// At most one request is outstanding. A reply that arrives after its tick
/// gave up is drained and dropped before the next request goes out.
struct GroupReader {
    title: String,
    requests: Option<Sender<()>>,
    replies: Receiver<Outcome>,
    pending: bool,
    worker: Option<JoinHandle<()>>,
}
impl GroupReader {
    fn spawn(
        title: String,
        channels: usize,
        mut provider: Box<dyn SensorProvider>,
        transform: Transform,
    ) -> Result<Self, TelemetryError> {
        let (request_tx, request_rx) = mpsc::channel::<()>();
        let (reply_tx, reply_rx) = mpsc::channel::<Outcome>();
        let worker = thread::Builder::new()
            .name(format!("reader {title}"))
            .spawn(move || {
                for () in request_rx {
                    let reading = panic::catch_unwind(AssertUnwindSafe(|| provider.read()))
                        .unwrap_or(Err(SensorFault::Panicked));
                    let outcome = reading.and_then(|r| transform.apply(r, channels));
                    if reply_tx.send(outcome).is_err() {
                        break;
                    }
                }
            })
            .map_err(TelemetryError::Spawn)?;
        Ok(Self {
            title,
            requests: Some(request_tx),
            replies: reply_rx,
            pending: false,
            worker: Some(worker),
        })
    }
    /// Starts a read, unless the previous one is still inside the provider.
    fn request(&mut self) -> Result<(), SensorFault> {
        if self.pending {
            match self.replies.try_recv() {
                Ok(_) => {
                    self.pending = false;
                    debug!("group `{}`: dropped a late reading", self.title);
                }
                Err(TryRecvError::Empty) => return Err(SensorFault::Busy),
                Err(TryRecvError::Disconnected) => return Err(SensorFault::Panicked),
            }
        }
        let sent = self
            .requests
            .as_ref()
            .map_or(false, |requests| requests.send(()).is_ok());
        if !sent {
            return Err(SensorFault::Panicked);
        }
        self.pending = true;
        Ok(())
    }
    fn collect(&mut self, started: Instant, limit: Duration) -> Outcome {
        let left = (started + limit).saturating_duration_since(Instant::now());
        match self.replies.recv_timeout(left) {
            Ok(outcome) => {
                self.pending = false;
                outcome
            }
            Err(RecvTimeoutError::Timeout) => Err(SensorFault::Timeout {
                elapsed: started.elapsed(),
                limit,
            }),
            Err(RecvTimeoutError::Disconnected) => {
                self.pending = false;
                Err(SensorFault::Panicked)
            }
        }
    }
}
impl Drop for GroupReader {
    fn drop(&mut self) {
        drop(self.requests.take());
        let Some(worker) = self.worker.take() else {
            return;
        };
        if self.pending {
            // Stuck in the provider; the thread exits once the read returns.
            debug!("group `{}`: leaving a blocked read behind", self.title);
        } else if worker.join().is_err() {
            error!("reader thread for `{}` panicked", self.title);
        }
    }
}
/// Reads every provider once per tick and appends the result to the store.
pub struct Sampler {
    store: Arc<TelemetryStore>,
    readers: Vec<GroupReader>,
    read_timeout: Duration,
    state: SamplerState,
}
impl Sampler {
    /// Resolves the binding table against the store's groups and starts one
    /// reader thread per group. Every group needs exactly one binding.
    pub fn new(
        store: Arc<TelemetryStore>,
        bindings: Vec<GroupBinding>,
        read_timeout: Duration,
    ) -> Result<Self, TelemetryError> {
        if read_timeout.is_zero() {
            return Err(TelemetryError::InvalidReadTimeout(0.0));
        }
        let mut slots: Vec<Option<GroupBinding>> = store.specs().iter().map(|_| None).collect();
        for binding in bindings {
            let index = store
                .group_index(&binding.group)
                .ok_or_else(|| TelemetryError::UnknownGroup(binding.group.clone()))?;
            if slots[index].is_some() {
                return Err(TelemetryError::DuplicateBinding(binding.group));
            }
            let channels = store.specs()[index].channels.len();
            binding.transform.check(&binding.group, channels)?;
            slots[index] = Some(binding);
        }
        let mut readers = Vec::with_capacity(slots.len());
        for (slot, spec) in slots.into_iter().zip(store.specs()) {
            let binding = slot.ok_or_else(|| TelemetryError::MissingProvider(spec.title.clone()))?;
            readers.push(GroupReader::spawn(
                binding.group,
                spec.channels.len(),
                binding.provider,
                binding.transform,
            )?);
        }
        Ok(Self {
            store,
            readers,
            read_timeout,
            state: SamplerState::Idle,
        })
    }
    fn enter(&mut self, state: SamplerState) {
        trace!("sampler {:?} -> {:?}", self.state, state);
        self.state = state;
    }
    /// Runs one full tick. Faults are logged and recorded as missing samples;
    /// they never reach the caller.
    pub fn tick(&mut self) -> Tick {
        let at = SystemTime::now();
        self.enter(SamplerState::Reading);
        let outcomes = read_all(&mut self.readers, self.read_timeout);
        self.enter(SamplerState::Appending);
        let mut faults = 0;
        let rows = self
            .readers
            .iter()
            .zip(outcomes)
            .map(|(reader, outcome)| match outcome {
                Ok(samples) => GroupRow::Values(samples),
                Err(fault) => {
                    faults += 1;
                    warn!("group `{}`: {fault}", reader.title);
                    GroupRow::Fault
                }
            })
            .collect();
        let tick = self.store.append_tick(at, rows);
        self.enter(SamplerState::Idle);
        debug!(
            "tick {} appended ({} of {} groups faulted)",
            tick.seq,
            faults,
            self.readers.len()
        );
        tick
    }
    /// Moves the sampler onto its own thread, ticking once immediately and
    /// then every `interval`. Missed deadlines are skipped, not replayed.
    pub fn spawn(mut self, interval: Duration) -> Result<SamplerHandle, TelemetryError> {
        if interval.is_zero() {
            return Err(TelemetryError::InvalidInterval(0.0));
        }
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let worker = thread::Builder::new()
            .name("sampler".into())
            .spawn(move || self.run(interval, stop_rx))
            .map_err(TelemetryError::Spawn)?;
        Ok(SamplerHandle {
            stop: Some(stop_tx),
            worker: Some(worker),
        })
    }
    fn run(&mut self, interval: Duration, stop: Receiver<()>) {
        info!(
            "sampler started: {} groups every {:?}",
            self.readers.len(),
            interval
        );
        let mut deadline = Instant::now();
        loop {
            self.tick();
            deadline += interval;
            let now = Instant::now();
            let mut skipped = 0u32;
            while deadline <= now {
                deadline += interval;
                skipped += 1;
            }
            if skipped > 0 {
                warn!("tick overran its interval, skipping {skipped} deadline(s)");
            }
            match stop.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!("sampler stopped");
    }
}
/// Sends every request first so the reads overlap, then collects the replies
/// against one shared deadline. Returns within `limit` however long a
/// provider blocks.
fn read_all(readers: &mut [GroupReader], limit: Duration) -> Vec<Outcome> {
    let started = Instant::now();
    let requested: Vec<_> = readers.iter_mut().map(GroupReader::request).collect();
    readers
        .iter_mut()
        .zip(requested)
        .map(|(reader, requested)| requested.and_then(|()| reader.collect(started, limit)))
        .collect()
}
/// Owner of a running sampler thread. Dropping it stops the thread.
pub struct SamplerHandle {
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}
impl SamplerHandle {
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }
    fn stop_and_join(&mut self) {
        // Disconnecting the channel wakes the loop.
        drop(self.stop.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("sampler thread panicked");
            }
        }
    }
}
impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
