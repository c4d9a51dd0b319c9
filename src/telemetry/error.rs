use std::time::Duration;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("capacity must be greater than zero")]
    InvalidCapacity,
    #[error("tick interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f64),
    #[error("read timeout must be a positive number of seconds, got {0}")]
    InvalidReadTimeout(f64),
    #[error("channel set is empty")]
    EmptyChannelSet,
    #[error("group `{0}` has no channels")]
    EmptyGroup(String),
    #[error("duplicate group title `{0}`")]
    DuplicateGroup(String),
    #[error("group `{group}` lists channel `{channel}` twice")]
    DuplicateChannel { group: String, channel: String },
    #[error("no group titled `{0}`")]
    UnknownGroup(String),
    #[error("group `{0}` has no sensor provider bound")]
    MissingProvider(String),
    #[error("group `{0}` is bound to more than one provider")]
    DuplicateBinding(String),
    #[error("group `{group}`: transform expects {expected} channels, group has {actual}")]
    ChannelMismatch {
        group: String,
        expected: usize,
        actual: usize,
    },
    #[error("group `{0}`: scale divisors must be finite and non-zero")]
    InvalidScale(String),
    #[error("failed to start sampler thread: {0}")]
    Spawn(std::io::Error),
    #[error("failed to read config: {0}")]
    ConfigIo(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("failed to serialize snapshot: {0}")]
    Export(serde_json::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for TelemetryError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        TelemetryError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for TelemetryError {
    fn from(value: image::ImageError) -> Self {
        TelemetryError::Plot(value.to_string())
    }
}
/// A single failed provider call. Scoped to one group for one tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorFault {
    #[error("driver error: {0}")]
    Driver(String),
    #[error("no reading after {elapsed:?}, limit is {limit:?}")]
    Timeout { elapsed: Duration, limit: Duration },
    #[error("previous read has not returned yet")]
    Busy,
    #[error("reading has {actual} values, expected {expected}")]
    Shape { expected: usize, actual: usize },
    #[error("reading contains a non-finite value")]
    NonFinite,
    #[error("provider panicked during read")]
    Panicked,
}
