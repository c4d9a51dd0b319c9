// src/telemetry/mod.rs
pub mod buffer;
pub mod error;
pub mod group;
pub mod particulate;
pub mod plot;
pub mod range;
pub mod sampler;
pub mod snapshot;
pub mod source;
pub mod store;
pub use error::{SensorFault, TelemetryError};
pub use group::GroupSpec;
pub use particulate::NegativeBinPolicy;
pub use plot::{render_group_png, PlotStyle};
pub use sampler::{GroupBinding, Sampler, Transform};
pub use snapshot::GroupSnapshot;
pub use source::{GroupReading, SensorProvider};
pub use store::{ResetController, TelemetryStore};
