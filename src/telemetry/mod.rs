pub mod decoder;
pub mod policy;
pub mod series;
pub mod state;
pub mod ingest;

pub use decoder::{DecodeError, DecodedMessage, TelemetryDecoder};
pub use policy::{policy_from_config, AcceptAll, AcceptancePolicy, HeartRateCeiling, RangePolicy, ValueRange};
pub use series::{MetricSeries, DEFAULT_HISTORY_CAPACITY};
pub use state::TelemetryState;
pub use ingest::TelemetryIngestor;
