pub mod config;
pub mod display;
pub mod logger;
pub mod mqtt;
pub mod session;
pub mod telemetry;
pub mod types;
pub mod utils;

pub use config::AppConfig;
pub use display::{project, Dashboard, MetricPanel};
pub use session::Session;
pub use telemetry::{AcceptancePolicy, MetricSeries, TelemetryIngestor, TelemetryState};
pub use types::{BrokerEvent, IngestOutcome, Metric, Reading, SessionStats};
