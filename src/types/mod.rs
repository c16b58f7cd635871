pub mod reading;
pub mod broker_event;
pub mod results;

pub use reading::{Metric, Reading};
pub use broker_event::BrokerEvent;
pub use results::{IngestOutcome, SessionStats};
