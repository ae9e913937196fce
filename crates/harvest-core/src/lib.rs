pub mod archive;
pub mod config;
pub mod error;
pub mod metrics;
pub mod query;
pub mod record;
pub mod site;

pub use archive::ArchiveSink;
pub use error::RecordError;
pub use metrics::Metric;
pub use query::QueryService;
pub use record::{QueryRow, Record, Row};
pub use site::{CapabilityLookup, SiteLookup};
