//! Per-report importers: each one turns a day of external query results into
//! finished archive records. Importers run strictly sequentially; a failing
//! importer never takes its siblings down with it.

use async_trait::async_trait;
use chrono::NaiveDate;

pub mod context;
pub mod importers;
pub mod runner;

pub use context::{label_or_not_defined, DedupGuard, ImporterContext, NOT_DEFINED_LABEL};
pub use runner::{DayImportOutcome, ImportRunner, ImporterFailure};

/// One target report category's importer.
///
/// `import_records` is the only entry point. It must be idempotent: invoked
/// twice for the same day against the same external data it produces an
/// identical finished record. Implementations decide their own fan-out — how
/// many queries, which metric sets, and how results map onto labels and
/// subtables.
#[async_trait]
pub trait RecordImporter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn import_records(&self, day: NaiveDate) -> anyhow::Result<()>;
}
