//! Archive sink abstraction.

use async_trait::async_trait;

/// Persistent storage for finished per-day records. Two independent write
/// paths: serialized hierarchical tables and flat per-day numbers.
///
/// The sink serializes writes per (site, day, record name) but does not
/// deduplicate overlapping writes, so importers must not run concurrently
/// for the same day.
#[async_trait]
pub trait ArchiveSink: Send + Sync + 'static {
    async fn insert_hierarchical_record(&self, name: &str, blob: String) -> anyhow::Result<()>;

    async fn insert_flat_record(&self, name: &str, value: f64) -> anyhow::Result<()>;
}
