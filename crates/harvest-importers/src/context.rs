//! Shared plumbing every concrete importer embeds: archive writes with the
//! import tag and truncation policy applied, flat numeric writes, sentinel
//! labels, and the per-run dedup guard.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use harvest_core::config::ImportConfig;
use harvest_core::{ArchiveSink, Metric, QueryService, Record};

/// Label used in place of dimension values the external source left empty.
/// Empty labels cannot be inserted, so the substitution happens before any
/// merge.
pub const NOT_DEFINED_LABEL: &str = "__not_defined__";

pub fn label_or_not_defined(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => NOT_DEFINED_LABEL,
    }
}

/// Everything an importer needs to talk to the outside world.
#[derive(Clone)]
pub struct ImporterContext {
    pub site_id: String,
    pub query: Arc<dyn QueryService>,
    pub sink: Arc<dyn ArchiveSink>,
    pub config: ImportConfig,
}

impl ImporterContext {
    pub fn new(
        site_id: impl Into<String>,
        query: Arc<dyn QueryService>,
        sink: Arc<dyn ArchiveSink>,
        config: ImportConfig,
    ) -> Self {
        Self {
            site_id: site_id.into(),
            query,
            sink,
            config,
        }
    }

    /// Tag, serialize, and write a finished hierarchical record.
    pub async fn insert_record(
        &self,
        name: &str,
        record: &mut Record,
        max_rows: Option<usize>,
        max_subtable_rows: Option<usize>,
        sort_column: Metric,
    ) -> anyhow::Result<()> {
        record.mark_imported();
        let blob = record.serialize_with_truncation(max_rows, max_subtable_rows, sort_column)?;
        self.sink.insert_hierarchical_record(name, blob).await
    }

    /// Write one flat numeric record per metric, named by its readable
    /// column name.
    pub async fn insert_numeric_records(
        &self,
        values: &BTreeMap<Metric, f64>,
    ) -> anyhow::Result<()> {
        for (metric, value) in values {
            self.sink
                .insert_flat_record(metric.readable_name(), *value)
                .await?;
        }
        Ok(())
    }
}

/// Per-invocation guard against duplicate side-annotations. Several queries
/// with different metric sets return overlapping label sets; an annotation
/// keyed by (label, scope, slot) must be recorded only on first sighting.
///
/// Owned by exactly one importer invocation and discarded with it.
#[derive(Debug, Default)]
pub struct DedupGuard {
    seen: HashSet<(String, String, usize)>,
}

impl DedupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// True exactly once per (label, scope, slot) key.
    pub fn first_sighting(&mut self, label: &str, scope: &str, slot: usize) -> bool {
        self.seen
            .insert((label.to_string(), scope.to_string(), slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_replaces_empty_and_missing_values() {
        assert_eq!(label_or_not_defined(Some("theme")), "theme");
        assert_eq!(label_or_not_defined(Some("")), NOT_DEFINED_LABEL);
        assert_eq!(label_or_not_defined(None), NOT_DEFINED_LABEL);
    }

    #[test]
    fn guard_reports_only_the_first_sighting() {
        let mut guard = DedupGuard::new();
        assert!(guard.first_sighting("theme", "visit", 1));
        assert!(!guard.first_sighting("theme", "visit", 1));
        // Same label under a different scope or slot is a distinct key.
        assert!(guard.first_sighting("theme", "page", 1));
        assert!(guard.first_sighting("theme", "visit", 2));
    }
}
