//! Hierarchical labeled record tables and the insert-or-merge primitives
//! every importer folds query results through.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;

use crate::error::RecordError;
use crate::metrics::Metric;

/// Metadata flag set on every finished top-level record before it is handed
/// to the archive sink. The host uses it to visually distinguish imported
/// reports from natively tracked ones.
pub const IMPORTED_FROM_EXTERNAL_SOURCE: &str = "imported_from_external_source";

/// One row of an external query result. Transient: consumed during the merge
/// and never stored. Dimension values arrive as metadata, metrics as columns;
/// only the columns survive a merge into a [`Record`].
#[derive(Debug, Clone, Default)]
pub struct QueryRow {
    pub metadata: HashMap<String, Value>,
    pub columns: BTreeMap<Metric, f64>,
}

impl QueryRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimension value as a string, if the service returned one.
    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.metadata.get(name).and_then(Value::as_str)
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    pub fn set_column(&mut self, metric: Metric, value: f64) {
        self.columns.insert(metric, value);
    }
}

/// A row of an aggregated record: a label, summed metric columns, and an
/// optional nested breakdown table owned exclusively by this row.
#[derive(Debug, Clone)]
pub struct Row {
    label: String,
    columns: BTreeMap<Metric, f64>,
    subtable: Option<Box<Record>>,
}

impl Row {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn column(&self, metric: Metric) -> Option<f64> {
        self.columns.get(&metric).copied()
    }

    pub fn columns(&self) -> &BTreeMap<Metric, f64> {
        &self.columns
    }

    pub fn subtable(&self) -> Option<&Record> {
        self.subtable.as_deref()
    }

    /// Merge `source` into this row's subtable under `label`, creating the
    /// subtable on first use. Creation is idempotent: a second call reuses
    /// the existing table.
    pub fn insert_or_merge_subtable(
        &mut self,
        source: &QueryRow,
        label: &str,
    ) -> Result<&mut Row, RecordError> {
        let subtable = self.subtable.get_or_insert_with(|| Box::new(Record::new()));
        subtable.insert_or_merge(source, label)
    }

    fn sum_columns(&mut self, columns: &BTreeMap<Metric, f64>) {
        for (metric, value) in columns {
            *self.columns.entry(*metric).or_insert(0.0) += value;
        }
    }
}

/// A hierarchical labeled table of aggregated metrics. Lookup is by label;
/// labels are unique within one table. Insertion order is retained so that
/// truncation ties break deterministically.
#[derive(Debug, Clone, Default)]
pub struct Record {
    rows: Vec<Row>,
    index: HashMap<String, usize>,
    metadata: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    pub fn row(&self, label: &str) -> Option<&Row> {
        self.index.get(label).map(|&pos| &self.rows[pos])
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Tag this record as imported from the external source. Always called
    /// before a finished top-level record reaches the sink.
    pub fn mark_imported(&mut self) {
        self.set_metadata(IMPORTED_FROM_EXTERNAL_SOURCE, true);
    }

    /// Insert `source`'s metric columns under `label`, or sum them into the
    /// row already holding that label. Addition is the only merge operator.
    /// Query-time metadata is never copied onto the merged row.
    ///
    /// An empty label is a broken importer, not bad external data, and fails
    /// with [`RecordError::EmptyLabel`].
    pub fn insert_or_merge(
        &mut self,
        source: &QueryRow,
        label: &str,
    ) -> Result<&mut Row, RecordError> {
        if label.is_empty() {
            return Err(RecordError::EmptyLabel);
        }

        if let Some(&pos) = self.index.get(label) {
            let row = &mut self.rows[pos];
            row.sum_columns(&source.columns);
            return Ok(row);
        }

        let pos = self.rows.len();
        self.rows.push(Row {
            label: label.to_string(),
            columns: source.columns.clone(),
            subtable: None,
        });
        self.index.insert(label.to_string(), pos);
        Ok(&mut self.rows[pos])
    }

    /// Serialize to the archive blob format: rows stably sorted by
    /// `sort_column` descending, then truncated to `max_rows` at the top
    /// level and `max_subtable_rows` at every nested level. `None` disables
    /// truncation at that level. Repeated calls on identical input produce
    /// byte-identical output.
    pub fn serialize_with_truncation(
        &self,
        max_rows: Option<usize>,
        max_subtable_rows: Option<usize>,
        sort_column: Metric,
    ) -> Result<String, RecordError> {
        let view = blob_view(self, max_rows, max_subtable_rows, sort_column);
        Ok(serde_json::to_string(&view)?)
    }
}

#[derive(Serialize)]
struct RecordBlob<'a> {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    metadata: &'a BTreeMap<String, Value>,
    rows: Vec<RowBlob<'a>>,
}

#[derive(Serialize)]
struct RowBlob<'a> {
    label: &'a str,
    columns: &'a BTreeMap<Metric, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtable: Option<RecordBlob<'a>>,
}

fn blob_view<'a>(
    record: &'a Record,
    max_rows: Option<usize>,
    max_subtable_rows: Option<usize>,
    sort_column: Metric,
) -> RecordBlob<'a> {
    let mut ordered: Vec<&'a Row> = record.rows.iter().collect();
    // Stable sort: rows with equal sort keys keep their insertion order.
    ordered.sort_by(|a, b| {
        let left = a.column(sort_column).unwrap_or(0.0);
        let right = b.column(sort_column).unwrap_or(0.0);
        right.partial_cmp(&left).unwrap_or(Ordering::Equal)
    });
    if let Some(limit) = max_rows {
        ordered.truncate(limit);
    }

    RecordBlob {
        metadata: &record.metadata,
        rows: ordered
            .into_iter()
            .map(|row| RowBlob {
                label: &row.label,
                columns: &row.columns,
                subtable: row
                    .subtable
                    .as_deref()
                    .map(|sub| blob_view(sub, max_subtable_rows, max_subtable_rows, sort_column)),
            })
            .collect(),
    }
}
