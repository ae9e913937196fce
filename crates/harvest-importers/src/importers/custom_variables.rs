//! Custom variables, the widest fan-out of the importers. Each variable slot
//! is queried once per metric scope (visit, page, conversion) against the
//! same key/value dimension pair, and every result folds into a single
//! two-level record: key at the top, values underneath. Site search
//! categories and product dimensions land in the same record under their
//! reserved keys.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use harvest_core::metrics::{action_metrics, ecommerce_metrics, visit_metrics};
use harvest_core::{Metric, QueryRow, Record, SiteLookup};
use serde_json::{json, Value};
use tracing::debug;

use crate::context::{label_or_not_defined, DedupGuard, ImporterContext};
use crate::RecordImporter;

pub const RECORD_NAME: &str = "CustomVariables_valueByName";

/// Reserved key the site-search category breakdown is filed under.
const SEARCH_CATEGORY_KEY: &str = "_pk_scat";

/// Product dimension → reserved custom-variable key.
const PRODUCT_DIMENSIONS: &[(&str, &str)] = &[
    ("product_sku", "_pks"),
    ("product_name", "_pkn"),
    ("product_category", "_pkc"),
];

#[derive(Debug, Clone, Copy)]
enum VarScope {
    Visit,
    Page,
    Conversion,
}

impl VarScope {
    fn as_str(self) -> &'static str {
        match self {
            VarScope::Visit => "visit",
            VarScope::Page => "page",
            VarScope::Conversion => "conversion",
        }
    }
}

pub struct CustomVariablesImporter {
    ctx: ImporterContext,
    sites: Arc<dyn SiteLookup>,
}

impl CustomVariablesImporter {
    pub fn new(ctx: ImporterContext, sites: Arc<dyn SiteLookup>) -> Self {
        Self { ctx, sites }
    }

    async fn query_custom_variable_slot(
        &self,
        slot: usize,
        day: NaiveDate,
        record: &mut Record,
        guard: &mut DedupGuard,
    ) -> anyhow::Result<()> {
        let key_dimension = format!("custom_var_key{slot}");
        let value_dimension = format!("custom_var_value{slot}");

        let scoped_queries = [
            (VarScope::Visit, visit_metrics()),
            (VarScope::Page, action_metrics()),
            (VarScope::Conversion, vec![Metric::Goals]),
        ];

        for (scope, metrics) in scoped_queries {
            let rows = self
                .ctx
                .query
                .query(day, &[key_dimension.as_str(), value_dimension.as_str()], &metrics)
                .await?;
            merge_slot_rows(record, rows, scope, slot, &key_dimension, &value_dimension, guard)?;
        }
        Ok(())
    }

    async fn query_site_search_categories(
        &self,
        day: NaiveDate,
        record: &mut Record,
    ) -> anyhow::Result<()> {
        let rows = self
            .ctx
            .query
            .query(day, &["search_category"], &action_metrics())
            .await?;

        for row in &rows {
            let category = label_or_not_defined(row.dimension("search_category")).to_string();
            let top = record.insert_or_merge(row, SEARCH_CATEGORY_KEY)?;
            top.insert_or_merge_subtable(row, &category)?;
        }
        Ok(())
    }

    async fn query_ecommerce(&self, day: NaiveDate, record: &mut Record) -> anyhow::Result<()> {
        for &(dimension, record_key) in PRODUCT_DIMENSIONS {
            let rows = self
                .ctx
                .query
                .query(day, &[dimension], &ecommerce_metrics())
                .await?;

            for row in &rows {
                let value = label_or_not_defined(row.dimension(dimension)).to_string();
                let top = record.insert_or_merge(row, record_key)?;
                top.insert_or_merge_subtable(row, &value)?;
            }
        }
        Ok(())
    }
}

fn merge_slot_rows(
    record: &mut Record,
    rows: Vec<QueryRow>,
    scope: VarScope,
    slot: usize,
    key_dimension: &str,
    value_dimension: &str,
    guard: &mut DedupGuard,
) -> anyhow::Result<()> {
    for mut row in rows {
        let key = label_or_not_defined(row.dimension(key_dimension)).to_string();
        let value = label_or_not_defined(row.dimension(value_dimension)).to_string();

        annotate_slot(&mut row, &key, scope, slot, guard);

        let top = record.insert_or_merge(&row, &key)?;
        top.insert_or_merge_subtable(&row, &value)?;
    }
    Ok(())
}

/// Note which slot a key occupies under which scope, once per import run.
/// The same key shows up in every scoped query for its slot; without the
/// guard the annotation would repeat per metric set.
fn annotate_slot(
    row: &mut QueryRow,
    label: &str,
    scope: VarScope,
    slot: usize,
    guard: &mut DedupGuard,
) {
    if !guard.first_sighting(label, scope.as_str(), slot) {
        return;
    }

    let slots = row
        .metadata
        .entry("slots".to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(entries) = slots {
        entries.push(json!({ "scope": scope.as_str(), "index": slot }));
    }
}

#[async_trait]
impl RecordImporter for CustomVariablesImporter {
    fn name(&self) -> &'static str {
        "CustomVariables"
    }

    async fn import_records(&self, day: NaiveDate) -> anyhow::Result<()> {
        let ecommerce = self.sites.is_ecommerce_enabled(&self.ctx.site_id).await?;

        // Fresh per invocation; side-annotations must not leak across runs.
        let mut guard = DedupGuard::new();
        let mut record = Record::new();

        for slot in 1..=self.ctx.config.custom_variable_slots {
            self.query_custom_variable_slot(slot, day, &mut record, &mut guard)
                .await?;
        }

        self.query_site_search_categories(day, &mut record).await?;

        if ecommerce {
            self.query_ecommerce(day, &mut record).await?;
        } else {
            debug!(site = %self.ctx.site_id, %day, "ecommerce disabled, skipping product dimensions");
        }

        let (max_rows, max_subtable_rows) = self.ctx.config.custom_variable_maximums(ecommerce);
        self.ctx
            .insert_record(
                RECORD_NAME,
                &mut record,
                Some(max_rows),
                Some(max_subtable_rows),
                Metric::Visits,
            )
            .await
    }
}
