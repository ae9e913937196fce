//! Day totals for the whole site, written as flat numeric records. Runs
//! before every other importer: their reports only break down what this one
//! establishes as the day's totals.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use harvest_core::metrics::visit_metrics;
use harvest_core::Metric;
use tracing::debug;

use crate::context::ImporterContext;
use crate::RecordImporter;

pub struct VisitsSummaryImporter {
    ctx: ImporterContext,
}

impl VisitsSummaryImporter {
    pub fn new(ctx: ImporterContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RecordImporter for VisitsSummaryImporter {
    fn name(&self) -> &'static str {
        "VisitsSummary"
    }

    async fn import_records(&self, day: NaiveDate) -> anyhow::Result<()> {
        let rows = self.ctx.query.query(day, &[], &visit_metrics()).await?;

        if rows.is_empty() {
            debug!(site = %self.ctx.site_id, %day, "no visits tracked, nothing to write");
            return Ok(());
        }

        let mut totals: BTreeMap<Metric, f64> = BTreeMap::new();
        for row in &rows {
            for (metric, value) in &row.columns {
                *totals.entry(*metric).or_insert(0.0) += value;
            }
        }

        self.ctx.insert_numeric_records(&totals).await
    }
}
