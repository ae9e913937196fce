//! Visits broken down by browser language. The simplest importer shape: one
//! dimension, one query, one flat table.

use async_trait::async_trait;
use chrono::NaiveDate;
use harvest_core::metrics::visit_metrics;
use harvest_core::{Metric, Record};

use crate::context::{label_or_not_defined, ImporterContext};
use crate::RecordImporter;

pub const RECORD_NAME: &str = "UserLanguage_language";

const LANGUAGE_DIMENSION: &str = "language";

pub struct UserLanguageImporter {
    ctx: ImporterContext,
}

impl UserLanguageImporter {
    pub fn new(ctx: ImporterContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl RecordImporter for UserLanguageImporter {
    fn name(&self) -> &'static str {
        "UserLanguage"
    }

    async fn import_records(&self, day: NaiveDate) -> anyhow::Result<()> {
        let rows = self
            .ctx
            .query
            .query(day, &[LANGUAGE_DIMENSION], &visit_metrics())
            .await?;

        let mut record = Record::new();
        for row in &rows {
            let label = label_or_not_defined(row.dimension(LANGUAGE_DIMENSION));
            record.insert_or_merge(row, label)?;
        }

        let max_rows = Some(self.ctx.config.standard_max_rows);
        self.ctx
            .insert_record(RECORD_NAME, &mut record, max_rows, max_rows, Metric::Visits)
            .await
    }
}
