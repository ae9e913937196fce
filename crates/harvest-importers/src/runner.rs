//! Fixed-order execution of the configured importers for one day.

use chrono::NaiveDate;
use tracing::{debug, error, info};

use crate::RecordImporter;

pub struct ImporterFailure {
    pub importer: &'static str,
    pub error: anyhow::Error,
}

/// What happened to one day. A day with any failure is not successfully
/// imported — the caller keeps it eligible for a later retry. Records
/// already written by earlier importers stand.
#[derive(Default)]
pub struct DayImportOutcome {
    pub completed: Vec<&'static str>,
    pub failures: Vec<ImporterFailure>,
}

impl DayImportOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs importers strictly sequentially in registration order. Order
/// matters: the visits summary importer registers first because later
/// importers assume its day totals already exist.
pub struct ImportRunner {
    site_id: String,
    importers: Vec<Box<dyn RecordImporter>>,
}

impl ImportRunner {
    pub fn new(site_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            importers: Vec::new(),
        }
    }

    pub fn register(&mut self, importer: Box<dyn RecordImporter>) {
        self.importers.push(importer);
    }

    pub async fn import_day(&self, day: NaiveDate) -> DayImportOutcome {
        info!(site = %self.site_id, %day, importers = self.importers.len(), "importing day");

        let mut outcome = DayImportOutcome::default();
        for importer in &self.importers {
            match importer.import_records(day).await {
                Ok(()) => {
                    debug!(site = %self.site_id, %day, importer = importer.name(), "importer finished");
                    outcome.completed.push(importer.name());
                }
                Err(err) => {
                    error!(
                        site = %self.site_id,
                        %day,
                        importer = importer.name(),
                        error = %err,
                        "importer failed, continuing with siblings; day stays eligible for retry"
                    );
                    outcome.failures.push(ImporterFailure {
                        importer: importer.name(),
                        error: err,
                    });
                }
            }
        }
        outcome
    }
}
