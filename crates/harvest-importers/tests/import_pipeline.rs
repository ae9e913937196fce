use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use harvest_core::config::ImportConfig;
use harvest_core::{ArchiveSink, Metric, QueryRow, QueryService, SiteLookup};
use harvest_importers::importers::{
    custom_variables, user_language, CustomVariablesImporter, UserLanguageImporter,
    VisitsSummaryImporter,
};
use harvest_importers::{ImportRunner, ImporterContext, RecordImporter, NOT_DEFINED_LABEL};

fn dimensions_key(dimensions: &[&str]) -> String {
    dimensions.join(",")
}

#[derive(Default)]
struct FakeQueryService {
    responses: HashMap<String, Vec<QueryRow>>,
    fail_on: Option<String>,
}

impl FakeQueryService {
    fn respond(&mut self, dimensions: &[&str], rows: Vec<QueryRow>) {
        self.responses.insert(dimensions_key(dimensions), rows);
    }

    fn fail_on(&mut self, dimensions: &[&str]) {
        self.fail_on = Some(dimensions_key(dimensions));
    }
}

#[async_trait]
impl QueryService for FakeQueryService {
    async fn query(
        &self,
        _day: NaiveDate,
        dimensions: &[&str],
        metrics: &[Metric],
    ) -> anyhow::Result<Vec<QueryRow>> {
        let key = dimensions_key(dimensions);
        if self.fail_on.as_deref() == Some(key.as_str()) {
            anyhow::bail!("query service unavailable");
        }
        let rows = self.responses.get(&key).cloned().unwrap_or_default();
        // Like the real service, only requested metrics come back.
        Ok(rows
            .into_iter()
            .map(|mut row| {
                row.columns.retain(|metric, _| metrics.contains(metric));
                row
            })
            .collect())
    }
}

#[derive(Default)]
struct RecordingSink {
    blobs: Mutex<Vec<(String, String)>>,
    numerics: Mutex<Vec<(String, f64)>>,
}

#[async_trait]
impl ArchiveSink for RecordingSink {
    async fn insert_hierarchical_record(&self, name: &str, blob: String) -> anyhow::Result<()> {
        self.blobs
            .lock()
            .expect("lock")
            .push((name.to_string(), blob));
        Ok(())
    }

    async fn insert_flat_record(&self, name: &str, value: f64) -> anyhow::Result<()> {
        self.numerics
            .lock()
            .expect("lock")
            .push((name.to_string(), value));
        Ok(())
    }
}

struct FakeSiteLookup {
    ecommerce: bool,
}

#[async_trait]
impl SiteLookup for FakeSiteLookup {
    async fn site_urls(&self, _site_id: &str) -> anyhow::Result<Vec<String>> {
        Ok(vec!["http://example.com".to_string()])
    }

    async fn is_ecommerce_enabled(&self, _site_id: &str) -> anyhow::Result<bool> {
        Ok(self.ecommerce)
    }
}

fn query_row(dimensions: &[(&str, &str)], columns: &[(Metric, f64)]) -> QueryRow {
    let mut row = QueryRow::new();
    for (name, value) in dimensions {
        row.set_metadata(*name, *value);
    }
    for (metric, value) in columns {
        row.set_column(*metric, *value);
    }
    row
}

fn context(query: FakeQueryService, sink: Arc<RecordingSink>, config: ImportConfig) -> ImporterContext {
    ImporterContext::new("site_1", Arc::new(query), sink, config)
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 14).expect("valid date")
}

fn parse(blob: &str) -> serde_json::Value {
    serde_json::from_str(blob).expect("blob is valid json")
}

#[tokio::test]
async fn custom_variables_merges_scoped_queries_into_one_record() {
    let mut query = FakeQueryService::default();
    query.respond(
        &["custom_var_key1", "custom_var_value1"],
        vec![query_row(
            &[("custom_var_key1", "theme"), ("custom_var_value1", "dark")],
            &[
                (Metric::Visits, 5.0),
                (Metric::UniqueVisitors, 3.0),
                (Metric::Hits, 9.0),
                (Metric::Goals, 2.0),
            ],
        )],
    );

    let config = ImportConfig {
        custom_variable_slots: 1,
        ..ImportConfig::default()
    };
    let sink = Arc::new(RecordingSink::default());
    let importer = CustomVariablesImporter::new(
        context(query, sink.clone(), config),
        Arc::new(FakeSiteLookup { ecommerce: false }),
    );

    importer.import_records(day()).await.expect("import");

    let blobs = sink.blobs.lock().expect("lock");
    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs[0].0, custom_variables::RECORD_NAME);

    let record = parse(&blobs[0].1);
    assert_eq!(
        record["metadata"]["imported_from_external_source"],
        serde_json::json!(true)
    );

    let top = &record["rows"][0];
    assert_eq!(top["label"], "theme");
    // Visits arrive from both the visit-scoped and the page-scoped query.
    assert_eq!(top["columns"]["nb_visits"], serde_json::json!(10.0));
    assert_eq!(top["columns"]["nb_hits"], serde_json::json!(9.0));
    assert_eq!(top["columns"]["goals"], serde_json::json!(2.0));

    let value_row = &top["subtable"]["rows"][0];
    assert_eq!(value_row["label"], "dark");
    assert_eq!(value_row["columns"]["nb_visits"], serde_json::json!(10.0));
}

#[tokio::test]
async fn empty_custom_variable_values_become_the_sentinel_label() {
    let mut query = FakeQueryService::default();
    query.respond(
        &["custom_var_key1", "custom_var_value1"],
        vec![query_row(
            &[("custom_var_key1", "plan"), ("custom_var_value1", "")],
            &[(Metric::Visits, 4.0)],
        )],
    );

    let config = ImportConfig {
        custom_variable_slots: 1,
        ..ImportConfig::default()
    };
    let sink = Arc::new(RecordingSink::default());
    let importer = CustomVariablesImporter::new(
        context(query, sink.clone(), config),
        Arc::new(FakeSiteLookup { ecommerce: false }),
    );

    importer.import_records(day()).await.expect("import");

    let blobs = sink.blobs.lock().expect("lock");
    let record = parse(&blobs[0].1);
    assert_eq!(
        record["rows"][0]["subtable"]["rows"][0]["label"],
        NOT_DEFINED_LABEL
    );
}

#[tokio::test]
async fn product_dimensions_only_import_for_ecommerce_sites() {
    let product_rows = |sku: &str| {
        vec![query_row(
            &[("product_sku", sku)],
            &[(Metric::ItemRevenue, 99.0), (Metric::Visits, 2.0)],
        )]
    };

    for ecommerce in [false, true] {
        let mut query = FakeQueryService::default();
        query.respond(&["product_sku"], product_rows("SKU-1"));

        let config = ImportConfig {
            custom_variable_slots: 0,
            ..ImportConfig::default()
        };
        let sink = Arc::new(RecordingSink::default());
        let importer = CustomVariablesImporter::new(
            context(query, sink.clone(), config),
            Arc::new(FakeSiteLookup { ecommerce }),
        );

        importer.import_records(day()).await.expect("import");

        let blobs = sink.blobs.lock().expect("lock");
        let blob = &blobs[0].1;
        assert_eq!(
            blob.contains("_pks"),
            ecommerce,
            "product rows present iff the site sells (ecommerce = {ecommerce})"
        );
    }
}

#[tokio::test]
async fn custom_variables_truncates_to_the_configured_maximum() {
    let mut query = FakeQueryService::default();
    query.respond(
        &["custom_var_key1", "custom_var_value1"],
        vec![
            query_row(
                &[("custom_var_key1", "rare"), ("custom_var_value1", "x")],
                &[(Metric::Visits, 1.0)],
            ),
            query_row(
                &[("custom_var_key1", "common"), ("custom_var_value1", "y")],
                &[(Metric::Visits, 50.0)],
            ),
        ],
    );

    let config = ImportConfig {
        custom_variable_slots: 1,
        custom_vars_max_rows: 1,
        ..ImportConfig::default()
    };
    let sink = Arc::new(RecordingSink::default());
    let importer = CustomVariablesImporter::new(
        context(query, sink.clone(), config),
        Arc::new(FakeSiteLookup { ecommerce: false }),
    );

    importer.import_records(day()).await.expect("import");

    let blobs = sink.blobs.lock().expect("lock");
    assert!(blobs[0].1.contains("common"));
    assert!(!blobs[0].1.contains("rare"));
}

#[tokio::test]
async fn importing_the_same_day_twice_is_idempotent() {
    let mut query = FakeQueryService::default();
    query.respond(
        &["custom_var_key1", "custom_var_value1"],
        vec![query_row(
            &[("custom_var_key1", "theme"), ("custom_var_value1", "dark")],
            &[(Metric::Visits, 5.0)],
        )],
    );

    let config = ImportConfig {
        custom_variable_slots: 1,
        ..ImportConfig::default()
    };
    let sink = Arc::new(RecordingSink::default());
    let importer = CustomVariablesImporter::new(
        context(query, sink.clone(), config),
        Arc::new(FakeSiteLookup { ecommerce: false }),
    );

    importer.import_records(day()).await.expect("first run");
    importer.import_records(day()).await.expect("second run");

    let blobs = sink.blobs.lock().expect("lock");
    assert_eq!(blobs.len(), 2);
    assert_eq!(blobs[0].1, blobs[1].1, "re-import must produce an identical record");
}

#[tokio::test]
async fn visits_summary_writes_flat_numeric_records() {
    let mut query = FakeQueryService::default();
    query.respond(
        &[],
        vec![query_row(
            &[],
            &[
                (Metric::Visits, 120.0),
                (Metric::Actions, 340.0),
                (Metric::UniqueVisitors, 80.0),
            ],
        )],
    );

    let sink = Arc::new(RecordingSink::default());
    let importer =
        VisitsSummaryImporter::new(context(query, sink.clone(), ImportConfig::default()));

    importer.import_records(day()).await.expect("import");

    let numerics = sink.numerics.lock().expect("lock");
    assert!(numerics.contains(&("nb_visits".to_string(), 120.0)));
    assert!(numerics.contains(&("nb_actions".to_string(), 340.0)));
    assert!(numerics.contains(&("nb_uniq_visitors".to_string(), 80.0)));
    assert!(sink.blobs.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn visits_summary_writes_nothing_for_an_untracked_day() {
    let query = FakeQueryService::default();
    let sink = Arc::new(RecordingSink::default());
    let importer =
        VisitsSummaryImporter::new(context(query, sink.clone(), ImportConfig::default()));

    importer.import_records(day()).await.expect("import");

    assert!(sink.numerics.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn user_language_labels_rows_by_language_with_sentinel() {
    let mut query = FakeQueryService::default();
    query.respond(
        &["language"],
        vec![
            query_row(&[("language", "pl")], &[(Metric::Visits, 7.0)]),
            query_row(&[("language", "")], &[(Metric::Visits, 2.0)]),
        ],
    );

    let sink = Arc::new(RecordingSink::default());
    let importer =
        UserLanguageImporter::new(context(query, sink.clone(), ImportConfig::default()));

    importer.import_records(day()).await.expect("import");

    let blobs = sink.blobs.lock().expect("lock");
    assert_eq!(blobs[0].0, user_language::RECORD_NAME);
    let record = parse(&blobs[0].1);
    let labels: Vec<&str> = record["rows"]
        .as_array()
        .expect("rows")
        .iter()
        .filter_map(|row| row["label"].as_str())
        .collect();
    assert_eq!(labels, vec!["pl", NOT_DEFINED_LABEL]);
}

#[tokio::test]
async fn a_failing_importer_does_not_abort_its_siblings() {
    let mut query = FakeQueryService::default();
    // Visits summary queries with no dimensions; make exactly that call fail.
    query.fail_on(&[]);
    query.respond(
        &["language"],
        vec![query_row(&[("language", "en")], &[(Metric::Visits, 3.0)])],
    );

    let sink = Arc::new(RecordingSink::default());
    let ctx = context(query, sink.clone(), ImportConfig::default());

    let mut runner = ImportRunner::new("site_1");
    runner.register(Box::new(VisitsSummaryImporter::new(ctx.clone())));
    runner.register(Box::new(UserLanguageImporter::new(ctx)));

    let outcome = runner.import_day(day()).await;

    assert!(!outcome.is_success());
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].importer, "VisitsSummary");
    assert_eq!(outcome.completed, vec!["UserLanguage"]);

    // The sibling's record still reached the archive.
    let blobs = sink.blobs.lock().expect("lock");
    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs[0].0, user_language::RECORD_NAME);
}
