//! Integration tests for the ora-etl library
//!
//! Tests cover:
//! - Batching and per-batch progress accounting
//! - Missing files, skipped rows and failed batches (best-effort loading)
//! - Full three-source runs
//! - Index catalogue creation with partial failure
//! - Interactive cleanup (confirm, cancel, --yes, end of input)

mod helpers;

use bson::{doc, Bson};
use helpers::{write_csv, FakeStore};
use ora_common::db::RecordStore;
use ora_common::SourceId;
use ora_etl::cleanup::{run_cleanup, CleanupOutcome};
use ora_etl::indexes::{ensure_indexes, index_catalogue};
use ora_etl::Loader;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;

const RETAIL_HEADER: &str =
    "InvoiceNo,StockCode,Description,Quantity,InvoiceDate,UnitPrice,CustomerID,Country\n";

fn retail_rows(n: usize) -> String {
    let mut csv = String::from(RETAIL_HEADER);
    for i in 0..n {
        csv.push_str(&format!(
            "5363{:02},85123A,WHITE HANGING HEART,6,12/1/2010 8:26,2.55,17850.0,United Kingdom\n",
            i
        ));
    }
    csv
}

fn loader_for(store: &Arc<FakeStore>, batch_size: usize) -> Loader {
    let handle: Arc<dyn RecordStore> = store.clone();
    Loader::new(handle, batch_size)
}

// =============================================================================
// Loader
// =============================================================================

#[tokio::test]
async fn test_batches_flush_at_batch_size() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(dir.path(), "online_retail.csv", &retail_rows(7));
    let store = Arc::new(FakeStore::new());

    let report = loader_for(&store, 3).load_source(SourceId::Source1, &path).await;

    assert!(report.file_found);
    assert_eq!(report.rows_read, 7);
    assert_eq!(report.inserted, 7);
    assert_eq!(report.batches, 3);
    assert_eq!(store.batch_sizes(), vec![3, 3, 1]);
}

#[tokio::test]
async fn test_source1_document_shape() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(dir.path(), "online_retail.csv", &retail_rows(1));
    let store = Arc::new(FakeStore::new());

    loader_for(&store, 10).load_source(SourceId::Source1, &path).await;

    let docs = store.documents();
    assert_eq!(docs.len(), 1);
    let d = &docs[0];
    assert_eq!(d.get_i32("schemaVersion").unwrap(), 1);

    let source = d.get_document("source").unwrap();
    assert_eq!(source.get_str("sourceId").unwrap(), "source1");
    assert_eq!(source.get_str("name").unwrap(), "kaggle_csv");
    assert_eq!(source.get_str("externalId").unwrap(), "536300");

    let entity = d.get_document("entity").unwrap();
    assert_eq!(entity.get_str("id").unwrap(), "17850");
    assert_eq!(entity.get_str("type").unwrap(), "customer");

    let metrics = d.get_document("metrics").unwrap();
    assert_eq!(metrics.get("count"), Some(&Bson::Int64(6)));
    let amount = metrics.get_f64("amount").unwrap();
    assert!((amount - 15.3).abs() < 1e-9);

    assert!(matches!(d.get("eventTime"), Some(Bson::DateTime(_))));
    assert!(matches!(d.get("ingestedAt"), Some(Bson::DateTime(_))));
    assert_eq!(
        d.get_document("metadata").unwrap().get_str("country").unwrap(),
        "United Kingdom"
    );
}

#[tokio::test]
async fn test_missing_file_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FakeStore::new());

    let report = loader_for(&store, 10)
        .load_source(SourceId::Source2, &dir.path().join("sales_data.csv"))
        .await;

    assert!(!report.file_found);
    assert_eq!(report.inserted, 0);
    assert_eq!(report.batches, 0);
    assert!(store.documents().is_empty());
}

#[tokio::test]
async fn test_rows_without_usable_date_are_skipped() {
    let dir = TempDir::new().unwrap();
    let mut csv = retail_rows(2);
    csv.push_str("536399,22752,SET 7 BABUSHKA,2,not a date,7.65,13047,France\n");
    csv.push_str("536398,22752,SET 7 BABUSHKA,2,,7.65,13047,France\n");
    let path = write_csv(dir.path(), "online_retail.csv", &csv);
    let store = Arc::new(FakeStore::new());

    let report = loader_for(&store, 10).load_source(SourceId::Source1, &path).await;

    assert_eq!(report.rows_read, 4);
    assert_eq!(report.rows_skipped, 2);
    assert_eq!(report.inserted, 2);
}

#[tokio::test]
async fn test_failed_batch_does_not_stop_the_load() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(dir.path(), "online_retail.csv", &retail_rows(6));
    let store = Arc::new(FakeStore::failing_on(&[2]));

    let report = loader_for(&store, 2).load_source(SourceId::Source1, &path).await;

    assert_eq!(report.batches, 3);
    assert_eq!(report.batches_failed, 1);
    assert_eq!(report.inserted, 4);
    assert_eq!(report.failed, 2);
    assert_eq!(store.batch_sizes(), vec![2, 2]);
}

#[tokio::test]
async fn test_partially_rejected_batch_counts_written_documents() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(dir.path(), "online_retail.csv", &retail_rows(4));
    let store = Arc::new(FakeStore {
        rejected_per_batch: 1,
        ..FakeStore::default()
    });

    let report = loader_for(&store, 4).load_source(SourceId::Source1, &path).await;

    assert_eq!(report.batches_failed, 0);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn test_sales_and_customer_defaults() {
    let dir = TempDir::new().unwrap();
    let sales = write_csv(
        dir.path(),
        "sales_data.csv",
        "sale_id,date,customer_id,amount,product,category,region\n\
         S1,2024-03-01,C9,19.99,Lamp,Home,North\n\
         ,,,,,,\n",
    );
    let customers = write_csv(
        dir.path(),
        "customers.csv",
        "customer_id,name,email,city,country,signup_date,total_purchases,avg_order_value\n\
         C9,Ada,ada@example.com,Leeds,UK,2023-01-05,12,45.5\n\
         ,,,,,,,\n",
    );
    let store = Arc::new(FakeStore::new());
    let loader = loader_for(&store, 10);

    let sales_report = loader.load_source(SourceId::Source2, &sales).await;
    let customer_report = loader.load_source(SourceId::Source3, &customers).await;
    assert_eq!(sales_report.inserted, 2);
    assert_eq!(customer_report.inserted, 2);

    let docs = store.documents();
    let blank_sale = &docs[1];
    assert_eq!(
        blank_sale.get_document("source").unwrap().get_str("externalId").unwrap(),
        "1"
    );
    assert_eq!(
        blank_sale.get_document("entity").unwrap().get_str("id").unwrap(),
        "UNKNOWN"
    );
    let metrics = blank_sale.get_document("metrics").unwrap();
    assert_eq!(metrics.get_f64("amount").unwrap(), 0.0);
    assert_eq!(metrics.get("count"), Some(&Bson::Int64(1)));

    let customer = &docs[2];
    let metadata = customer.get_document("metadata").unwrap();
    assert_eq!(metadata.get_str("city").unwrap(), "Leeds");
    assert_eq!(metadata.get_str("signup_date").unwrap(), "2023-01-05");
    assert_eq!(
        customer.get_document("metrics").unwrap().get_f64("averageOrderValue").unwrap(),
        45.5
    );

    let blank_customer = &docs[3];
    assert_eq!(
        blank_customer.get_document("source").unwrap().get_str("externalId").unwrap(),
        "1"
    );
}

#[tokio::test]
async fn test_run_loads_all_sources_in_order() {
    let dir = TempDir::new().unwrap();
    write_csv(dir.path(), "online_retail.csv", &retail_rows(3));
    write_csv(
        dir.path(),
        "sales_data.csv",
        "sale_id,date,customer_id,amount,product,category,region\nS1,2024-03-01,C9,5,Lamp,Home,North\n",
    );
    let store = Arc::new(FakeStore::new());

    let summary = loader_for(&store, 100).run(dir.path()).await;

    assert_eq!(summary.sources.len(), 3);
    assert_eq!(summary.total_inserted(), 4);
    assert_eq!(summary.report_for(SourceId::Source1).unwrap().inserted, 3);
    assert_eq!(summary.report_for(SourceId::Source2).unwrap().inserted, 1);
    assert!(!summary.report_for(SourceId::Source3).unwrap().file_found);

    let order: Vec<String> = store
        .documents()
        .iter()
        .map(|d| {
            d.get_document("source")
                .unwrap()
                .get_str("sourceId")
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(order, vec!["source1", "source1", "source1", "source2"]);
}

// =============================================================================
// Indexes
// =============================================================================

#[tokio::test]
async fn test_ensure_indexes_creates_whole_catalogue() {
    let store = FakeStore::new();

    let report = ensure_indexes(&store).await;

    assert!(report.is_complete());
    assert_eq!(report.created.len(), index_catalogue().len());
    let names = store.list_index_names().await.unwrap();
    assert!(names.contains(&"idx_description_text".to_string()));
    assert!(names.contains(&"_id_".to_string()));
}

#[tokio::test]
async fn test_ensure_indexes_continues_past_failure() {
    let store = FakeStore {
        failing_indexes: vec!["idx_country".to_string()],
        ..FakeStore::default()
    };

    let report = ensure_indexes(&store).await;

    assert!(!report.is_complete());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "idx_country");
    assert_eq!(report.created.len(), index_catalogue().len() - 1);
    assert!(report.created.contains(&"idx_country_date".to_string()));
}

// =============================================================================
// Cleanup
// =============================================================================

fn preloaded() -> FakeStore {
    FakeStore::with_preloaded(vec![doc! { "a": 1 }, doc! { "a": 2 }])
}

#[tokio::test]
async fn test_cleanup_drops_on_yes() {
    let store = preloaded();
    let mut input = Cursor::new(b"yes\n".to_vec());
    let mut output = Vec::new();

    let outcome = run_cleanup(&store, false, &mut input, &mut output).await.unwrap();

    assert_eq!(outcome, CleanupOutcome::Dropped { documents: 2 });
    assert!(*store.dropped.lock().unwrap());
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Documents before: 2"));
    assert!(text.contains("Type YES to drop: "));
    assert!(text.contains("Collection dropped - space freed!"));
}

#[tokio::test]
async fn test_cleanup_cancels_on_anything_else() {
    let store = preloaded();
    let mut input = Cursor::new(b"no\n".to_vec());
    let mut output = Vec::new();

    let outcome = run_cleanup(&store, false, &mut input, &mut output).await.unwrap();

    assert_eq!(outcome, CleanupOutcome::Cancelled { documents: 2 });
    assert!(!*store.dropped.lock().unwrap());
    assert!(String::from_utf8(output).unwrap().contains("Cancelled"));
}

#[tokio::test]
async fn test_cleanup_end_of_input_cancels() {
    let store = preloaded();
    let mut input = Cursor::new(Vec::new());
    let mut output = Vec::new();

    let outcome = run_cleanup(&store, false, &mut input, &mut output).await.unwrap();

    assert!(matches!(outcome, CleanupOutcome::Cancelled { .. }));
    assert!(!*store.dropped.lock().unwrap());
}

#[tokio::test]
async fn test_cleanup_assume_yes_skips_prompt() {
    let store = preloaded();
    let mut input = Cursor::new(Vec::new());
    let mut output = Vec::new();

    let outcome = run_cleanup(&store, true, &mut input, &mut output).await.unwrap();

    assert!(matches!(outcome, CleanupOutcome::Dropped { .. }));
    assert!(!String::from_utf8(output).unwrap().contains("Type YES to drop"));
}
