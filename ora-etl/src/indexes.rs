//! Index catalogue for the records collection
//!
//! One entry per downstream query pattern: invoice lookup, per-customer and
//! per-country timelines, date ranges, product grouping, full-text search on
//! product descriptions and per-source filtering.

use bson::doc;
use ora_common::db::{IndexSpec, RecordStore};
use tracing::{info, warn};

/// The fixed set of indexes the aggregation layer relies on
pub fn index_catalogue() -> Vec<IndexSpec> {
    let spec = |name: &str, keys: bson::Document, description: &str| IndexSpec {
        name: name.to_string(),
        keys,
        description: description.to_string(),
    };

    vec![
        spec("idx_invoice_no", doc! { "source.externalId": 1 }, "Invoice number"),
        spec("idx_customer_id", doc! { "entity.id": 1 }, "Customer id"),
        spec(
            "idx_customer_date",
            doc! { "entity.id": 1, "eventTime": -1 },
            "Customer + date",
        ),
        spec("idx_date_desc", doc! { "eventTime": -1 }, "Date (descending)"),
        spec("idx_country", doc! { "metadata.country": 1 }, "Country"),
        spec(
            "idx_country_date",
            doc! { "metadata.country": 1, "eventTime": -1 },
            "Country + date",
        ),
        spec("idx_stock_code", doc! { "metadata.stockCode": 1 }, "Product code"),
        spec(
            "idx_description_text",
            doc! { "metadata.description": "text" },
            "Full-text search",
        ),
        spec("idx_source_id", doc! { "source.sourceId": 1 }, "Source"),
    ]
}

/// Per-index outcome of [`ensure_indexes`]
#[derive(Debug, Clone, Default)]
pub struct IndexReport {
    pub created: Vec<String>,
    /// (index name, error message)
    pub failed: Vec<(String, String)>,
}

impl IndexReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Create every catalogued index. One failure does not stop the rest.
pub async fn ensure_indexes(store: &dyn RecordStore) -> IndexReport {
    let mut report = IndexReport::default();

    for index in index_catalogue() {
        match store.create_index(&index).await {
            Ok(()) => {
                info!(index = %index.name, "Index ready: {}", index.description);
                report.created.push(index.name);
            }
            Err(e) => {
                warn!(index = %index.name, "Index creation failed: {}", e);
                report.failed.push((index.name, e.to_string()));
            }
        }
    }

    report
}
