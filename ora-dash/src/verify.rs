//! Data verification report
//!
//! Checks that all three sources landed in the collection and prints the
//! headline numbers the dashboard will show.

use bson::Document;
use chrono::{DateTime, Utc};
use ora_common::format::{format_count, format_money};
use ora_common::{Result, SourceId};
use std::fmt::Write;

use crate::aggregations::Aggregations;

const RULE: &str = "======================================================================";

/// Per-source slice of the report
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFigures {
    pub source: SourceId,
    pub documents: u64,
    pub revenue: f64,
    pub customers: u64,
}

/// Everything `ora-verify` prints
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    pub total_documents: u64,
    pub sources: Vec<SourceFigures>,
    pub total_revenue: f64,
    pub total_customers: u64,
    pub products: u64,
    pub countries: u64,
    pub average_order_value: f64,
    pub total_units: i64,
    pub event_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub index_names: Vec<String>,
    pub sample: Option<Document>,
}

impl VerificationReport {
    /// Sources with no documents at all
    pub fn missing_sources(&self) -> Vec<SourceId> {
        self.sources
            .iter()
            .filter(|s| s.documents == 0)
            .map(|s| s.source)
            .collect()
    }

    pub fn span_days(&self) -> Option<i64> {
        self.event_range
            .map(|(start, end)| end.signed_duration_since(start).num_days())
    }
}

/// Run every verification query
pub async fn collect(aggs: &Aggregations) -> Result<VerificationReport> {
    let total_documents = aggs.total_orders().await?;
    let per_source_docs = aggs.documents_per_source().await?;
    let revenue = aggs.revenue_per_source().await?;
    let customers = aggs.customers_per_source().await?;

    let sources = per_source_docs
        .into_iter()
        .map(|(source, documents)| SourceFigures {
            source,
            documents,
            revenue: revenue.get(source.as_str()).copied().unwrap_or(0.0),
            customers: customers.get(source.as_str()).copied().unwrap_or(0.0) as u64,
        })
        .collect();

    Ok(VerificationReport {
        total_documents,
        sources,
        total_revenue: aggs.total_revenue().await?,
        total_customers: aggs.unique_customers().await?,
        products: aggs.distinct_products().await?,
        countries: aggs.unique_countries().await?,
        average_order_value: aggs.average_order_value().await?,
        total_units: aggs.total_items_sold().await?,
        event_range: aggs.event_time_range().await?,
        index_names: aggs.store().list_index_names().await?,
        sample: aggs.sample_document(SourceId::Source1).await?,
    })
}

/// Console rendering of the report
pub fn render(report: &VerificationReport) -> String {
    let mut out = String::new();
    let label = |s: &SourceFigures| {
        format!(
            "Source {} ({}):",
            &s.source.as_str()["source".len()..],
            s.source.display_name()
        )
    };

    let _ = writeln!(out, "DATA VERIFICATION");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "\nTOTAL DOCUMENTS: {}\n", format_count(report.total_documents));
    for s in &report.sources {
        let _ = writeln!(out, "  {:<26} {}", label(s), format_count(s.documents));
    }
    let _ = writeln!(out, "  {:<26} {}", "TOTAL:", format_count(report.total_documents));

    let _ = writeln!(out, "\nREVENUE:\n");
    for s in &report.sources {
        let _ = writeln!(out, "  {:<26} {}", label(s), format_money(s.revenue));
    }
    let _ = writeln!(out, "  {:<26} {}", "TOTAL:", format_money(report.total_revenue));

    let _ = writeln!(out, "\nUNIQUE CUSTOMERS:\n");
    for s in &report.sources {
        let _ = writeln!(out, "  {:<26} {}", label(s), format_count(s.customers));
    }
    let _ = writeln!(out, "  {:<26} {}", "TOTAL:", format_count(report.total_customers));

    let _ = writeln!(out, "\nUNIQUE PRODUCTS: {}", format_count(report.products));
    let _ = writeln!(out, "UNIQUE COUNTRIES: {}", format_count(report.countries));
    let _ = writeln!(
        out,
        "AVERAGE ORDER VALUE: {} per transaction",
        format_money(report.average_order_value)
    );
    let _ = writeln!(out, "TOTAL UNITS SOLD: {}", report.total_units);

    let _ = writeln!(out, "\nDATA RANGE:");
    match (report.event_range, report.span_days()) {
        (Some((start, end)), Some(days)) => {
            let _ = writeln!(out, "  Start date: {}", start.format("%Y-%m-%d %H:%M:%S"));
            let _ = writeln!(out, "  End date:   {}", end.format("%Y-%m-%d %H:%M:%S"));
            let _ = writeln!(out, "  Span:       {} days", days);
        }
        _ => {
            let _ = writeln!(out, "  (no documents)");
        }
    }

    let _ = writeln!(out, "\nINDEXES ({}):", report.index_names.len());
    for name in &report.index_names {
        let _ = writeln!(out, "  - {}", name);
    }

    let _ = writeln!(out, "\nSAMPLE DOCUMENT (source1):");
    match &report.sample {
        Some(sample) => {
            for key in ["_id", "source", "entity", "metrics", "metadata"] {
                if let Some(value) = sample.get(key) {
                    let _ = writeln!(out, "  {}: {}", key, value);
                }
            }
        }
        None => {
            let _ = writeln!(out, "  (none)");
        }
    }

    let _ = writeln!(out, "\n{}", RULE);
    let missing = report.missing_sources();
    if missing.is_empty() {
        let _ = writeln!(out, "STATUS: all sources loaded");
    } else {
        let names: Vec<&str> = missing.iter().map(|s| s.display_name()).collect();
        let _ = writeln!(out, "STATUS: missing data for {}", names.join(", "));
    }
    let _ = writeln!(out, "{}", RULE);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use chrono::TimeZone;

    fn report() -> VerificationReport {
        VerificationReport {
            total_documents: 543_702,
            sources: vec![
                SourceFigures {
                    source: SourceId::Source1,
                    documents: 541_909,
                    revenue: 9_747_747.93,
                    customers: 4_373,
                },
                SourceFigures {
                    source: SourceId::Source2,
                    documents: 1_000,
                    revenue: 250_000.0,
                    customers: 400,
                },
                SourceFigures {
                    source: SourceId::Source3,
                    documents: 0,
                    revenue: 0.0,
                    customers: 0,
                },
            ],
            total_revenue: 9_997_747.93,
            total_customers: 4_700,
            products: 4_070,
            countries: 38,
            average_order_value: 18.39,
            total_units: 5_176_450,
            event_range: Some((
                Utc.with_ymd_and_hms(2010, 12, 1, 8, 26, 0).unwrap(),
                Utc.with_ymd_and_hms(2011, 12, 9, 12, 50, 0).unwrap(),
            )),
            index_names: vec!["_id_".to_string(), "idx_country".to_string()],
            sample: Some(doc! { "source": { "sourceId": "source1" } }),
        }
    }

    #[test]
    fn test_span_and_missing_sources() {
        let r = report();
        assert_eq!(r.span_days(), Some(373));
        assert_eq!(r.missing_sources(), vec![SourceId::Source3]);
    }

    #[test]
    fn test_render() {
        let text = render(&report());
        assert!(text.contains("TOTAL DOCUMENTS: 543,702"));
        assert!(text.contains("Source 1 (Online Retail):"));
        assert!(text.contains("$9,747,747.93"));
        assert!(text.contains("Span:       373 days"));
        assert!(text.contains("INDEXES (2):"));
        assert!(text.contains("STATUS: missing data for Customers"));
    }

    #[test]
    fn test_render_empty_collection() {
        let mut r = report();
        r.event_range = None;
        r.sample = None;
        let text = render(&r);
        assert!(text.contains("(no documents)"));
        assert!(text.contains("(none)"));
    }
}
