//! Aggregation layer: KPIs, rankings, trends and distributions
//!
//! Every query is read-only and stateless. The stage lists live in
//! [`pipelines`]; this module runs them through a [`RecordStore`] and decodes
//! the result documents into typed rows.

use bson::{doc, Bson, Document};
use chrono::{DateTime, Utc};
use ora_common::db::{bson_number, RecordStore};
use ora_common::{Result, SourceId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod pipelines;

/// The six headline numbers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_revenue: f64,
    pub total_orders: u64,
    pub unique_customers: u64,
    pub average_order_value: f64,
    pub total_items_sold: i64,
    pub unique_countries: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRevenue {
    pub stock_code: String,
    #[serde(default)]
    pub product_name: Option<String>,
    pub revenue: f64,
    pub quantity: i64,
    pub orders: i64,
    pub avg_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRevenue {
    pub country: String,
    pub revenue: f64,
    pub orders: i64,
    pub unique_customers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRevenue {
    pub customer_id: String,
    pub revenue: f64,
    pub orders: i64,
    #[serde(default)]
    pub items: i64,
    pub avg_order_value: f64,
    #[serde(default)]
    pub countries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: String,
    pub revenue: f64,
    pub orders: i64,
}

/// Mean, peak and lowest of the daily revenue series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub mean: f64,
    pub peak: f64,
    pub lowest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRevenue {
    pub days: Vec<DailyPoint>,
    /// Absent when there are no days
    pub summary: Option<DailySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month: String,
    pub revenue: f64,
    pub orders: i64,
    pub customers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRevenue {
    pub source: String,
    pub revenue: f64,
    pub orders: i64,
    /// Absent for a source whose records carry no amount (customers)
    #[serde(default)]
    pub avg_order: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryCustomers {
    pub country: String,
    pub customer_count: i64,
}

/// One order value histogram bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderValueBucket {
    /// `0-10`, `10-50`, ..., `500-10000` or `other`
    pub range: String,
    /// Inclusive lower boundary; `None` for the `other` bucket
    pub lower_bound: Option<f64>,
    pub count: i64,
    pub avg: Option<f64>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSegment {
    pub segment: String,
    pub customers: i64,
    pub revenue: f64,
    pub avg_per_customer: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPerformance {
    pub stock_code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub revenue: f64,
    pub quantity: i64,
    pub orders: i64,
    pub avg_price: f64,
    pub turnover: f64,
}

/// Runs the dashboard queries against a [`RecordStore`]
pub struct Aggregations<S: RecordStore + ?Sized = dyn RecordStore> {
    store: Arc<S>,
}

impl<S: RecordStore + ?Sized> Aggregations<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // KPIs

    pub async fn total_revenue(&self) -> Result<f64> {
        self.scalar(pipelines::total_revenue(), "total").await
    }

    pub async fn total_orders(&self) -> Result<u64> {
        self.store.count_documents(Document::new()).await
    }

    pub async fn unique_customers(&self) -> Result<u64> {
        self.count(pipelines::unique_customers()).await
    }

    pub async fn average_order_value(&self) -> Result<f64> {
        self.scalar(pipelines::average_order_value(), "avg_value").await
    }

    pub async fn total_items_sold(&self) -> Result<i64> {
        Ok(self.scalar(pipelines::total_items_sold(), "total_items").await? as i64)
    }

    pub async fn unique_countries(&self) -> Result<u64> {
        self.count(pipelines::unique_countries()).await
    }

    pub async fn all_kpis(&self) -> Result<Kpis> {
        Ok(Kpis {
            total_revenue: self.total_revenue().await?,
            total_orders: self.total_orders().await?,
            unique_customers: self.unique_customers().await?,
            average_order_value: self.average_order_value().await?,
            total_items_sold: self.total_items_sold().await?,
            unique_countries: self.unique_countries().await?,
        })
    }

    // Rankings

    pub async fn top_products(&self, limit: i64) -> Result<Vec<ProductRevenue>> {
        self.rows(pipelines::top_products(limit)).await
    }

    pub async fn top_countries(&self, limit: i64) -> Result<Vec<CountryRevenue>> {
        self.rows(pipelines::top_countries(limit)).await
    }

    pub async fn top_customers(&self, limit: i64) -> Result<Vec<CustomerRevenue>> {
        self.rows(pipelines::top_customers(limit)).await
    }

    // Trends

    pub async fn daily_revenue(&self) -> Result<DailyRevenue> {
        let days: Vec<DailyPoint> = self.rows(pipelines::daily_revenue()).await?;
        let summary = summarize_daily(&days);
        Ok(DailyRevenue { days, summary })
    }

    pub async fn monthly_revenue(&self) -> Result<Vec<MonthlyPoint>> {
        self.rows(pipelines::monthly_revenue()).await
    }

    // Distributions

    pub async fn revenue_by_source(&self) -> Result<Vec<SourceRevenue>> {
        self.rows(pipelines::revenue_by_source()).await
    }

    pub async fn customers_by_country(&self) -> Result<Vec<CountryCustomers>> {
        self.rows(pipelines::customers_by_country()).await
    }

    pub async fn order_value_distribution(&self) -> Result<Vec<OrderValueBucket>> {
        let docs = self.store.aggregate(pipelines::order_value_distribution()).await?;
        Ok(docs.iter().map(decode_bucket).collect())
    }

    // Analytics

    pub async fn customer_segmentation(&self) -> Result<Vec<CustomerSegment>> {
        self.rows(pipelines::customer_segmentation()).await
    }

    pub async fn product_performance(&self) -> Result<Vec<ProductPerformance>> {
        self.rows(pipelines::product_performance()).await
    }

    // Verification

    /// Document count per source, in source order
    pub async fn documents_per_source(&self) -> Result<Vec<(SourceId, u64)>> {
        let mut counts = Vec::with_capacity(SourceId::ALL.len());
        for source in SourceId::ALL {
            let n = self
                .store
                .count_documents(doc! { "source.sourceId": source.as_str() })
                .await?;
            counts.push((source, n));
        }
        Ok(counts)
    }

    /// Revenue keyed by `source.sourceId`
    pub async fn revenue_per_source(&self) -> Result<BTreeMap<String, f64>> {
        self.keyed(pipelines::revenue_per_source(), "revenue").await
    }

    /// Distinct customers keyed by `source.sourceId`
    pub async fn customers_per_source(&self) -> Result<BTreeMap<String, f64>> {
        self.keyed(pipelines::customers_per_source(), "count").await
    }

    pub async fn distinct_products(&self) -> Result<u64> {
        self.count(pipelines::distinct_products()).await
    }

    /// Earliest and latest `eventTime`, `None` on an empty collection
    pub async fn event_time_range(&self) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>> {
        let docs = self.store.aggregate(pipelines::event_time_range()).await?;
        let Some(first) = docs.first() else {
            return Ok(None);
        };

        match (first.get("min_date"), first.get("max_date")) {
            (Some(Bson::DateTime(min)), Some(Bson::DateTime(max))) => {
                Ok(Some((min.to_chrono(), max.to_chrono())))
            }
            _ => Ok(None),
        }
    }

    /// One raw document from `source`, for eyeballing the stored layout
    pub async fn sample_document(&self, source: SourceId) -> Result<Option<Document>> {
        self.store
            .find_one(doc! { "source.sourceId": source.as_str() })
            .await
    }

    // Decoding helpers

    async fn rows<T: DeserializeOwned>(&self, pipeline: Vec<Document>) -> Result<Vec<T>> {
        let docs = self.store.aggregate(pipeline).await?;
        docs.into_iter()
            .map(|d| Ok(bson::from_document(d)?))
            .collect()
    }

    /// Numeric `field` of the single result document, 0 when there is none
    async fn scalar(&self, pipeline: Vec<Document>, field: &str) -> Result<f64> {
        let docs = self.store.aggregate(pipeline).await?;
        Ok(docs
            .first()
            .and_then(|d| bson_number(d.get(field)))
            .unwrap_or(0.0))
    }

    /// Result of a pipeline ending in `$count: "count"`
    async fn count(&self, pipeline: Vec<Document>) -> Result<u64> {
        Ok(self.scalar(pipeline, "count").await? as u64)
    }

    async fn keyed(&self, pipeline: Vec<Document>, field: &str) -> Result<BTreeMap<String, f64>> {
        let docs = self.store.aggregate(pipeline).await?;
        Ok(docs
            .iter()
            .filter_map(|d| {
                let key = d.get_str("_id").ok()?;
                Some((key.to_string(), bson_number(d.get(field)).unwrap_or(0.0)))
            })
            .collect())
    }
}

/// Mean, peak and lowest daily revenue; `None` for an empty series
pub fn summarize_daily(days: &[DailyPoint]) -> Option<DailySummary> {
    if days.is_empty() {
        return None;
    }

    let total: f64 = days.iter().map(|d| d.revenue).sum();
    let peak = days.iter().map(|d| d.revenue).fold(f64::MIN, f64::max);
    let lowest = days.iter().map(|d| d.revenue).fold(f64::MAX, f64::min);

    Some(DailySummary {
        mean: total / days.len() as f64,
        peak,
        lowest,
    })
}

/// Human label for a `$bucket` boundary id
pub fn bucket_label(lower: f64) -> String {
    let bounds = pipelines::ORDER_VALUE_BOUNDARIES;
    let upper = bounds
        .iter()
        .map(|b| *b as f64)
        .find(|b| *b > lower);

    match upper {
        Some(upper) => format!("{}-{}", lower, upper),
        None => format!("{}+", lower),
    }
}

fn decode_bucket(d: &Document) -> OrderValueBucket {
    let lower_bound = bson_number(d.get("range"));
    let range = match lower_bound {
        Some(lower) => bucket_label(lower),
        None => d.get_str("range").unwrap_or("other").to_string(),
    };

    OrderValueBucket {
        range,
        lower_bound,
        count: bson_number(d.get("count")).unwrap_or(0.0) as i64,
        avg: bson_number(d.get("avg")),
        total: bson_number(d.get("total")).unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(date: &str, revenue: f64) -> DailyPoint {
        DailyPoint {
            date: date.to_string(),
            revenue,
            orders: 1,
        }
    }

    #[test]
    fn test_summarize_daily() {
        let days = vec![
            point("2011-12-07", 100.0),
            point("2011-12-08", 300.0),
            point("2011-12-09", 50.0),
        ];
        let summary = summarize_daily(&days).unwrap();
        assert_eq!(summary.peak, 300.0);
        assert_eq!(summary.lowest, 50.0);
        assert!((summary.mean - 150.0).abs() < 1e-9);

        assert_eq!(summarize_daily(&[]), None);
    }

    #[test]
    fn test_bucket_labels() {
        assert_eq!(bucket_label(0.0), "0-10");
        assert_eq!(bucket_label(10.0), "10-50");
        assert_eq!(bucket_label(500.0), "500-10000");
    }

    #[test]
    fn test_decode_bucket() {
        let numeric = doc! { "range": 50_i32, "count": 7_i32, "avg": 72.5, "total": 507.5 };
        let bucket = decode_bucket(&numeric);
        assert_eq!(bucket.range, "50-100");
        assert_eq!(bucket.lower_bound, Some(50.0));
        assert_eq!(bucket.count, 7);

        let other = doc! { "range": "other", "count": 3_i32, "avg": Bson::Null, "total": 0 };
        let bucket = decode_bucket(&other);
        assert_eq!(bucket.range, "other");
        assert_eq!(bucket.lower_bound, None);
        assert_eq!(bucket.avg, None);
        assert_eq!(bucket.total, 0.0);
    }
}
