//! CSV row types and normalization into the common record shape
//!
//! Every column is optional: a missing or empty cell falls back to the
//! field default (0 for numbers, "" for text, `UNKNOWN` for the customer id,
//! the row index for the external id). The only hard failure is a
//! transaction row without a usable date.

use chrono::{DateTime, Utc};
use ora_common::models::{Metadata, Metrics, UNKNOWN_ENTITY};
use ora_common::{Record, SourceId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::dates::parse_event_time;

/// Reason a single CSV row was skipped
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("missing required column {0}")]
    MissingField(&'static str),

    #[error("unparseable date: {0}")]
    InvalidDate(String),
}

/// A CSV row type that knows which source it belongs to and how to
/// normalize itself
pub trait SourceRow: DeserializeOwned {
    const SOURCE: SourceId;

    /// Build the record for the row at zero-based `index`, loaded at `now`
    fn normalize(self, index: u64, now: DateTime<Utc>) -> Result<Record, RowError>;
}

/// Online Retail export (one row per invoice line)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Source1Row {
    #[serde(rename = "InvoiceNo")]
    pub invoice_no: Option<String>,
    #[serde(rename = "StockCode")]
    pub stock_code: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Quantity", deserialize_with = "csv::invalid_option")]
    pub quantity: Option<f64>,
    #[serde(rename = "InvoiceDate")]
    pub invoice_date: Option<String>,
    #[serde(rename = "UnitPrice", deserialize_with = "csv::invalid_option")]
    pub unit_price: Option<f64>,
    #[serde(rename = "CustomerID")]
    pub customer_id: Option<String>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
}

impl SourceRow for Source1Row {
    const SOURCE: SourceId = SourceId::Source1;

    fn normalize(self, index: u64, now: DateTime<Utc>) -> Result<Record, RowError> {
        let raw_date = self
            .invoice_date
            .ok_or(RowError::MissingField("InvoiceDate"))?;
        let event_time =
            parse_event_time(&raw_date).ok_or_else(|| RowError::InvalidDate(raw_date.clone()))?;

        let quantity = self.quantity.map(|q| q.trunc() as i64).unwrap_or(0);
        let unit_price = self.unit_price.unwrap_or(0.0);

        Ok(Record::new(
            Self::SOURCE,
            external_id(self.invoice_no, index),
            entity_id(self.customer_id),
            event_time,
            now,
            Metrics {
                amount: Some(unit_price * quantity as f64),
                count: Some(quantity),
                unit_price: Some(unit_price),
                ..Default::default()
            },
            Metadata {
                description: Some(text(self.description)),
                stock_code: Some(text(self.stock_code)),
                country: Some(text(self.country)),
                ..Default::default()
            },
        ))
    }
}

/// Sales transactions export
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Source2Row {
    pub sale_id: Option<String>,
    pub date: Option<String>,
    pub customer_id: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub amount: Option<f64>,
    pub product: Option<String>,
    pub category: Option<String>,
    pub region: Option<String>,
}

impl SourceRow for Source2Row {
    const SOURCE: SourceId = SourceId::Source2;

    fn normalize(self, index: u64, now: DateTime<Utc>) -> Result<Record, RowError> {
        // No date column means the sale is stamped with the load time
        let event_time = match self.date.filter(|d| !d.trim().is_empty()) {
            Some(raw) => parse_event_time(&raw).ok_or(RowError::InvalidDate(raw))?,
            None => now,
        };

        Ok(Record::new(
            Self::SOURCE,
            external_id(self.sale_id, index),
            entity_id(self.customer_id),
            event_time,
            now,
            Metrics {
                amount: Some(self.amount.unwrap_or(0.0)),
                count: Some(1),
                ..Default::default()
            },
            Metadata {
                product: Some(text(self.product)),
                category: Some(text(self.category)),
                region: Some(text(self.region)),
                ..Default::default()
            },
        ))
    }
}

/// Customer profile export
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Source3Row {
    pub customer_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub signup_date: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub total_purchases: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub avg_order_value: Option<f64>,
}

impl SourceRow for Source3Row {
    const SOURCE: SourceId = SourceId::Source3;

    fn normalize(self, index: u64, now: DateTime<Utc>) -> Result<Record, RowError> {
        let customer = clean_id(self.customer_id);

        Ok(Record::new(
            Self::SOURCE,
            customer.clone().unwrap_or_else(|| index.to_string()),
            customer.unwrap_or_else(|| UNKNOWN_ENTITY.to_string()),
            now,
            now,
            Metrics {
                total_purchases: Some(self.total_purchases.unwrap_or(0.0)),
                average_order_value: Some(self.avg_order_value.unwrap_or(0.0)),
                ..Default::default()
            },
            Metadata {
                name: Some(text(self.name)),
                email: Some(text(self.email)),
                city: Some(text(self.city)),
                country: Some(text(self.country)),
                signup_date: Some(text(self.signup_date)),
                ..Default::default()
            },
        ))
    }
}

/// Trim an identifier cell; spreadsheet float ids (`17850.0`) lose the `.0`
pub fn clean_id(raw: Option<String>) -> Option<String> {
    let value = raw?;
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        return None;
    }

    match value.strip_suffix(".0") {
        Some(whole) if !whole.is_empty() && whole.chars().all(|c| c.is_ascii_digit()) => {
            Some(whole.to_string())
        }
        _ => Some(value.to_string()),
    }
}

fn entity_id(raw: Option<String>) -> String {
    clean_id(raw).unwrap_or_else(|| UNKNOWN_ENTITY.to_string())
}

fn external_id(raw: Option<String>, index: u64) -> String {
    clean_id(raw).unwrap_or_else(|| index.to_string())
}

fn text(raw: Option<String>) -> String {
    raw.unwrap_or_default()
}
