//! Normalized record model
//!
//! Every CSV row from every source becomes one `Record`. The field names
//! written to the database are the camelCase keys the aggregation pipelines
//! and indexes refer to (`source.sourceId`, `entity.id`, `metrics.amount`,
//! `metadata.country`, `eventTime`, ...).

use bson::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Version of the document layout written by the loader
pub const SCHEMA_VERSION: i32 = 1;

/// Entity id used when a row carries no customer id
pub const UNKNOWN_ENTITY: &str = "UNKNOWN";

/// The three ingestion sources merged into one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// Online Retail transactions (Kaggle export)
    Source1,
    /// Sales transactions
    Source2,
    /// Customer profiles
    Source3,
}

impl SourceId {
    /// All sources in load order
    pub const ALL: [SourceId; 3] = [SourceId::Source1, SourceId::Source2, SourceId::Source3];

    /// Value stored in `source.sourceId`
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Source1 => "source1",
            SourceId::Source2 => "source2",
            SourceId::Source3 => "source3",
        }
    }

    /// Human-readable name for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceId::Source1 => "Online Retail",
            SourceId::Source2 => "Sales Data",
            SourceId::Source3 => "Customers",
        }
    }

    /// Value stored in `source.name`
    pub fn source_name(&self) -> &'static str {
        match self {
            SourceId::Source1 => "kaggle_csv",
            SourceId::Source2 => "sales_csv",
            SourceId::Source3 => "customers_csv",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SourceId::Source1 => "Kaggle Online Retail Dataset",
            SourceId::Source2 => "Sales transactions data",
            SourceId::Source3 => "Customer information",
        }
    }

    /// File name inside the data directory
    pub fn default_file(&self) -> &'static str {
        match self {
            SourceId::Source1 => "online_retail.csv",
            SourceId::Source2 => "sales_data.csv",
            SourceId::Source3 => "customers.csv",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "source1" => Ok(SourceId::Source1),
            "source2" => Ok(SourceId::Source2),
            "source3" => Ok(SourceId::Source3),
            other => Err(Error::InvalidInput(format!("Unknown source id: {}", other))),
        }
    }
}

/// Provenance of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub source_id: SourceId,
    /// Identifier of the row in its origin dataset (invoice, sale or customer id)
    pub external_id: String,
}

/// The business entity a record belongs to (always a customer today)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Numeric measures. Which fields are present depends on the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_purchases: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_order_value: Option<f64>,
}

/// Descriptive attributes. Which fields are present depends on the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, rename = "signup_date", skip_serializing_if = "Option::is_none")]
    pub signup_date: Option<String>,
}

/// One normalized document in the records collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub schema_version: i32,
    pub source: SourceInfo,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub ingested_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub event_time: DateTime<Utc>,
    pub entity: Entity,
    pub metrics: Metrics,
    pub metadata: Metadata,
}

impl Record {
    /// Build a CSV-sourced customer record
    pub fn new(
        source_id: SourceId,
        external_id: impl Into<String>,
        entity_id: impl Into<String>,
        event_time: DateTime<Utc>,
        ingested_at: DateTime<Utc>,
        metrics: Metrics,
        metadata: Metadata,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            source: SourceInfo {
                name: source_id.source_name().to_string(),
                kind: "csv".to_string(),
                source_id,
                external_id: external_id.into(),
            },
            ingested_at,
            event_time,
            entity: Entity {
                id: entity_id.into(),
                kind: "customer".to_string(),
            },
            metrics,
            metadata,
        }
    }

    /// Encode for insertion
    pub fn to_document(&self) -> Result<Document> {
        Ok(bson::to_document(self)?)
    }
}
