//! Pipeline builders
//!
//! Pure functions returning the stage list for each dashboard query. Field
//! paths follow the record layout written by the loader.

use bson::{doc, Bson, Document};

/// Boundaries of the order value histogram; amounts outside land in `other`
pub const ORDER_VALUE_BOUNDARIES: [i32; 6] = [0, 10, 50, 100, 500, 10_000];

/// Revenue at or above which a customer is `VIP`
pub const VIP_THRESHOLD: f64 = 1000.0;
/// Revenue at or above which a customer is `Regular`
pub const REGULAR_THRESHOLD: f64 = 100.0;

/// Days shown on the daily trend
pub const DAILY_WINDOW: i64 = 365;

/// Products listed by the performance view
pub const PERFORMANCE_LIMIT: i64 = 20;

fn non_empty(field: &str) -> Document {
    doc! { "$match": { field: { "$exists": true, "$ne": "" } } }
}

fn round2(expr: impl Into<Bson>) -> Document {
    doc! { "$round": [expr.into(), 2] }
}

/// `numerator / denominator` rounded to cents, 0 when the denominator is 0
fn safe_ratio(numerator: &str, denominator: &str) -> Document {
    doc! {
        "$cond": [
            { "$eq": [denominator, 0] },
            0.0,
            { "$round": [{ "$divide": [numerator, denominator] }, 2] }
        ]
    }
}

pub fn total_revenue() -> Vec<Document> {
    vec![doc! { "$group": { "_id": Bson::Null, "total": { "$sum": "$metrics.amount" } } }]
}

pub fn unique_customers() -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$entity.id" } },
        doc! { "$count": "count" },
    ]
}

pub fn average_order_value() -> Vec<Document> {
    vec![doc! { "$group": { "_id": Bson::Null, "avg_value": { "$avg": "$metrics.amount" } } }]
}

pub fn total_items_sold() -> Vec<Document> {
    vec![doc! { "$group": { "_id": Bson::Null, "total_items": { "$sum": "$metrics.count" } } }]
}

pub fn unique_countries() -> Vec<Document> {
    vec![
        non_empty("metadata.country"),
        doc! { "$group": { "_id": "$metadata.country" } },
        doc! { "$count": "count" },
    ]
}

pub fn top_products(limit: i64) -> Vec<Document> {
    vec![
        non_empty("metadata.stockCode"),
        doc! {
            "$group": {
                "_id": "$metadata.stockCode",
                "product_name": { "$first": "$metadata.description" },
                "revenue": { "$sum": "$metrics.amount" },
                "quantity": { "$sum": "$metrics.count" },
                "orders": { "$sum": 1 },
            }
        },
        doc! { "$sort": { "revenue": -1 } },
        doc! { "$limit": limit },
        doc! {
            "$project": {
                "_id": 0,
                "stock_code": "$_id",
                "product_name": 1,
                "revenue": round2("$revenue"),
                "quantity": 1,
                "orders": 1,
                "avg_price": safe_ratio("$revenue", "$quantity"),
            }
        },
    ]
}

pub fn top_countries(limit: i64) -> Vec<Document> {
    vec![
        non_empty("metadata.country"),
        doc! {
            "$group": {
                "_id": "$metadata.country",
                "revenue": { "$sum": "$metrics.amount" },
                "orders": { "$sum": 1 },
                "customers": { "$addToSet": "$entity.id" },
            }
        },
        doc! { "$sort": { "revenue": -1 } },
        doc! { "$limit": limit },
        doc! {
            "$project": {
                "_id": 0,
                "country": "$_id",
                "revenue": round2("$revenue"),
                "orders": 1,
                "unique_customers": { "$size": "$customers" },
            }
        },
    ]
}

pub fn top_customers(limit: i64) -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": "$entity.id",
                "revenue": { "$sum": "$metrics.amount" },
                "orders": { "$sum": 1 },
                "items": { "$sum": "$metrics.count" },
                "countries": { "$addToSet": "$metadata.country" },
            }
        },
        doc! { "$sort": { "revenue": -1 } },
        doc! { "$limit": limit },
        doc! {
            "$project": {
                "_id": 0,
                "customer_id": "$_id",
                "revenue": round2("$revenue"),
                "orders": 1,
                "items": 1,
                "avg_order_value": safe_ratio("$revenue", "$orders"),
                // Sales rows carry no country; drop the null/"" members
                "countries": { "$setDifference": ["$countries", [Bson::Null, ""]] },
            }
        },
    ]
}

/// Most recent [`DAILY_WINDOW`] days, oldest first
pub fn daily_revenue() -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": { "$dateToString": { "format": "%Y-%m-%d", "date": "$eventTime" } },
                "revenue": { "$sum": "$metrics.amount" },
                "orders": { "$sum": 1 },
            }
        },
        doc! { "$sort": { "_id": -1 } },
        doc! { "$limit": DAILY_WINDOW },
        doc! { "$sort": { "_id": 1 } },
        doc! {
            "$project": {
                "_id": 0,
                "date": "$_id",
                "revenue": round2("$revenue"),
                "orders": 1,
            }
        },
    ]
}

pub fn monthly_revenue() -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": { "$dateToString": { "format": "%Y-%m", "date": "$eventTime" } },
                "revenue": { "$sum": "$metrics.amount" },
                "orders": { "$sum": 1 },
                "customers": { "$addToSet": "$entity.id" },
            }
        },
        doc! { "$sort": { "_id": 1 } },
        doc! {
            "$project": {
                "_id": 0,
                "month": "$_id",
                "revenue": round2("$revenue"),
                "orders": 1,
                "customers": { "$size": "$customers" },
            }
        },
    ]
}

pub fn revenue_by_source() -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": "$source.sourceId",
                "revenue": { "$sum": "$metrics.amount" },
                "orders": { "$sum": 1 },
                "avg_order": { "$avg": "$metrics.amount" },
            }
        },
        doc! { "$sort": { "revenue": -1 } },
        doc! {
            "$project": {
                "_id": 0,
                "source": "$_id",
                "revenue": round2("$revenue"),
                "orders": 1,
                "avg_order": round2("$avg_order"),
            }
        },
    ]
}

pub fn customers_by_country() -> Vec<Document> {
    vec![
        non_empty("metadata.country"),
        doc! {
            "$group": {
                "_id": "$metadata.country",
                "customers": { "$addToSet": "$entity.id" },
            }
        },
        doc! {
            "$project": {
                "_id": 0,
                "country": "$_id",
                "customer_count": { "$size": "$customers" },
            }
        },
        doc! { "$sort": { "customer_count": -1, "country": 1 } },
    ]
}

pub fn order_value_distribution() -> Vec<Document> {
    vec![
        doc! {
            "$bucket": {
                "groupBy": "$metrics.amount",
                "boundaries": ORDER_VALUE_BOUNDARIES.to_vec(),
                "default": "other",
                "output": {
                    "count": { "$sum": 1 },
                    "avg": { "$avg": "$metrics.amount" },
                    "total": { "$sum": "$metrics.amount" },
                }
            }
        },
        doc! {
            "$project": {
                "_id": 0,
                "range": "$_id",
                "count": 1,
                "avg": round2("$avg"),
                "total": round2("$total"),
            }
        },
    ]
}

pub fn customer_segmentation() -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": "$entity.id",
                "revenue": { "$sum": "$metrics.amount" },
                "orders": { "$sum": 1 },
            }
        },
        doc! {
            "$addFields": {
                "segment": {
                    "$switch": {
                        "branches": [
                            { "case": { "$gte": ["$revenue", VIP_THRESHOLD] }, "then": "VIP" },
                            { "case": { "$gte": ["$revenue", REGULAR_THRESHOLD] }, "then": "Regular" },
                        ],
                        "default": "New",
                    }
                }
            }
        },
        doc! {
            "$group": {
                "_id": "$segment",
                "customer_count": { "$sum": 1 },
                "total_revenue": { "$sum": "$revenue" },
                "avg_revenue": { "$avg": "$revenue" },
            }
        },
        doc! { "$sort": { "total_revenue": -1 } },
        doc! {
            "$project": {
                "_id": 0,
                "segment": "$_id",
                "customers": "$customer_count",
                "revenue": round2("$total_revenue"),
                "avg_per_customer": round2("$avg_revenue"),
            }
        },
    ]
}

/// Top [`PERFORMANCE_LIMIT`] products with a yearly turnover estimate
pub fn product_performance() -> Vec<Document> {
    vec![
        non_empty("metadata.stockCode"),
        doc! {
            "$group": {
                "_id": "$metadata.stockCode",
                "description": { "$first": "$metadata.description" },
                "total_revenue": { "$sum": "$metrics.amount" },
                "total_quantity": { "$sum": "$metrics.count" },
                "avg_price": { "$avg": "$metrics.unitPrice" },
                "orders": { "$sum": 1 },
            }
        },
        doc! {
            "$addFields": {
                "turnover": {
                    "$multiply": [
                        { "$divide": ["$total_quantity", 365] },
                        { "$ifNull": ["$avg_price", 0] }
                    ]
                }
            }
        },
        doc! { "$sort": { "total_revenue": -1 } },
        doc! { "$limit": PERFORMANCE_LIMIT },
        doc! {
            "$project": {
                "_id": 0,
                "stock_code": "$_id",
                "description": 1,
                "revenue": round2("$total_revenue"),
                "quantity": "$total_quantity",
                "orders": 1,
                "avg_price": round2(doc! { "$ifNull": ["$avg_price", 0] }),
                "turnover": round2("$turnover"),
            }
        },
    ]
}

// Verification queries

pub fn revenue_per_source() -> Vec<Document> {
    vec![doc! { "$group": { "_id": "$source.sourceId", "revenue": { "$sum": "$metrics.amount" } } }]
}

pub fn customers_per_source() -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": { "source": "$source.sourceId", "customer": "$entity.id" } } },
        doc! { "$group": { "_id": "$_id.source", "count": { "$sum": 1 } } },
    ]
}

pub fn distinct_products() -> Vec<Document> {
    vec![
        non_empty("metadata.stockCode"),
        doc! { "$group": { "_id": "$metadata.stockCode" } },
        doc! { "$count": "count" },
    ]
}

pub fn event_time_range() -> Vec<Document> {
    vec![doc! {
        "$group": {
            "_id": Bson::Null,
            "min_date": { "$min": "$eventTime" },
            "max_date": { "$max": "$eventTime" },
        }
    }]
}
