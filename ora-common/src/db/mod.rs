//! Database access layer
//!
//! All tools talk to the records collection through [`RecordStore`]. The
//! production implementation is [`MongoStore`]; tests substitute in-memory
//! fakes.

use async_trait::async_trait;
use bson::{Bson, Document};

use crate::Result;

mod mongo;
pub use mongo::MongoStore;

/// One index declaration (name, key pattern, operator-facing description)
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSpec {
    pub name: String,
    pub keys: Document,
    pub description: String,
}

/// Outcome of one unordered batch insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertReport {
    /// Documents written
    pub inserted: u64,
    /// Documents rejected by the server (the rest of the batch still landed)
    pub failed: u64,
}

/// Size and document count of the collection
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollectionStats {
    pub count: u64,
    /// Uncompressed data size in bytes
    pub size_bytes: f64,
}

impl CollectionStats {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes / (1024.0 * 1024.0)
    }
}

/// Operations the ORA tools need from the document database
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// `database.collection`, for log lines
    fn namespace(&self) -> String;

    /// Unordered batch insert. A partially rejected batch is reported, not an error.
    async fn insert_many(&self, docs: Vec<Document>) -> Result<InsertReport>;

    /// Run an aggregation pipeline and drain the cursor
    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>>;

    async fn count_documents(&self, filter: Document) -> Result<u64>;

    async fn find_one(&self, filter: Document) -> Result<Option<Document>>;

    async fn create_index(&self, index: &IndexSpec) -> Result<()>;

    async fn list_index_names(&self) -> Result<Vec<String>>;

    async fn stats(&self) -> Result<CollectionStats>;

    /// Drop the whole collection (documents and indexes)
    async fn drop_collection(&self) -> Result<()>;
}

/// Read any BSON numeric as `f64`
///
/// `$sum` yields Int32, Int64 or Double depending on its inputs, so result
/// fields are read through this rather than a fixed type.
pub fn bson_number(value: Option<&Bson>) -> Option<f64> {
    match value? {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_bson_number_accepts_all_numeric_types() {
        let d = doc! { "a": 3_i32, "b": 4_i64, "c": 2.5, "d": "x" };
        assert_eq!(bson_number(d.get("a")), Some(3.0));
        assert_eq!(bson_number(d.get("b")), Some(4.0));
        assert_eq!(bson_number(d.get("c")), Some(2.5));
        assert_eq!(bson_number(d.get("d")), None);
        assert_eq!(bson_number(d.get("missing")), None);
    }

    #[test]
    fn test_collection_stats_size_mb() {
        let stats = CollectionStats {
            count: 10,
            size_bytes: 3.0 * 1024.0 * 1024.0,
        };
        assert!((stats.size_mb() - 3.0).abs() < f64::EPSILON);
    }
}
