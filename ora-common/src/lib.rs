//! # ORA Common Library
//!
//! Shared code for the Online Retail Analytics tools:
//! - Configuration loading (CLI / ENV / TOML / defaults)
//! - The normalized record model written by the loader
//! - The `RecordStore` seam over the document database
//! - Console number formatting used by the reporting tools
//! - Build identification for startup banners

pub mod build_info;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod models;

pub use error::{Error, Result};
pub use models::{Record, SourceId};
