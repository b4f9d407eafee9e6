#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/shopfloor-rs/shopfloor/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod audit;
pub mod error;
pub mod loader;
pub mod merge;
pub mod schema;
pub mod store;

pub use audit::{MissingValueEntry, MissingValueReport, audit_frame, audit_missing_values};
pub use error::{DataError, Result};
pub use loader::{LoadOptions, load_attributes, load_records};
pub use merge::{StoreAttributes, merge_left};
pub use schema::{ColumnType, date_column, parse_date};
pub use store::RecordStore;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
