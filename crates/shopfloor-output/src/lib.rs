#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/shopfloor-rs/shopfloor/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod export;
pub mod report;
pub mod store;
pub mod summary;

pub use error::{ExportError, Result};
pub use export::{ExportFormat, Exporter};
pub use report::{RunReport, RunReportBuilder};
pub use store::{DATE_FORMAT, export_store};
pub use summary::TableView;

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
