#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/shopfloor-rs/shopfloor/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;

// Re-export main types from sub-crates
pub use shopfloor_data as data;
pub use shopfloor_features as features;
pub use shopfloor_output as output;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use logging::{ERROR_LOG, INFO_LOG, PipelineLogger};
pub use pipeline::{Pipeline, PipelineOutcome};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
