#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/shopfloor-rs/shopfloor/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod calendar;
pub mod derive;
pub mod distribution;
pub mod error;

pub use calendar::{
    HOLIDAY_COLUMN, Holiday, HolidayCalendar, HolidayTagging, add_day_of_week, add_holiday_column,
    add_month, tag_holidays,
};
pub use derive::{
    Aggregation, ColumnFeature, ConfiguredFeature, CumulativeSum, CumulativeSumConfig, GrowthRate,
    GrowthRateConfig, MonthlyAggregate, MonthlyAggregateConfig, MonthlySeries, MonthlyValue,
};
pub use distribution::{
    ComparedShare, DistributionComparison, ValueDistribution, ValueShare, compare_distributions,
    value_distribution,
};
pub use error::{FeatureError, Result};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
