//! Staged cleaning and enrichment pipeline.
//!
//! Each stage runs inside the pipeline's logger and maps its failure to the
//! matching [`PipelineError`] variant, logging it to the error stream before
//! returning it. Holiday tagging is the exception: it degrades instead of
//! failing.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::logging::PipelineLogger;
use shopfloor_data::{
    LoadOptions, MissingValueReport, RecordStore, StoreAttributes, audit_missing_values,
    load_attributes, load_records, merge_left,
};
use shopfloor_features::{
    ColumnFeature, ConfiguredFeature, CumulativeSum, DistributionComparison, GrowthRate,
    HolidayTagging, MonthlyAggregate, MonthlySeries, add_day_of_week, add_month,
    compare_distributions, tag_holidays, value_distribution,
};
use shopfloor_output::{ExportFormat, Exporter, RunReport, RunReportBuilder, export_store};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, info_span, warn};

/// File name of the missing-value report.
pub const MISSING_VALUES_REPORT: &str = "missing_values.json";

/// File name of the monthly series.
pub const MONTHLY_REPORT: &str = "monthly_sales.csv";

/// File name of the run report.
pub const RUN_REPORT: &str = "run_report.json";

/// Result of a full run.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Enriched store as exported.
    pub store: RecordStore,
    /// Summary of the run.
    pub report: RunReport,
    /// Monthly series, when reports are enabled.
    pub monthly: Option<MonthlySeries>,
    /// Holiday tagging failure the run continued past.
    pub enrichment_error: Option<PipelineError>,
}

/// Pipeline over one configuration and logger.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    logger: PipelineLogger,
}

impl Pipeline {
    /// Create a pipeline.
    pub const fn new(config: PipelineConfig, logger: PipelineLogger) -> Self {
        Self { config, logger }
    }

    /// Current configuration.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Logger the stages report to.
    pub const fn logger(&self) -> &PipelineLogger {
        &self.logger
    }

    fn stage<T, E>(
        &self,
        name: &'static str,
        wrap: impl FnOnce(E) -> PipelineError,
        op: impl FnOnce() -> std::result::Result<T, E>,
    ) -> Result<T> {
        self.logger.in_scope(|| {
            let span = info_span!("stage", stage = name);
            let _entered = span.enter();
            op().map_err(|err| {
                let err = wrap(err);
                error!(stage = err.stage(), error = %err, "Error in {name} stage");
                err
            })
        })
    }

    /// Load a transactional file, rejecting duplicate `(key, date)` pairs.
    pub fn load(&self, path: &Path) -> Result<RecordStore> {
        let options =
            LoadOptions::new(&self.config.date_column).with_key_column(&self.config.key_column);
        self.stage("load", PipelineError::Load, || load_records(path, &options))
    }

    /// Load the store attribute table keyed by the configured key column.
    pub fn load_attributes(&self, path: &Path) -> Result<StoreAttributes> {
        self.stage("load", PipelineError::Load, || {
            load_attributes(path, &self.config.key_column, &LoadOptions::default())
        })
    }

    /// Left join store attributes onto the records.
    pub fn merge(&self, records: &RecordStore, attributes: &StoreAttributes) -> Result<RecordStore> {
        self.stage("merge", PipelineError::Merge, || {
            merge_left(records, attributes, &self.config.key_column)
        })
    }

    /// Missing-value audit.
    pub fn audit(&self, store: &RecordStore) -> Result<MissingValueReport> {
        self.stage("audit", PipelineError::Audit, || audit_missing_values(store))
    }

    /// Tag holidays for the configured years; failures degrade the result.
    pub fn tag_holidays(&self, store: RecordStore) -> HolidayTagging {
        self.logger
            .in_scope(|| tag_holidays(store, &self.config.holiday_years))
    }

    /// Column features in derivation order.
    fn column_features(&self) -> Vec<Box<dyn ColumnFeature>> {
        vec![
            Box::new(CumulativeSum::with_config(self.config.cumulative.clone())),
            Box::new(GrowthRate::with_config(self.config.growth.clone())),
        ]
    }

    /// Check that the columns read by the configured features exist.
    ///
    /// Inputs produced by an earlier feature are not required up front. The
    /// monthly column and its filter are only required when reports are
    /// written.
    pub fn check_inputs(&self, store: &RecordStore) -> Result<()> {
        self.stage("feature", PipelineError::Feature, || {
            let features = self.column_features();
            let mut produced: Vec<&str> = Vec::new();
            let mut required: Vec<&str> = Vec::new();
            for feature in &features {
                required.extend(
                    feature
                        .required_columns()
                        .into_iter()
                        .filter(|column| !produced.contains(column)),
                );
                produced.push(feature.output_column());
            }
            let monthly = &self.config.monthly;
            if self.config.write_reports {
                required.extend(
                    [Some(monthly.column.as_str()), monthly.filter_column.as_deref()]
                        .into_iter()
                        .flatten()
                        .filter(|column| !produced.contains(column)),
                );
            }
            for column in required {
                store.column(column)?;
            }
            Ok(())
        })
    }

    /// Sort by date and derive the configured feature columns.
    pub fn derive_features(&self, store: RecordStore) -> Result<RecordStore> {
        self.stage("feature", PipelineError::Feature, || {
            let mut store = store.sort_by_index()?;
            for feature in self.column_features() {
                info!(
                    feature = feature.name(),
                    output = feature.output_column(),
                    "Deriving feature"
                );
                store = feature.derive(&store)?;
            }
            if let Some(column) = &self.config.weekday_column {
                store = add_day_of_week(store, column)?;
            }
            if let Some(column) = &self.config.month_column {
                store = add_month(store, column)?;
            }
            info!(columns = store.width(), "Features derived");
            Ok(store)
        })
    }

    /// Monthly series of the configured column.
    pub fn monthly(&self, store: &RecordStore) -> Result<MonthlySeries> {
        self.stage("feature", PipelineError::Feature, || {
            MonthlyAggregate::with_config(self.config.monthly.clone()).aggregate(store)
        })
    }

    /// Compare the distribution of `column` between two stores.
    pub fn compare(
        &self,
        column: &str,
        (left_label, left): (&str, &RecordStore),
        (right_label, right): (&str, &RecordStore),
    ) -> Result<DistributionComparison> {
        self.stage("feature", PipelineError::Feature, || {
            let left = value_distribution(left, column)?;
            let right = value_distribution(right, column)?;
            Ok(compare_distributions(left_label, &left, right_label, &right))
        })
    }

    /// Write the store to the configured output file.
    pub fn export(&self, store: &RecordStore) -> Result<PathBuf> {
        self.stage("export", PipelineError::Export, || {
            export_store(store, &self.config.output_dir, &self.config.output_file)
        })
    }

    fn write_report(&self, name: &str, report: &dyn Exporter, format: ExportFormat) -> Result<PathBuf> {
        let path = self.config.output_dir.join(name);
        self.stage("export", PipelineError::Export, || {
            report.export_to_file(&path, format)?;
            info!(path = %path.display(), "Report written");
            Ok(path.clone())
        })
    }

    /// Run every stage on the configured files.
    ///
    /// # Errors
    ///
    /// Returns the first fatal stage failure. Feature inputs, including the
    /// monthly report's, are checked before the enriched file is written.
    /// A failed holiday tagging is logged and the run continues without
    /// `is_holiday`; the failure is kept in
    /// [`PipelineOutcome::enrichment_error`].
    pub fn run(&self) -> Result<PipelineOutcome> {
        let config = &self.config;
        self.logger.in_scope(|| {
            info!(train = %config.train_path.display(), "Pipeline started");
        });
        self.stage("config", |err: PipelineError| err, || config.validate())?;

        let records = self.load(&config.train_path)?;
        let rows_loaded = records.height();

        let merged = match &config.store_path {
            Some(path) => {
                let attributes = self.load_attributes(path)?;
                self.merge(&records, &attributes)?
            }
            None => records,
        };

        let missing_values = self.audit(&merged)?;

        let (tagged, enrichment_error) = self.tag_holidays(merged).into_parts();
        let enrichment_error = enrichment_error.map(PipelineError::Enrichment);
        if let Some(err) = &enrichment_error {
            self.logger.in_scope(|| {
                warn!(stage = err.stage(), error = %err, "Continuing without holiday column");
            });
        }

        self.check_inputs(&tagged)?;
        let store = self.derive_features(tagged)?;
        let output = self.export(&store)?;

        let mut builder = RunReportBuilder::new()
            .dataset(dataset_name(&config.train_path))
            .rows_loaded(rows_loaded)
            .exported(store.height(), store.column_names())
            .holidays_tagged(enrichment_error.is_none())
            .missing_values(missing_values.clone())
            .output(output);
        if let Some(err) = &enrichment_error {
            builder = builder.warning(err.to_string());
        }

        let monthly = if config.write_reports {
            let monthly = self.monthly(&store)?;
            builder = builder
                .output(self.write_report(
                    MISSING_VALUES_REPORT,
                    &missing_values,
                    ExportFormat::PrettyJson,
                )?)
                .output(self.write_report(MONTHLY_REPORT, &monthly, ExportFormat::Csv)?)
                .output(config.output_dir.join(RUN_REPORT));
            Some(monthly)
        } else {
            None
        };

        let report = builder.build();
        if config.write_reports {
            let path = config.output_dir.join(RUN_REPORT);
            self.stage("export", PipelineError::Export, || {
                fs::write(&path, report.to_json()?)?;
                Ok(())
            })?;
        }

        self.logger.in_scope(|| {
            info!(
                rows = store.height(),
                columns = store.width(),
                "Pipeline finished"
            );
        });
        Ok(PipelineOutcome {
            store,
            report,
            monthly,
            enrichment_error,
        })
    }
}

fn dataset_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::tests::capture;
    use shopfloor_data::DataError;
    use shopfloor_features::FeatureError;

    const TRAIN: &str = "\
Store,DayOfWeek,Date,Sales,Customers,Open,Promo
1,3,2014-01-01,0,0,0,0
2,3,2014-01-01,0,0,0,0
1,4,2014-01-02,5000,500,1,1
2,4,2014-01-02,6000,600,1,0
1,1,2014-02-03,4000,450,1,1
";

    const STORE: &str = "\
Store,StoreType,Assortment,PromoInterval
1,c,a,
2,a,a,\"Jan,Apr,Jul,Oct\"
";

    fn setup(train: &str) -> (tempfile::TempDir, PipelineConfig) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("train.csv"), train).unwrap();
        fs::write(dir.path().join("store.csv"), STORE).unwrap();
        let config = PipelineConfig {
            train_path: dir.path().join("train.csv"),
            store_path: Some(dir.path().join("store.csv")),
            output_dir: dir.path().join("out"),
            log_dir: dir.path().join("logs"),
            ..PipelineConfig::default()
        };
        (dir, config)
    }

    #[test]
    fn test_full_run() {
        let (_dir, config) = setup(TRAIN);
        let (logger, info_log, error_log) = capture();
        let outcome = Pipeline::new(config.clone(), logger).run().unwrap();

        assert_eq!(outcome.store.height(), 5);
        assert!(outcome.store.has_column("is_holiday"));
        assert!(outcome.store.has_column("StoreType"));
        assert!(outcome.store.is_sorted_by_index().unwrap());
        assert!(outcome.report.holidays_tagged);
        assert_eq!(outcome.report.missing_values.get("PromoInterval").unwrap().missing_count, 3);

        let monthly = outcome.monthly.unwrap();
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly.values[0].value, Some(11000.0));

        for name in [config.output_file.as_str(), MISSING_VALUES_REPORT, MONTHLY_REPORT, RUN_REPORT] {
            assert!(config.output_dir.join(name).exists(), "{name}");
        }
        assert!(info_log.contents().contains("Pipeline finished"));
        assert!(error_log.contents().is_empty());
    }

    #[test]
    fn test_unsupported_year_degrades() {
        let (_dir, mut config) = setup(TRAIN);
        config.holiday_years = vec![1900];
        let (logger, info_log, error_log) = capture();
        let outcome = Pipeline::new(config, logger).run().unwrap();

        assert!(!outcome.report.holidays_tagged);
        assert!(!outcome.store.has_column("is_holiday"));
        assert!(matches!(
            outcome.enrichment_error,
            Some(PipelineError::Enrichment(FeatureError::UnsupportedYear { year: 1900, .. }))
        ));
        assert_eq!(outcome.report.warnings.len(), 1);
        assert!(error_log.contents().contains("Error in adding holiday column"));
        assert!(info_log.contents().contains("Continuing without holiday column"));
    }

    #[test]
    fn test_duplicate_rows_fail_load() {
        let duplicated = format!("{TRAIN}1,4,2014-01-02,5000,500,1,1\n");
        let (_dir, config) = setup(&duplicated);
        let (logger, info_log, error_log) = capture();
        let err = Pipeline::new(config.clone(), logger).run().unwrap_err();

        assert_eq!(err.stage(), "load");
        assert!(error_log.contents().contains("Error in load stage"));
        assert!(!info_log.contents().contains("Pipeline finished"));
        assert!(!config.output_dir.join(&config.output_file).exists());
    }

    #[test]
    fn test_missing_feature_column() {
        let (_dir, mut config) = setup(TRAIN);
        config.cumulative.column = "Revenue".to_string();
        let err = Pipeline::new(config, PipelineLogger::disabled())
            .run()
            .unwrap_err();
        assert!(matches!(err, PipelineError::Feature(FeatureError::Data(_))));
    }

    #[test]
    fn test_missing_filter_column_writes_nothing() {
        let (_dir, mut config) = setup("Store,Date,Sales\n1,2014-01-01,5\n1,2014-01-02,7\n");
        config.store_path = None;
        let (logger, _info_log, error_log) = capture();
        let err = Pipeline::new(config.clone(), logger).run().unwrap_err();

        assert!(matches!(
            &err,
            PipelineError::Feature(FeatureError::Data(DataError::MissingColumn { column, .. }))
                if column == "Open"
        ));
        assert!(error_log.contents().contains("Error in feature stage"));
        assert!(!config.output_dir.join(&config.output_file).exists());

        config.write_reports = false;
        let outcome = Pipeline::new(config, PipelineLogger::disabled()).run().unwrap();
        assert!(outcome.monthly.is_none());
        assert!(outcome.store.has_column("CumulativeSales"));
    }

    #[test]
    fn test_derived_column_cannot_replace_holiday_flag() {
        let (_dir, mut config) = setup(TRAIN);
        config.cumulative.output = "is_holiday".to_string();
        let err = Pipeline::new(config.clone(), PipelineLogger::disabled())
            .run()
            .unwrap_err();
        assert_eq!(err.stage(), "config");
        assert!(!config.output_dir.join(&config.output_file).exists());
    }

    #[test]
    fn test_without_store_file() {
        let (_dir, mut config) = setup(TRAIN);
        config.store_path = None;
        config.write_reports = false;
        config.month_column = Some("Month".to_string());
        let outcome = Pipeline::new(config, PipelineLogger::disabled()).run().unwrap();
        assert!(!outcome.store.has_column("StoreType"));
        assert!(outcome.store.has_column("Month"));
        assert!(outcome.monthly.is_none());
        assert_eq!(outcome.report.outputs.len(), 1);
    }

    #[test]
    fn test_compare_promo() {
        let (dir, config) = setup(TRAIN);
        let pipeline = Pipeline::new(config, PipelineLogger::disabled());
        let train = pipeline.load(&dir.path().join("train.csv")).unwrap();
        let comparison = pipeline
            .compare("Promo", ("train", &train), ("test", &train))
            .unwrap();
        assert_eq!(comparison.rows.len(), 2);
        assert!(comparison.rows.iter().all(|row| row.left == row.right));
    }
}
