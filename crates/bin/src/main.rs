//! Shopfloor CLI binary.
//!
//! Provides command-line interface for the Shopfloor sales pipeline.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use shopfloor::data::RecordStore;
use shopfloor::features::{Aggregation, HolidayCalendar, MonthlyAggregateConfig};
use shopfloor::output::{ExportFormat, Exporter, TableView};
use shopfloor::{Pipeline, PipelineConfig, PipelineLogger};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shopfloor")]
#[command(about = "Shopfloor: retail sales cleaning and feature enrichment", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory receiving info.log and error.log
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    /// Echo log events to stderr (filtered by RUST_LOG, default info)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, merge, audit, enrich and export a sales file
    Run {
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Transactional sales file
        #[arg(long)]
        train: Option<PathBuf>,

        /// Store attribute file
        #[arg(long, conflicts_with = "no_store")]
        store: Option<PathBuf>,

        /// Skip the merge with store attributes
        #[arg(long)]
        no_store: bool,

        /// Output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Output file name
        #[arg(long)]
        output_file: Option<String>,

        /// Holiday calendar years (repeatable)
        #[arg(long = "holiday-year")]
        holiday_years: Vec<i32>,

        /// Do not write report files
        #[arg(long)]
        no_reports: bool,
    },

    /// Missing-value audit of a CSV file
    Audit {
        /// Sales file
        file: PathBuf,

        /// Store attribute file to merge before auditing
        #[arg(long)]
        store: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Monthly aggregate of a column
    Monthly {
        /// Sales file
        file: PathBuf,

        /// Column to aggregate
        #[arg(long, default_value = "Sales")]
        column: String,

        /// Aggregation (sum or mean)
        #[arg(long, default_value = "sum")]
        aggregation: Aggregation,

        /// Only count records whose flag column is set, e.g. Open
        #[arg(long)]
        filter: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List US federal holidays
    Holidays {
        /// Calendar years (repeatable)
        #[arg(long = "year", default_values_t = [2014])]
        years: Vec<i32>,

        /// Print as Markdown
        #[arg(long)]
        markdown: bool,
    },

    /// Compare the distribution of a column between two files
    Promo {
        /// Training file
        train: PathBuf,

        /// Test file
        test: PathBuf,

        /// Column to compare
        #[arg(long, default_value = "Promo")]
        column: String,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Fixed-width text table
    Table,
    /// Markdown table
    Markdown,
    /// CSV
    Csv,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    Pretty,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let logger = if cli.verbose {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        PipelineLogger::with_console(&cli.log_dir, filter)?
    } else {
        PipelineLogger::to_directory(&cli.log_dir)?
    };

    match cli.command {
        Commands::Run {
            config,
            train,
            store,
            no_store,
            output_dir,
            output_file,
            holiday_years,
            no_reports,
        } => {
            let mut config = match config {
                Some(path) => PipelineConfig::from_json_file(path)?,
                None => PipelineConfig::default(),
            };
            if let Some(train) = train {
                config.train_path = train;
            }
            if store.is_some() || no_store {
                config.store_path = store;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(file) = output_file {
                config.output_file = file;
            }
            if !holiday_years.is_empty() {
                config.holiday_years = holiday_years;
            }
            if no_reports {
                config.write_reports = false;
            }
            config.log_dir = cli.log_dir;
            config.validate()?;
            run_pipeline(config, logger)?;
        }
        Commands::Audit {
            file,
            store,
            format,
        } => {
            let pipeline = Pipeline::new(PipelineConfig::default(), logger);
            let mut records = pipeline.load(&file)?;
            if let Some(path) = store {
                let attributes = pipeline.load_attributes(&path)?;
                records = pipeline.merge(&records, &attributes)?;
            }
            let report = pipeline.audit(&records)?;
            print!("{}", render(&report, format)?);
        }
        Commands::Monthly {
            file,
            column,
            aggregation,
            filter,
            format,
        } => {
            let config = PipelineConfig {
                monthly: MonthlyAggregateConfig {
                    column,
                    aggregation,
                    filter_column: filter,
                },
                ..PipelineConfig::default()
            };
            let pipeline = Pipeline::new(config, logger);
            let store = sorted(&pipeline, &file)?;
            let series = pipeline.monthly(&store)?;
            print!("{}", render(&series, format)?);
        }
        Commands::Holidays { years, markdown } => {
            let calendar = HolidayCalendar::us(&years)?;
            if markdown {
                print!("{}", calendar.to_markdown());
            } else {
                print!("{}", calendar.to_ascii_table());
            }
        }
        Commands::Promo {
            train,
            test,
            column,
            format,
        } => {
            let pipeline = Pipeline::new(PipelineConfig::default(), logger);
            let train = pipeline.load(&train)?;
            let test = pipeline.load(&test)?;
            let comparison = pipeline.compare(&column, ("train", &train), ("test", &test))?;
            print!("{}", render(&comparison, format)?);
        }
    }

    Ok(())
}

fn run_pipeline(config: PipelineConfig, logger: PipelineLogger) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Processing {}...", config.train_path.display()));

    let log_dir = config.log_dir.clone();
    match Pipeline::new(config, logger).run() {
        Ok(outcome) => {
            pb.finish_with_message(format!(
                "Enriched {} rows x {} columns",
                outcome.store.height(),
                outcome.store.width()
            ));
            for path in &outcome.report.outputs {
                println!("  wrote {}", path.display());
            }
            if let Some(err) = &outcome.enrichment_error {
                println!(
                    "  {err}, see {}",
                    log_dir.join(shopfloor::ERROR_LOG).display()
                );
            }
            Ok(())
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            Err(e.into())
        }
    }
}

/// Load a file and sort it by date.
fn sorted(pipeline: &Pipeline, file: &Path) -> Result<RecordStore, Box<dyn std::error::Error>> {
    Ok(pipeline.load(file)?.sort_by_index()?)
}

fn render<T: Exporter + TableView>(
    value: &T,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let text = match format {
        OutputFormat::Table => value.to_ascii_table(),
        OutputFormat::Markdown => value.to_markdown(),
        OutputFormat::Csv => value.export_to_string(ExportFormat::Csv)?,
        OutputFormat::Json => value.export_to_string(ExportFormat::Json)? + "\n",
        OutputFormat::Pretty => value.export_to_string(ExportFormat::PrettyJson)? + "\n",
    };
    Ok(text)
}
