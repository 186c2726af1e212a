//! Command-line argument definitions for the ISPD processor
//!
//! Three subcommands share one store file: `ingest` decodes input files into
//! the partitioned store, `export` re-encodes the records of a date and
//! `count` reports how many rows each section holds for a date.

use crate::app::services::quality_control::TrimOptions;
use crate::config::ProcessorConfig;
use crate::schema::RecordFormat;
use crate::{Error, Result};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Store snapshot used when `--store` is not given
pub const DEFAULT_STORE_PATH: &str = "ispd_store.json";

/// CLI arguments for the ISPD record processor
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ispd-processor",
    version,
    about = "Ingest, shard and export historical surface-pressure observation records",
    long_about = "Decodes fixed-width composite (IMMA-style) or 41-column delimited \
                  observation records into a partitioned record store keyed by record \
                  date, binds standalone attachment lines to their parent rows by UID, \
                  and writes the records of a date back out with optional ICOADS \
                  quality-control trimming."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors. Overrides verbose settings.
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Decode input files into the record store
    Ingest(IngestArgs),
    /// Write the records of one date, optionally trimmed
    Export(ExportArgs),
    /// Report stored rows per section for one date
    Count(CountArgs),
}

/// Options shared by every subcommand
#[derive(Debug, Clone, ClapArgs)]
pub struct StoreArgs {
    /// JSON snapshot of the record store
    #[arg(long = "store", value_name = "PATH", default_value = DEFAULT_STORE_PATH)]
    pub store: PathBuf,

    /// JSON configuration file; flags override its values
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Lines are 41-column delimited records instead of fixed-width sections
    #[arg(long = "delimited")]
    pub delimited: bool,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct IngestArgs {
    /// Input files, directories or glob patterns
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<String>,

    /// Create or extend the inventory of every batch date
    #[arg(short = 'i', long = "add-inventory")]
    pub add_inventory: bool,

    /// Standalone attachment lines start with a bare UID
    #[arg(short = 'u', long = "lead-uid")]
    pub lead_uid: bool,

    /// Skip attachment rows already stored on their parent row
    #[arg(short = 'e', long = "check-existing")]
    pub check_existing: bool,

    /// Store scaled fields as real values
    #[arg(long = "float")]
    pub float_values: bool,

    /// Rows a partition may hold before rolling over
    #[arg(long = "capacity", value_name = "ROWS")]
    pub partition_capacity: Option<u64>,

    /// Only consider files with this extension when expanding directories
    #[arg(long = "extension", value_name = "EXT", default_value = "imma")]
    pub extension: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ExportArgs {
    /// Record date to export (YYYY-MM-DD)
    #[arg(short = 'd', long = "date", value_name = "DATE", value_parser = parse_date_arg)]
    pub date: NaiveDate,

    /// Apply quality-control trimming to every report
    #[arg(long = "trim")]
    pub trim: bool,

    #[arg(long = "opdn", value_name = "0-2")]
    pub opdn: Option<i64>,
    #[arg(long = "oppt", value_name = "0-1")]
    pub oppt: Option<i64>,
    #[arg(long = "opse", value_name = "0-1")]
    pub opse: Option<i64>,
    #[arg(long = "opcq", value_name = "0-1")]
    pub opcq: Option<i64>,
    #[arg(long = "optf", value_name = "0-3")]
    pub optf: Option<i64>,
    #[arg(long = "op11", value_name = "0-1")]
    pub op11: Option<i64>,

    /// Also write repeatable sections as continuation lines
    #[arg(short = 'a', long = "all")]
    pub include_repeatable: bool,

    /// Output file; standard output when omitted
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct CountArgs {
    /// Record date to count (YYYY-MM-DD)
    #[arg(short = 'd', long = "date", value_name = "DATE", value_parser = parse_date_arg)]
    pub date: NaiveDate,

    /// Include repeatable sections
    #[arg(short = 'a', long = "all")]
    pub include_repeatable: bool,

    /// Print counts as JSON
    #[arg(long = "json")]
    pub json: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

impl Args {
    /// Get the appropriate log level based on verbosity and quiet flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl StoreArgs {
    /// Configuration from the config file (or defaults) with the layout flag applied
    pub fn load_config(&self) -> Result<ProcessorConfig> {
        let mut config = match &self.config_file {
            Some(path) => ProcessorConfig::from_file(path)?,
            None => ProcessorConfig::default(),
        };
        if self.delimited {
            config.input_format = RecordFormat::Delimited;
        }
        Ok(config)
    }

    pub fn store_path(&self) -> &Path {
        &self.store
    }
}

impl IngestArgs {
    pub fn validate(&self) -> Result<()> {
        if self.partition_capacity == Some(0) {
            return Err(Error::configuration("Partition capacity must be greater than 0"));
        }
        if self.extension.is_empty() || self.extension.contains(['/', '.']) {
            return Err(Error::configuration(format!(
                "Invalid file extension '{}'",
                self.extension
            )));
        }
        Ok(())
    }

    /// Layered configuration: file, then command-line flags
    pub fn to_config(&self) -> Result<ProcessorConfig> {
        let mut config = self.store.load_config()?;
        config.add_inventory |= self.add_inventory;
        config.lead_uid |= self.lead_uid;
        config.check_existing |= self.check_existing;
        config.float_values |= self.float_values;
        if let Some(capacity) = self.partition_capacity {
            config.partition_capacity = capacity;
        }
        config.validate()?;
        Ok(config)
    }
}

impl ExportArgs {
    /// Trimming options from the configured defaults and the `--op*` overrides
    pub fn trim_options(&self, defaults: TrimOptions) -> Result<TrimOptions> {
        let mut options = defaults;
        if let Some(v) = self.opdn {
            options = options.with_opdn(v);
        }
        if let Some(v) = self.oppt {
            options = options.with_oppt(v);
        }
        if let Some(v) = self.opse {
            options = options.with_opse(v);
        }
        if let Some(v) = self.opcq {
            options = options.with_opcq(v);
        }
        if let Some(v) = self.optf {
            options = options.with_optf(v);
        }
        if let Some(v) = self.op11 {
            options = options.with_op11(v);
        }
        options.validate()?;
        Ok(options)
    }

    /// Whether any trimming option was given without `--trim`
    pub fn has_stray_options(&self) -> bool {
        !self.trim
            && [self.opdn, self.oppt, self.opse, self.opcq, self.optf, self.op11]
                .iter()
                .any(Option::is_some)
    }
}

/// Parse a `YYYY-MM-DD` record date
pub fn parse_record_date(value: &str) -> Result<NaiveDate> {
    let pattern = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$")
        .map_err(|e| Error::configuration(format!("Invalid date pattern: {}", e)))?;
    let captures = pattern.captures(value.trim()).ok_or_else(|| {
        Error::configuration(format!("Date '{}' is not in YYYY-MM-DD form", value))
    })?;

    let part = |i: usize| captures[i].parse::<u32>().unwrap_or(0);
    let year = i32::try_from(part(1))
        .map_err(|_| Error::configuration(format!("Year out of range in '{}'", value)))?;
    NaiveDate::from_ymd_opt(year, part(2), part(3))
        .ok_or_else(|| Error::configuration(format!("Date '{}' does not exist", value)))
}

fn parse_date_arg(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_record_date(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_date() {
        assert_eq!(
            parse_record_date("1950-01-15").unwrap(),
            NaiveDate::from_ymd_opt(1950, 1, 15).unwrap()
        );
        assert_eq!(
            parse_record_date(" 1899-12-31 ").unwrap(),
            NaiveDate::from_ymd_opt(1899, 12, 31).unwrap()
        );

        assert!(parse_record_date("1950-1-15").is_err());
        assert!(parse_record_date("19500115").is_err());
        assert!(parse_record_date("1950-02-30").is_err());
        assert!(parse_record_date("").is_err());
    }

    #[test]
    fn test_ingest_args_to_config() {
        let args = Args::parse_from([
            "ispd-processor",
            "ingest",
            "-i",
            "-e",
            "--capacity",
            "500",
            "--delimited",
            "data/*.txt",
        ]);
        let Some(Commands::Ingest(ingest)) = args.command else {
            panic!("expected ingest");
        };
        assert_eq!(ingest.files, vec!["data/*.txt"]);

        let config = ingest.to_config().unwrap();
        assert!(config.add_inventory);
        assert!(config.check_existing);
        assert!(!config.lead_uid);
        assert_eq!(config.partition_capacity, 500);
        assert_eq!(config.input_format, RecordFormat::Delimited);
        assert_eq!(ingest.store.store_path(), Path::new(DEFAULT_STORE_PATH));
    }

    #[test]
    fn test_ingest_args_validation() {
        let args = Args::parse_from(["ispd-processor", "ingest", "--capacity", "0", "a.imma"]);
        let Some(Commands::Ingest(ingest)) = args.command else {
            panic!("expected ingest");
        };
        assert!(ingest.validate().is_err());
    }

    #[test]
    fn test_export_trim_options() {
        let args = Args::parse_from([
            "ispd-processor",
            "export",
            "--date",
            "1950-01-15",
            "--trim",
            "--optf",
            "1",
            "-v",
        ]);
        assert_eq!(args.get_log_level(), "info");
        let Some(Commands::Export(export)) = args.command else {
            panic!("expected export");
        };
        assert!(!export.has_stray_options());

        let options = export.trim_options(TrimOptions::default()).unwrap();
        assert_eq!(options.optf, 1);
        assert_eq!(options.opdn, TrimOptions::default().opdn);

        let bad = Args::parse_from(["ispd-processor", "export", "-d", "1950-01-15", "--opdn", "7"]);
        let Some(Commands::Export(bad)) = bad.command else {
            panic!("expected export");
        };
        assert!(bad.has_stray_options());
        assert!(bad.trim_options(TrimOptions::default()).is_err());
    }

    #[test]
    fn test_invalid_date_rejected_by_parser() {
        let result = Args::try_parse_from(["ispd-processor", "count", "--date", "15/01/1950"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level() {
        let args = Args::parse_from(["ispd-processor", "-q", "count", "-d", "1950-01-15"]);
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());

        let args = Args::parse_from(["ispd-processor", "count", "-d", "1950-01-15", "-vvv"]);
        assert_eq!(args.get_log_level(), "trace");
    }
}
