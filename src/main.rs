use accel_insights::config::{
    capture_variables, ProcessingConfig, VariableStore, DEFAULT_STORE_FILE, KEY_ACC_X, KEY_ACC_Y,
    KEY_ACC_Z, KEY_DATA_SHEET, KEY_LOG_SAMPLE, KEY_SHIFT_FROM, KEY_SHIFT_TO, KEY_UNIX_TIME,
    VARIABLES,
};
use accel_insights::logger::init_logger;
use accel_insights::pipeline::{process, ProcessReport};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "accel_insights")]
#[command(about = "Velocity, displacement and charts from logged accelerometer data", long_about = None)]
struct Args {
    /// Variable store file
    #[arg(long, global = true, default_value = DEFAULT_STORE_FILE)]
    store: PathBuf,

    /// Debug logging (RUST_LOG still wins)
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture the data sheet, column letters and baseline range.
    /// Anything not given as a flag is prompted for.
    SetVariables {
        /// CSV (or .csv.gz) file with the logged readings
        #[arg(long)]
        data_sheet: Option<String>,

        /// Column letter of the UNIX timestamp
        #[arg(long)]
        unix_time: Option<String>,

        /// Column letter of the sample count
        #[arg(long)]
        log_sample: Option<String>,

        #[arg(long)]
        acc_x: Option<String>,

        #[arg(long)]
        acc_y: Option<String>,

        #[arg(long)]
        acc_z: Option<String>,

        /// First reading (1-based) of the stationary baseline
        #[arg(long)]
        shift_from: Option<String>,

        /// Last reading (1-based, inclusive) of the stationary baseline
        #[arg(long)]
        shift_to: Option<String>,
    },

    /// Build the processed table and charts from the stored variables
    Process {
        /// Where the table, charts and manifest are written
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Print the run report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the stored variables
    ShowVariables,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    match args.command {
        Command::SetVariables {
            data_sheet,
            unix_time,
            log_sample,
            acc_x,
            acc_y,
            acc_z,
            shift_from,
            shift_to,
        } => {
            let preset: BTreeMap<&'static str, String> = [
                (KEY_DATA_SHEET, data_sheet),
                (KEY_UNIX_TIME, unix_time),
                (KEY_LOG_SAMPLE, log_sample),
                (KEY_ACC_X, acc_x),
                (KEY_ACC_Y, acc_y),
                (KEY_ACC_Z, acc_z),
                (KEY_SHIFT_FROM, shift_from),
                (KEY_SHIFT_TO, shift_to),
            ]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect();

            let mut store = VariableStore::load(&args.store)
                .with_context(|| format!("reading {}", args.store.display()))?;
            let stdin = io::stdin();
            capture_variables(&mut store, &preset, &mut stdin.lock(), &mut io::stdout())
                .context("capturing variables")?;
            store
                .save(&args.store)
                .with_context(|| format!("writing {}", args.store.display()))?;
        }
        Command::Process { out_dir, json } => {
            check_out_dir(&out_dir)?;
            let store = VariableStore::load(&args.store)
                .with_context(|| format!("reading {}", args.store.display()))?;
            let config = ProcessingConfig::from_store(&store)?;
            info!("processing {}", config.data_sheet.display());
            let report = process(&config, &out_dir)
                .with_context(|| format!("processing {}", config.data_sheet.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::ShowVariables => {
            let store = VariableStore::load(&args.store)
                .with_context(|| format!("reading {}", args.store.display()))?;
            for (key, _) in VARIABLES {
                match store.get(key) {
                    Some(value) => println!("  {key:<16} {value}"),
                    None => println!("  {key:<16} (not set)"),
                }
            }
        }
    }

    Ok(())
}

fn check_out_dir(out_dir: &Path) -> Result<()> {
    if out_dir.exists() && !out_dir.is_dir() {
        bail!("--out-dir {} exists and is not a directory", out_dir.display());
    }
    Ok(())
}

fn print_report(report: &ProcessReport) {
    println!("Processed {} readings from {}", report.readings, report.source);
    if let (Some(first), Some(last)) = (&report.first_reading, &report.last_reading) {
        println!("  Span:        {first} .. {last} ({:.1} s)", report.elapsed_seconds);
    }
    println!("  Table:       {} ({} rows)", report.table_path.display(), report.rows_written);
    println!("  Shift value: {:.4} m/s²", report.shift_value);
    for (label, value) in report.insights.labelled() {
        println!("  {label:<26} {value:.4}");
    }
    for chart in &report.charts {
        println!("  Chart:       {}", chart.display());
    }
}
