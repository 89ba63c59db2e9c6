use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use weather::inspect::{log_profile, profile};
use weather::plot::render_all;
use weather::report::{render_report, summarize, write_report};
use weather::{
    GeneratorConfig, OutputPaths, PipelineError, Resolution, SimpleLogger, aggregate, clean,
    generate, read_raw_csv, write_cleaned_csv, write_json, write_raw_csv, write_summary_csv,
    write_summary_parquet,
};

static LOGGER: SimpleLogger = SimpleLogger;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level for output
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a synthetic raw weather CSV with seasonal patterns and gaps
    Generate {
        /// Output CSV path
        #[arg(short, long, default_value = "data/raw_weather.csv")]
        output: PathBuf,

        /// Number of consecutive days to generate
        #[arg(long, default_value_t = 365 * 2)]
        days: usize,

        /// First day of the series (YYYY-MM-DD)
        #[arg(long, default_value = "2023-01-01")]
        start_date: NaiveDate,

        /// Probability that a gappy cell is left empty
        #[arg(long, default_value_t = 0.03)]
        missing_rate: f64,

        /// Seed for reproducible output (random if not specified)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Clean, summarize and plot a raw weather CSV, then write the report
    Run {
        /// Raw input CSV file
        #[arg(short, long, default_value = "data/raw_weather.csv")]
        input: PathBuf,

        /// Directory for cleaned data, summaries and plots
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Markdown report path
        #[arg(long, default_value = "report.md")]
        report: PathBuf,

        /// Skip rendering PNG plots
        #[arg(long, default_value_t = false)]
        no_plots: bool,
    },
}

fn main() -> Result<(), PipelineError> {
    let total_start = Instant::now();
    log::set_logger(&LOGGER).map_err(|e| PipelineError::Data(e.to_string()))?;

    let args = Args::parse();
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }

    match args.command {
        Command::Generate {
            output,
            days,
            start_date,
            missing_rate,
            seed,
        } => {
            let config = GeneratorConfig {
                days,
                start_date,
                missing_rate,
                seed,
            };
            debug!("Generator configuration: {:?}", config);
            run_generate(&config, &output)?;
        }
        Command::Run {
            input,
            output_dir,
            report,
            no_plots,
        } => {
            let paths = OutputPaths::in_dir(&output_dir, report);
            run_pipeline(&input, &paths, !no_plots)?;
        }
    }

    println!("\nTotal runtime: {:.2?}", total_start.elapsed());
    Ok(())
}

fn run_generate(config: &GeneratorConfig, output: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let table = generate(config)?;
    write_raw_csv(&table, output)?;
    println!(
        "Generated {} days of sample data at {}",
        table.len(),
        output.display()
    );
    Ok(())
}

fn run_pipeline(input: &Path, paths: &OutputPaths, plots: bool) -> Result<(), PipelineError> {
    println!("Weather Report! Rust Weather Data Pipeline");
    debug!("Output paths: {:?}", paths);
    paths.create_dirs()?;

    println!("Loading data from {}...", input.display());
    let load_start = Instant::now();
    let raw = read_raw_csv(input)?;
    log_profile(&raw, &profile(&raw));
    println!(
        "Loaded {} rows in {:.2?}",
        raw.len(),
        load_start.elapsed()
    );

    println!("Cleaning data...");
    let processing_start = Instant::now();
    let series = clean(&raw);
    let (monthly, yearly) = aggregate(&series);
    let processing_time = processing_start.elapsed();
    println!(
        "Data processing completed in {:.2?} | {} records, {} months, {} years",
        processing_time,
        series.len(),
        monthly.len(),
        yearly.len()
    );

    if plots {
        let plot_start = Instant::now();
        let written = render_all(&series, &monthly, &paths.plots_dir)?;
        println!(
            "Rendered {} plots in {:.2?}",
            written.len(),
            plot_start.elapsed()
        );
    } else {
        debug!("Plot rendering disabled");
    }

    let io_start = Instant::now();
    write_cleaned_csv(&series, &paths.cleaned_csv)?;
    write_summary_csv(&monthly, Resolution::Monthly, &paths.monthly_csv)?;
    write_summary_csv(&yearly, Resolution::Yearly, &paths.yearly_csv)?;
    write_summary_parquet(&monthly, Resolution::Monthly, &paths.monthly_parquet)?;
    write_summary_parquet(&yearly, Resolution::Yearly, &paths.yearly_parquet)?;
    println!("Saved cleaned data and summaries in {:.2?}", io_start.elapsed());
    debug!("  - {}", paths.cleaned_csv.display());
    debug!("  - {}", paths.monthly_csv.display());
    debug!("  - {}", paths.yearly_csv.display());

    let summary = summarize(&series, &monthly, &yearly);
    write_json(&summary, &paths.summary_json)?;
    write_report(&render_report(&summary, paths), &paths.report)?;
    println!("Report saved: {}", paths.report.display());

    println!("\nFinished successfully!");
    Ok(())
}
