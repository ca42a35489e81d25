//! rselect Command Line Interface
//!
//! Runs the model selection grid over an ARFF or CSV file, prints the ranked
//! results and answers predictions with the winning model.

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use rselect::api::SelectionEngine;
use rselect::core::{Dataset, Result, SelectError};
use rselect::data::{load_dataset, ArffLoader, CsvLoader};
use rselect::report::RunReport;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "rselect")]
#[command(about = "Cross-validated model selection over a fixed classifier grid")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "rselect contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every candidate and report the winner
    Run(RunArgs),
    /// Select a model, then predict the class of one record
    Predict(PredictArgs),
    /// Describe a dataset
    Info(InfoArgs),
}

#[derive(Args)]
struct DataArgs {
    /// Data file (ARFF or CSV)
    #[arg(long)]
    data: PathBuf,

    /// Class attribute name (defaults to the last attribute)
    #[arg(long)]
    class: Option<String>,
}

#[derive(Args)]
struct GridArgs {
    /// Number of cross-validation folds
    #[arg(short, long, default_value = "10")]
    folds: usize,

    /// Seed for fold assignment and randomized algorithms
    #[arg(short, long, default_value = "1")]
    seed: u64,

    /// Equal-width bins for the discretized representation
    #[arg(short, long, default_value = "10")]
    bins: usize,

    /// Evaluate candidates in parallel
    #[arg(long)]
    parallel: bool,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    grid: GridArgs,

    /// Write a JSON run report
    #[arg(long)]
    report: Option<PathBuf>,

    /// Show a progress line per grid slot
    #[arg(long)]
    progress: bool,
}

#[derive(Args)]
struct PredictArgs {
    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    grid: GridArgs,

    /// Comma separated values for every non-class attribute, `?` for missing
    #[arg(long)]
    values: String,
}

#[derive(Args)]
struct InfoArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Sample values shown per attribute
    #[arg(long, default_value = "5")]
    samples: usize,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Run(args) => run_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Info(args) => info_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn load(args: &DataArgs) -> Result<Dataset> {
    info!("Loading dataset from: {:?}", args.data);
    let Some(class) = &args.class else {
        return load_dataset(&args.data);
    };

    match detect_format(&args.data).as_str() {
        "arff" => ArffLoader::new()
            .with_class_attribute(class)
            .load_file(&args.data),
        "csv" => CsvLoader::new()
            .with_class_attribute(class)
            .load_file(&args.data),
        format => Err(SelectError::InvalidParameter(format!(
            "Unsupported format: {format}. Use an .arff or .csv file"
        ))),
    }
}

fn engine(data: &DataArgs, grid: &GridArgs) -> Result<SelectionEngine> {
    let dataset = load(data)?;
    info!(
        "Loaded '{}': {} instances, {} attributes",
        dataset.relation(),
        dataset.num_instances(),
        dataset.num_attributes()
    );

    Ok(SelectionEngine::new(dataset)
        .with_folds(grid.folds)
        .with_seed(grid.seed)
        .with_bins(grid.bins)
        .with_parallel(grid.parallel))
}

fn run_command(args: RunArgs) -> Result<()> {
    let engine = engine(&args.data, &args.grid)?;
    let show_progress = args.progress;
    engine.run_all(|percent| {
        if show_progress {
            eprintln!("Progress: {percent}%");
        }
    })?;

    let report = RunReport::from_engine(&engine);
    report.print_summary();

    if let Some(path) = &args.report {
        report.save_to_file(path)?;
        info!("Report saved to: {path:?}");
    }

    Ok(())
}

fn predict_command(args: PredictArgs) -> Result<()> {
    let engine = engine(&args.data, &args.grid)?;
    let values: Vec<&str> = args.values.split(',').collect();

    engine.run()?;
    if let Some(name) = engine.best_candidate_name() {
        info!("Predicting with {name}");
    }

    let label = engine.predict_text(&values)?;
    println!("{label}");
    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    let dataset = load(&args.data)?;

    println!("=== Dataset Summary ===");
    println!("Relation: {}", dataset.relation());
    println!("Instances: {}", dataset.num_instances());
    println!("Attributes: {}", dataset.num_attributes());

    println!("\nAttributes:");
    for (index, attr) in dataset.attributes().iter().enumerate() {
        let kind = if attr.is_nominal() { "nominal" } else { "numeric" };
        let marker = if index == dataset.class_index() { " (class)" } else { "" };
        let samples = dataset.sample_values(index, args.samples);
        println!("  {}{marker}: {kind} [{}]", attr.name, samples.join(", "));
    }

    println!("\nClass distribution:");
    let labels = dataset.class_attribute().domain();
    for (label, count) in labels.iter().zip(dataset.class_counts()) {
        println!("  {label}: {count}");
    }

    Ok(())
}

fn detect_format(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(detect_format(&PathBuf::from("test.csv")), "csv");
        assert_eq!(detect_format(&PathBuf::from("iris.ARFF")), "arff");
        assert_eq!(detect_format(&PathBuf::from("test")), "");
    }
}
