use clap::Parser;
use ctg_triage::data::CsvLoader;
use ctg_triage::pipeline::{Pipeline, PipelineConfig};

/// Triage modeling pipeline for three-class cardiotocography data.
#[derive(Parser, Debug)]
#[command(name = "ctg-triage", version, about)]
struct Args {
    /// Path to the CSV file with predictor columns and a class-code column.
    data: std::path::PathBuf,

    /// Name of the response column holding the 1/2/3 class codes.
    #[arg(long, default_value = "NSP")]
    response_column: String,

    /// Fraction of rows used for training.
    #[arg(long, default_value_t = 0.8)]
    train_fraction: f64,

    /// Seed for splitting and resampling.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Target minority probability for each pairwise resampling step.
    #[arg(long, default_value_t = 0.47)]
    minority_probability: f64,

    /// Number of principal components retained.
    #[arg(long, default_value_t = 3)]
    n_components: usize,

    /// Emit the report as JSON instead of plain text.
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> ctg_triage::Result<()> {
    let data = CsvLoader::new()
        .with_response_column(&args.response_column)
        .load(&args.data)?;
    log::info!(
        "loaded {} rows with {} predictors from {}",
        data.n_rows(),
        data.n_features(),
        args.data.display()
    );

    let config = PipelineConfig::new()
        .with_train_fraction(args.train_fraction)
        .with_seed(args.seed)
        .with_minority_probability(args.minority_probability)
        .with_n_components(args.n_components);

    let report = Pipeline::new(config).run(&data)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).map_err(|e| {
                ctg_triage::TriageError::Data(format!("report serialization failed: {e}"))
            })?
        );
    } else {
        println!("{}", report.render());
    }
    Ok(())
}
