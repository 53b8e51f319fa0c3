//! FinGuard Scan - Command line entry point

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use finguard_core::api::UploadResponse;
use finguard_core::constants::{APP_NAME, APP_VERSION};
use finguard_core::logic::dataset::from_csv_path;
use finguard_core::logic::model::{load_model, save_model};
use finguard_core::logic::pipeline;
use finguard_core::{AnalysisConfig, FeatureSet, Result};

#[derive(Parser, Debug)]
#[command(name = "finguard-scan", version, about = "Rank suspicious transactions in a CSV ledger")]
struct Args {
    /// Ledger CSV (date, merchant, category, amount)
    csv: PathBuf,

    /// Expected fraction of anomalous transactions, in (0, 0.5]
    #[arg(long)]
    contamination: Option<f64>,

    /// Number of ranked transactions to print; <= 0 prints all
    #[arg(long, allow_hyphen_values = true)]
    top_n: Option<i64>,

    /// Use only numeric features (amount, weekday)
    #[arg(long)]
    amount_only: bool,

    /// Random seed for the isolation forest
    #[arg(long)]
    seed: Option<u64>,

    /// Write the trained model artifact to this path
    #[arg(long, conflicts_with = "model")]
    save_model: Option<PathBuf>,

    /// Score against a previously saved model instead of training
    #[arg(long)]
    model: Option<PathBuf>,
}

fn build_config(args: &Args) -> AnalysisConfig {
    let mut config = AnalysisConfig::from_env();
    if let Some(contamination) = args.contamination {
        config = config.with_contamination(contamination);
    }
    if let Some(top_n) = args.top_n {
        config = config.with_top_n(top_n);
    }
    if args.amount_only {
        config = config.with_feature_set(FeatureSet::AmountOnly);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    config
}

fn run(args: &Args) -> Result<UploadResponse> {
    let config = build_config(args);
    config.validate()?;

    let dataset = from_csv_path(&args.csv)?;
    let filename = args.csv.display().to_string();

    let report = match &args.model {
        Some(path) => {
            let model = load_model(path)?;
            let batch = pipeline::score(&model, dataset, &config)?;
            pipeline::report(batch, model.contamination(), config.top_n)
        }
        None => {
            let (model, batch) = pipeline::train_and_score(dataset, &config)?;
            if let Some(path) = &args.save_model {
                save_model(&model, path)?;
            }
            pipeline::report(batch, config.contamination, config.top_n)
        }
    };

    Ok(UploadResponse { filename, report })
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);
    let args = Args::parse();

    match run(&args) {
        Ok(response) => match serde_json::to_string_pretty(&response) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Failed to render report: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(if e.is_client_error() { 2 } else { 1 })
        }
    }
}
