//! Insurance Charges Predictor - Main Entry Point
//!
//! Loads every model artifact once, then predicts charges for the customer
//! record given on the command line with one or all models.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use insurance_charges_predictor::{
    config::{AppConfig, DEFAULT_CONFIG_PATH},
    logging::init_logging,
    models::{ModelRegistry, PredictionDispatcher, Selection},
    render::ResultRenderer,
    types::{CustomerRecord, Region, Sex, Smoker},
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "insurance-predictor",
    version,
    about = "Predict insurance charges with several regression models"
)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the models directory from the configuration
    #[arg(long, global = true)]
    models_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Predict charges for one customer
    Predict(PredictArgs),
    /// List registered models in order
    Models,
}

#[derive(Debug, Parser)]
struct PredictArgs {
    /// Model name, or "all" for every registered model
    #[arg(long, default_value = Selection::ALL_LABEL)]
    model: Selection,

    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(18..=100))]
    age: u32,

    #[arg(long, default_value = "male")]
    sex: Sex,

    #[arg(long, default_value_t = 25.0, value_parser = parse_bmi)]
    bmi: f64,

    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=10))]
    children: u32,

    #[arg(long, default_value = "yes")]
    smoker: Smoker,

    #[arg(long, default_value = "southeast")]
    region: Region,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_bmi(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if !(10.0..=60.0).contains(&value) {
        return Err(format!("{} is not in 10.0..=60.0", value));
    }
    Ok(value)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let from_file = cli.config.is_file();
    let mut config = AppConfig::load_from_path(&cli.config)?;
    if let Some(dir) = cli.models_dir {
        config.models.models_dir = dir;
    }

    init_logging(&config.logging)?;
    if from_file {
        info!(path = %cli.config.display(), "Configuration loaded successfully");
    } else {
        warn!(path = %cli.config.display(), "Configuration file not found, using defaults");
    }

    let registry = ModelRegistry::load(&config.models)
        .with_context(|| format!("Failed to load models from {}", config.models.models_dir))?;
    info!(
        "Model registry initialized with {} models: {:?}",
        registry.model_count(),
        registry.model_names()
    );

    match cli.command {
        Command::Models => {
            for name in registry.model_names() {
                println!("{}", name);
            }
        }
        Command::Predict(args) => {
            let record = CustomerRecord::new(
                args.age,
                args.sex,
                args.bmi,
                args.children,
                args.smoker,
                args.region,
            )
            .context("Invalid customer record")?;

            let dispatcher = PredictionDispatcher::new(&registry);
            let result = dispatcher.predict(&record, args.model);
            info!(
                selection = %args.model,
                succeeded = result.success_count(),
                failed = result.failure_count(),
                "Prediction complete"
            );

            let renderer = ResultRenderer::new(&config.display);
            match args.format {
                OutputFormat::Text => println!("{}", renderer.render_text(args.model, &result)),
                OutputFormat::Json => println!("{}", renderer.render_json(&result)?),
            }
        }
    }

    Ok(())
}
