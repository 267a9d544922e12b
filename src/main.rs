use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use healthpredictx_lib::api::{self, ApiContext};
use healthpredictx_lib::config::{self, AppConfig};
use healthpredictx_lib::db::{AuthStore, ClinicalStore};
use healthpredictx_lib::generation::{OllamaGenerator, TextGenerator};
use healthpredictx_lib::models::Disease;
use healthpredictx_lib::prediction::training::{self, DEFAULT_SEED};
use healthpredictx_lib::prediction::ModelSet;

#[derive(Parser)]
#[command(name = "healthpredictx", version)]
#[command(about = "Clinical decision-support demo: records, disease predictions and a health chatbot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web UI and JSON API
    Serve {
        /// Address to listen on (overrides HPX_BIND)
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Directory holding the SQLite files (overrides HPX_DATA_DIR)
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,

        /// Directory holding the model files (overrides HPX_MODELS_DIR)
        #[arg(long, value_name = "DIR")]
        models_dir: Option<PathBuf>,

        /// Ollama base URL (overrides HPX_OLLAMA_URL)
        #[arg(long)]
        ollama_url: Option<String>,

        /// Ollama model name (overrides HPX_OLLAMA_MODEL)
        #[arg(long)]
        ollama_model: Option<String>,
    },

    /// Train one disease classifier from a CSV dataset
    Train {
        #[arg(long, value_enum)]
        disease: DiseaseArg,

        /// Dataset in the public CSV layout for this disease
        #[arg(long, value_name = "CSV")]
        csv: PathBuf,

        /// Output model file (defaults to <models-dir>/<disease>.json)
        #[arg(long, value_name = "OUTPUT")]
        out: Option<PathBuf>,

        /// Directory for the default output path (overrides HPX_MODELS_DIR)
        #[arg(long, value_name = "DIR")]
        models_dir: Option<PathBuf>,

        /// Random seed for the train/test split
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DiseaseArg {
    Diabetes,
    HeartDisease,
    Parkinsons,
}

impl From<DiseaseArg> for Disease {
    fn from(arg: DiseaseArg) -> Self {
        match arg {
            DiseaseArg::Diabetes => Disease::Diabetes,
            DiseaseArg::HeartDisease => Disease::HeartDisease,
            DiseaseArg::Parkinsons => Disease::Parkinsons,
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() -> ExitCode {
    healthpredictx_lib::init_tracing();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult {
    let mut config = AppConfig::from_env()?;

    match cli.command {
        Commands::Serve {
            bind,
            data_dir,
            models_dir,
            ollama_url,
            ollama_model,
        } => {
            // CLI flags win over the environment
            if let Some(v) = bind {
                config.bind = v;
            }
            if let Some(v) = data_dir {
                config.data_dir = v;
            }
            if let Some(v) = models_dir {
                config.models_dir = v;
            }
            if let Some(v) = ollama_url {
                config.ollama_url = v;
            }
            if let Some(v) = ollama_model {
                config.ollama_model = v;
            }
            serve(config)
        }
        Commands::Train {
            disease,
            csv,
            out,
            models_dir,
            seed,
        } => {
            let disease = Disease::from(disease);
            let models_dir = models_dir.unwrap_or(config.models_dir);
            let out = out.unwrap_or_else(|| config::model_path(&models_dir, disease.as_str()));
            train(disease, &csv, &out, seed)
        }
    }
}

fn serve(config: AppConfig) -> CliResult {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    // Migrations run here, before the first request
    let clinical = ClinicalStore::new(config.clinical_db_path());
    let auth = AuthStore::new(config.auth_db_path());
    drop(clinical.open()?);
    drop(auth.open()?);
    tracing::info!(data_dir = %config.data_dir.display(), "Stores ready");

    let models = ModelSet::load(&config.models_dir)?;

    // The blocking HTTP client must be built, and finally dropped, outside
    // the async runtime.
    let ollama = OllamaGenerator::new(
        &config.ollama_url,
        &config.ollama_model,
        config.generation_timeout_secs,
    )?;
    match ollama.is_model_available() {
        Ok(true) => tracing::info!(model = %config.ollama_model, "Generator model available"),
        Ok(false) => tracing::warn!(
            model = %config.ollama_model,
            "Generator model not pulled; suggestions will use the fallback text"
        ),
        Err(e) => tracing::warn!(error = %e, "Generator unreachable; suggestions will use the fallback text"),
    }
    let generator: Arc<dyn TextGenerator> = Arc::new(ollama);

    let ctx = ApiContext::new(clinical, auth, models, generator.clone());

    let runtime = tokio::runtime::Runtime::new()?;
    let served = runtime.block_on(api::serve_until_ctrl_c(ctx, config.bind));
    drop(runtime);
    drop(generator);

    served?;
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}

fn train(disease: Disease, csv: &Path, out: &Path, seed: u64) -> CliResult {
    let model = training::train_from_csv(disease, csv, out, seed)?;
    println!(
        "{} model written to {} (test accuracy {:.3}, {} train / {} test rows)",
        disease.display_name(),
        out.display(),
        model.metadata.test_accuracy,
        model.metadata.train_rows,
        model.metadata.test_rows,
    );
    Ok(())
}
