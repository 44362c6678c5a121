use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use launch_predictor::config::Config;
use launch_predictor::fetch::LaunchApiClient;
use launch_predictor::launch_core::forest::ForestConfig;
use launch_predictor::launch_core::report::{train_test_split, ClassificationReport, TableSummary};
use launch_predictor::launch_core::{features, table, OutcomeModel};
use launch_predictor::{api, state::AppState};

#[derive(Parser)]
#[command(name = "launch-predictor")]
#[command(about = "Launch outcome prediction and launch data dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download launches from the upstream API into the launch table
    Fetch {
        /// Upstream endpoint
        #[arg(long)]
        url: Option<String>,
        /// Output table path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print shape, missing values and outcome balance of the launch table
    Summary {
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
    /// Fit on a train split and report hold-out metrics
    Train {
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Seed for both the split and the forest
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Share of examples held out for testing
        #[arg(long, default_value = "0.2")]
        test_fraction: f64,
    },
    /// Fit on the whole table and predict one payload count
    Predict {
        payload_count: u32,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Start the dashboard API
    Serve {
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Port for HTTP API
        #[arg(short, long)]
        port: Option<u16>,
        #[arg(long)]
        seed: Option<u64>,
        /// Number of trees in the forest
        #[arg(long)]
        trees: Option<usize>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(
        |_| "launch_predictor=debug,launch_core=debug,tower_http=debug".into(),
    ));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Loading launch table from {}", config.data_path.display());
    let state = AppState::load(&config)?;
    let app = api::create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Dashboard API listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn train(config: &Config, seed: u64, test_fraction: f64) -> anyhow::Result<()> {
    let records = table::read_table(&config.data_path)?;
    let examples = features::training_set(&records);
    let (train_set, test_set) = train_test_split(&examples, test_fraction, seed)?;

    let forest = ForestConfig {
        n_trees: config.n_trees,
        seed: Some(seed),
        ..ForestConfig::default()
    };
    let model = OutcomeModel::fit(&train_set, forest)?;

    let truth: Vec<bool> = test_set.iter().map(|e| e.outcome).collect();
    let counts: Vec<u32> = test_set.iter().map(|e| e.payload_count).collect();
    let predicted: Vec<bool> = model
        .predict_batch(&counts)
        .iter()
        .map(|p| p.label.is_success())
        .collect();
    let report = ClassificationReport::from_predictions(&truth, &predicted)?;

    println!(
        "Trained on {} launches, tested on {}",
        train_set.len(),
        test_set.len()
    );
    println!("Accuracy: {:.4}", report.accuracy);
    println!();
    print!("{}", report);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::from_env()?;

    match cli.command {
        Some(Commands::Fetch { url, out }) => {
            if let Some(url) = url {
                config.api_url = url;
            }
            let out = out.unwrap_or_else(|| config.data_path.clone());
            let client = LaunchApiClient::from_config(&config);
            let count = client
                .fetch_to_table(&out)
                .await
                .context("Failed to download launch data")?;
            println!("Saved {} launches to {}", count, out.display());
        }
        Some(Commands::Summary { data }) => {
            let path = data.unwrap_or(config.data_path);
            let summary = TableSummary::from_file(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            print!("{}", summary);
        }
        Some(Commands::Train {
            data,
            seed,
            test_fraction,
        }) => {
            if let Some(data) = data {
                config.data_path = data;
            }
            train(&config, seed, test_fraction)?;
        }
        Some(Commands::Predict {
            payload_count,
            data,
            seed,
        }) => {
            if let Some(data) = data {
                config.data_path = data;
            }
            config.seed = seed.or(config.seed);
            let state = AppState::load(&config)?;
            let prediction = state.predict(payload_count)?;
            println!(
                "Payload count {}: {} (confidence {:.2})",
                payload_count,
                prediction.label.as_str(),
                prediction.confidence
            );
        }
        Some(Commands::Serve {
            data,
            port,
            seed,
            trees,
        }) => {
            if let Some(data) = data {
                config.data_path = data;
            }
            config.port = port.unwrap_or(config.port);
            config.seed = seed.or(config.seed);
            config.n_trees = trees.unwrap_or(config.n_trees);
            serve(config).await?;
        }
        None => serve(config).await?,
    }

    Ok(())
}
