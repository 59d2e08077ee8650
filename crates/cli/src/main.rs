//! tf - resolve configuration inputs into one namespace and print it

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::{ConfigLoader, Settings};
use resolver::Pipeline;
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod args;

use args::{process_env, Args};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    tokio::select! {
        result = run(&args) => result,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to install CTRL+C signal handler")?;
            info!("Shutdown signal received");
            bail!("Interrupted before the namespace was resolved");
        }
    }
}

async fn run(args: &Args) -> Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;
    debug!(fetch_timeout_seconds = settings.fetch_timeout_seconds, "Settings loaded");

    let seed = args.seed(process_env())?;

    let config = ConfigLoader::load(&args.config, &seed)
        .with_context(|| format!("Failed to load configuration {}", args.config.display()))?;
    info!(
        path = %args.config.display(),
        inputs = config.inputs.len(),
        merges = config.merges.len(),
        "Configuration loaded"
    );

    let pipeline = Pipeline::new(&settings).context("Failed to create pipeline")?;
    let namespace = pipeline
        .resolve(&config, seed)
        .await
        .context("Failed to resolve inputs")?;

    let output = codec::encode(&namespace.into_value(), args.output_format)
        .with_context(|| format!("Failed to print namespace as {}", args.output_format))?;
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}

/// Initialize logging on stderr; stdout only carries the namespace
fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "info" } else { "warn" };
    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
    }

    debug!(log_format = %log_format, "Logging initialized");
    Ok(())
}
