//! Run command implementation.

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::debug;

use fusegraph_hal::BackendConfig;
use fusegraph_runtime::{QueryOptions, default_registry, to_experiment};

use super::common::{load_program, print_counts, print_distribution};

/// Arguments of the run command.
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub input: String,
    pub backend: String,
    pub platform: String,
    pub token: Option<String>,
    pub endpoint: Option<String>,
    pub shots: Option<u32>,
    pub seed: Option<u64>,
    pub postselect: bool,
    pub raw: bool,
    pub format: String,
}

/// Backend configuration for the requested backend.
fn backend_config(args: &RunArgs) -> BackendConfig {
    let mut config = BackendConfig::new(args.backend.to_lowercase());
    match config.name.as_str() {
        "simulator" => {
            if let Some(seed) = args.seed {
                config = config.with_extra("seed", seed.into());
            }
        }
        "quandela" => {
            config = config.with_extra("platform", args.platform.clone().into());
        }
        _ => {}
    }
    if let Some(token) = &args.token {
        config = config.with_token(token.clone());
    }
    if let Some(endpoint) = &args.endpoint {
        config = config.with_endpoint(endpoint.clone());
    }
    config
}

/// Execute the run command.
pub async fn execute(args: RunArgs) -> Result<()> {
    let json = match args.format.to_lowercase().as_str() {
        "table" => false,
        "json" => true,
        other => anyhow::bail!("Unknown format: '{other}'. Available: table, json"),
    };

    if !json {
        println!(
            "{} Running {} on {}",
            style("→").cyan().bold(),
            style(&args.input).green(),
            style(&args.backend).yellow(),
        );
    }

    let program = load_program(&args.input)?;
    let mut experiment = to_experiment(&program)?;
    if !json {
        println!(
            "  Compiled: {} photons, {} modes, {} elements",
            experiment.photons().len(),
            experiment.network().num_modes(),
            experiment.network().len()
        );
    }

    let registry = default_registry();
    let config = backend_config(&args);
    debug!("Backend config: {:?}", config);
    experiment.bind_config(&registry, config)?;

    let backend = experiment.backend()?;
    let avail = backend.availability().await?;
    if !avail.is_available {
        anyhow::bail!(
            "Backend '{}' is not available{}",
            args.backend,
            avail.status_message.map(|m| format!(": {m}")).unwrap_or_default()
        );
    }

    let options = QueryOptions::new()
        .with_postselect(args.postselect)
        .with_format(!args.raw);

    let spinner = ProgressBar::new_spinner();
    if json {
        spinner.set_draw_target(ProgressDrawTarget::hidden());
    }
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    match args.shots {
        Some(shots) => {
            spinner.set_message(format!("Sampling {shots} shots..."));
            let counts = experiment.sample(shots, options).await;
            spinner.finish_and_clear();
            let counts = counts?;
            if json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                print_counts(&counts);
            }
        }
        None => {
            spinner.set_message("Computing distribution...");
            let dist = experiment.probability_distribution(options).await;
            spinner.finish_and_clear();
            let dist = dist?;
            if json {
                println!("{}", serde_json::to_string_pretty(&dist)?);
            } else {
                print_distribution(&dist);
            }
        }
    }

    Ok(())
}
