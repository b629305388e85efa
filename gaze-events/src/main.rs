//! Gaze Events - oculomotor event detection CLI
//!
//! Reads JSON gaze recordings and emits JSON reports.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gaze_events::aoi::Stimulus;
use gaze_events::app::cli::{Cli, Commands, ConfigAction};
use gaze_events::app::config::Config;
use gaze_events::workflow::{fit_class_model, Corpus, Recording, Trajectory};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Logs go to stderr so JSON on stdout stays clean
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    // Execute command
    match cli.command {
        Commands::Analyze {
            input,
            output,
            stimulus,
        } => {
            run_analyze(&input, output.as_deref(), stimulus.as_deref(), config)?;
        }
        Commands::Compare { inputs, output } => {
            run_compare(&inputs, output.as_deref(), config)?;
        }
        Commands::Classify {
            classes,
            input,
            output,
        } => {
            run_classify(classes, &input, output.as_deref(), config)?;
        }
        Commands::Init { force } => {
            run_init(force, &config)?;
        }
        Commands::Config { action } => {
            run_config(action, &config)?;
        }
    }

    Ok(())
}

/// Pretty JSON to a file or stdout
fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn load_stimulus(path: &Path) -> anyhow::Result<Stimulus> {
    let content = std::fs::read_to_string(path)?;
    let rows: Vec<Vec<f64>> = serde_json::from_str(&content)?;
    Ok(Stimulus::from_rows(&rows)?)
}

fn run_analyze(
    input: &Path,
    output: Option<&Path>,
    stimulus: Option<&Path>,
    config: Config,
) -> anyhow::Result<()> {
    let recording = Recording::load(input)?;
    info!("Analyzing {} ({} samples)", recording.name(), recording.len());

    let stimulus = stimulus.map(load_stimulus).transpose()?;
    let mut trajectory = Trajectory::from_recording(recording, config)?;
    let report = trajectory.analyze_with(stimulus.as_ref())?;

    info!(
        "{}: {} fixations, {} saccades, entropy {:.4}",
        report.name,
        report.fixations.len(),
        report.saccades.len(),
        report.entropy
    );
    emit(&report, output)
}

fn run_compare(inputs: &[PathBuf], output: Option<&Path>, config: Config) -> anyhow::Result<()> {
    let recordings = inputs
        .iter()
        .map(|path| Recording::load(path))
        .collect::<Result<Vec<_>, _>>()?;

    let corpus = Corpus::from_recordings(recordings, config)?;
    let report = corpus.analyze()?;

    info!(
        "Compared {} trajectories ({} saccades, {} fixations)",
        report.entropy.len(),
        report.saccades.len(),
        report.fixations.len()
    );
    emit(&report, output)
}

fn run_classify(
    classes: Vec<(String, PathBuf)>,
    input: &Path,
    output: Option<&Path>,
    config: Config,
) -> anyhow::Result<()> {
    let mut labelled: BTreeMap<String, Vec<Recording>> = BTreeMap::new();
    for (class, path) in classes {
        labelled.entry(class).or_default().push(Recording::load(&path)?);
    }

    let model = fit_class_model(labelled, &config)?;

    let mut probe = Trajectory::from_recording(Recording::load(input)?, config)?;
    probe.preprocess()?;
    let scores = model.classify(&probe.transition_model()?)?;

    info!("{} is closest to class '{}'", probe.name(), scores.best);
    emit(&scores, output)
}

fn run_init(force: bool, config: &Config) -> anyhow::Result<()> {
    let config_path = Config::default_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {:?}. Use --force to overwrite.",
            config_path
        );
    }

    config.save_default()?;
    println!("Created config at {:?}", config_path);
    println!("\nConfig content:\n{}", config.to_toml()?);

    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = config.to_toml()?;
            println!("Configuration ({:?}):\n", Config::default_path());
            println!("{}", toml_str);
        }
        ConfigAction::Get { key } => match config.get(&key)? {
            Some(value) => println!("{} = {}", key, value),
            None => anyhow::bail!("Configuration key '{}' not found", key),
        },
        ConfigAction::Reset { force } => {
            let config_path = Config::default_path();

            if config_path.exists() && !force {
                println!("Config exists at {:?}", config_path);
                println!("Use --force to reset to defaults");
                return Ok(());
            }

            Config::default().save_default()?;
            println!("Reset config to defaults at {:?}", config_path);
        }
    }

    Ok(())
}
