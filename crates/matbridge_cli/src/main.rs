// SPDX-License-Identifier: MIT OR Apache-2.0
//! `MatBridge` command-line converter
//!
//! Loads a RON scene file, converts the shading network around the seed
//! nodes (or the scene's saved selection) and writes the resulting scene
//! back as RON together with a JSON conversion report.

use clap::Parser;
use matbridge_graph::{MemoryScene, NodeId};
use matbridge_translate::{
    ConversionReport, ConvertError, ConvertSettings, GraphConverter, SchemaError, SettingsError,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "matbridge=info";

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert shading networks between renderer schemas")]
struct Args {
    /// Scene file (RON) holding the source network and destination templates
    #[arg(long)]
    scene: PathBuf,
    /// Settings file (RON). Built-in defaults when omitted.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Source schema, overriding the settings
    #[arg(long)]
    from: Option<String>,
    /// Destination schema, overriding the settings
    #[arg(long)]
    to: Option<String>,
    /// Seed node (repeatable). The scene's selection is used when none are given.
    #[arg(long)]
    seed: Vec<String>,
    /// Where to write the converted scene. Defaults to overwriting `--scene`.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Where to write the JSON report. Printed to stdout when omitted.
    #[arg(long)]
    report: Option<PathBuf>,
}

/// Fatal CLI errors
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse scene {path}: {source}")]
    SceneParse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("Failed to serialize scene: {0}")]
    SceneWrite(#[from] ron::Error),
    #[error("Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
    #[error("Unknown {kind} schema '{name}' (available: {available})")]
    UnknownSchema {
        kind: &'static str,
        name: String,
        available: String,
    },
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Settings from `--settings` with the schema overrides applied, plus the
/// directory relative schema files resolve against
fn settings(args: &Args) -> Result<(ConvertSettings, PathBuf), CliError> {
    let (mut settings, base_dir) = match &args.settings {
        Some(path) => {
            let base_dir = path
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            (ConvertSettings::load(path)?, base_dir)
        }
        None => (ConvertSettings::default(), PathBuf::from(".")),
    };
    if let Some(from) = &args.from {
        settings.source_schema.clone_from(from);
    }
    if let Some(to) = &args.to {
        settings.destination_schema.clone_from(to);
    }
    Ok((settings, base_dir))
}

/// Fail with the registered names when `name` is not among them
fn require_schema<'r>(
    kind: &'static str,
    name: &str,
    registered: impl Iterator<Item = &'r str>,
) -> Result<(), CliError> {
    let registered: Vec<&str> = registered.collect();
    if registered.contains(&name) {
        return Ok(());
    }
    Err(CliError::UnknownSchema {
        kind,
        name: name.to_string(),
        available: registered.join(", "),
    })
}

fn run(args: &Args) -> Result<ConversionReport, CliError> {
    let (settings, base_dir) = settings(args)?;
    let registry = settings.build_registry(&base_dir)?;
    require_schema("source", &settings.source_schema, registry.source_names())?;
    require_schema(
        "destination",
        &settings.destination_schema,
        registry.destination_names(),
    )?;

    let mut scene =
        MemoryScene::from_ron(&read(&args.scene)?).map_err(|source| CliError::SceneParse {
            path: args.scene.clone(),
            source,
        })?;
    tracing::info!(
        "Loaded {} nodes from {}",
        scene.node_count(),
        args.scene.display()
    );

    let converter = GraphConverter::from_settings(&registry, &settings);
    let report = if args.seed.is_empty() {
        converter.convert_selection(&mut scene)?
    } else {
        let seeds: Vec<NodeId> = args.seed.iter().map(NodeId::new).collect();
        converter.convert(&mut scene, &seeds)?
    };

    let output = args.output.as_ref().unwrap_or(&args.scene);
    write(output, &scene.to_ron()?)?;
    tracing::info!("Wrote converted scene to {}", output.display());

    let json = serde_json::to_string_pretty(&report)?;
    match &args.report {
        Some(path) => {
            write(path, &json)?;
            tracing::info!("Wrote report to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(report)
}

/// `RUST_LOG` when set, otherwise info-level logs from the matbridge crates
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&args) {
        Ok(report) if !report.is_complete() => {
            tracing::warn!("Conversion incomplete: {}", report.summary());
        }
        Ok(_) => {}
        Err(e) => {
            tracing::error!("Conversion failed: {e}");
            std::process::exit(1);
        }
    }
}
