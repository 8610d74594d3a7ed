use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use vci_import::{ImportConfig, ValidationError, import};

/// Validate VCI containers and rebuild their materials.
#[derive(Parser, Debug)]
#[command(name = "vci-check", version, about)]
struct Cli {
    /// Containers to check (.vci / .glb / .gltf)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// JSON import config; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log loader and material diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    if let Err(e) =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .try_init()
    {
        println!("Warning: Could not initialize logger: {}", e);
    }

    let config = match &cli.config {
        Some(path) => ImportConfig::from_path(path)?,
        None => ImportConfig::default(),
    };

    let mut failed = false;
    for file in &cli.files {
        match import::import_file(file, &config) {
            Ok(imported) => println!(
                "ok {} ({} nodes, {} materials)",
                file.display(),
                imported.asset.graph.len(),
                imported.materials.len()
            ),
            Err(e) => {
                failed = true;
                match e.downcast_ref::<ValidationError>() {
                    Some(invalid) => {
                        println!("error {}: [{}] {}", file.display(), invalid.code(), invalid)
                    }
                    None => println!("error {}: {:#}", file.display(), e),
                }
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
