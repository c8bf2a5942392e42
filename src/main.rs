// ICN committee CLI entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use icn_committee::{load_genesis, run_scenario, Scenario};
use icn_config::NodeConfig;
use tracing::info;

#[derive(Parser, Debug)]
#[clap(author, version, about = "ICN committee governance engine")]
struct Cli {
    /// Configuration file; falls back to ICN_* environment variables
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse and validate a committee genesis file
    ValidateGenesis {
        /// Genesis YAML file
        file: PathBuf,
    },

    /// Execute a scenario and print its events, then the final state
    Run {
        /// Scenario YAML file
        scenario: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<NodeConfig> {
    match path {
        Some(path) => NodeConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => NodeConfig::from_env().context("Failed to load configuration from environment"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    icn_core::init_tracing(&config.log_level);

    match cli.command {
        Commands::ValidateGenesis { file } => {
            let genesis = load_genesis(&file)
                .with_context(|| format!("Invalid genesis file {}", file.display()))?;
            println!(
                "Genesis is valid: {} committees, {} proposals, {} votes, next proposal id {}",
                genesis.committees.len(),
                genesis.proposals.len(),
                genesis.votes.len(),
                genesis.next_proposal_id
            );
        }
        Commands::Run { scenario } => {
            info!("Running scenario {}", scenario.display());
            let parsed = Scenario::from_file(&scenario)
                .with_context(|| format!("Failed to load scenario {}", scenario.display()))?;
            let report = run_scenario(&parsed, &config).context("Scenario execution failed")?;

            for block in &report.blocks {
                for record in block.event_records() {
                    println!("{}", serde_json::to_string(&record)?);
                }
            }
            println!("{}", serde_json::to_string_pretty(&report.genesis)?);
        }
    }

    Ok(())
}
