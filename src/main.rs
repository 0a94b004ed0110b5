//! energy-scenarios entry point: CLI wiring and config-driven stage dispatch.

use std::process;

use anyhow::{Context, Result};
use energy_scenarios::cli::{Cli, Command};
use energy_scenarios::config::PipelineConfig;
use energy_scenarios::error::PipelineError;
use energy_scenarios::pipeline;
use energy_scenarios::reporting::print_stage_report;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    // --config takes priority, then --preset, then the baseline default
    let cfg = if let Some(path) = &cli.config {
        PipelineConfig::from_toml_file(path)?
    } else if let Some(name) = &cli.preset {
        PipelineConfig::from_preset(name)?
    } else {
        PipelineConfig::baseline()
    };

    let errors = cfg.validate();
    if !errors.is_empty() {
        return Err(PipelineError::Config(errors).into());
    }
    Ok(cfg)
}

fn run(cli: &Cli) -> Result<()> {
    let cfg = load_config(cli).context("invalid configuration")?;

    let outputs = match cli.command {
        #[cfg(feature = "fetch")]
        Command::Fetch => {
            use energy_scenarios::fetch::{FetchOutcome, download_all};
            let outcomes =
                download_all(&cfg.data.sources, &cfg.data.raw_dir).context("fetch failed")?;
            for o in outcomes {
                match o {
                    FetchOutcome::Skipped(p) => println!("exists      {}", p.display()),
                    FetchOutcome::Downloaded(p) => println!("downloaded  {}", p.display()),
                }
            }
            return Ok(());
        }
        Command::Preprocess => pipeline::run_preprocess(&cfg).context("preprocess failed")?,
        Command::Scenarios => vec![pipeline::run_scenarios(&cfg).context("scenarios failed")?],
        Command::Demand => pipeline::run_demand(&cfg).context("demand failed")?,
        Command::Costs => vec![pipeline::run_costs(&cfg).context("costs failed")?],
        Command::Run => pipeline::run_all(&cfg).context("pipeline failed")?,
        Command::Check => {
            println!("configuration OK");
            for s in &cfg.scenarios {
                println!("scenario {}", s.name);
            }
            return Ok(());
        }
    };

    print_stage_report(&outputs).context("failed to write report")?;
    Ok(())
}

fn main() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env).with_writer(std::io::stderr).init();

    let cli = match Cli::import() {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    info!(command = ?cli.command, "startup");

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
