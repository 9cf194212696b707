//! Command line interface for ripple

use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{ConfigError, SimulationConfig};
use crate::error::SimulationError;
use crate::physics::Scalar;
use crate::physics::integrators::IntegratorRegistry;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to load configuration: {0}")]
    ConfigLoad(#[from] ConfigError),

    #[error("invalid integrator: {0}")]
    InvalidIntegrator(SimulationError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("RIPPLE_BUILD_DATE"),
    ")"
);

/// Ripple - splash a one-dimensional water surface and watch it settle
#[derive(Parser, Debug, Default)]
#[command(version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Width of the sampled surface
    #[arg(long, value_name = "UNITS")]
    pub width: Option<u32>,

    /// Distance between neighboring nodes
    #[arg(long, value_name = "UNITS")]
    pub sample_interval: Option<u32>,

    /// Spring stiffness
    #[arg(short = 't', long, value_name = "VALUE")]
    pub tension: Option<Scalar>,

    /// Velocity decay per tick
    #[arg(short = 'd', long, value_name = "VALUE")]
    pub dampening: Option<Scalar>,

    /// Neighbor coupling fraction in [0, 1]
    #[arg(long, value_name = "VALUE")]
    pub spread: Option<Scalar>,

    /// Diffusion sweeps per tick
    #[arg(long, value_name = "COUNT")]
    pub iterations: Option<usize>,

    /// Integrator (e.g., semi_implicit_euler, explicit_euler)
    #[arg(short = 'i', long, value_name = "TYPE")]
    pub integrator: Option<String>,

    /// Node to splash (defaults to the centre node)
    #[arg(short = 'x', long, value_name = "INDEX")]
    pub index: Option<usize>,

    /// Velocity given to the splashed node
    #[arg(short = 'm', long, value_name = "VALUE", allow_negative_numbers = true)]
    pub magnitude: Option<Scalar>,

    /// Seed for a random splash position (ignored when --index is given)
    #[arg(short = 's', long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Interval between observed frames, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub frames_ms: u64,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// List available integrators and exit
    #[arg(long)]
    pub list_integrators: bool,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,
}

/// Prints available integrators for --list-integrators
pub fn handle_list_integrators() {
    let registry = IntegratorRegistry::default();
    println!("Available integrators:");
    for name in registry.list_available() {
        println!("  - {name}");
    }

    let aliases = registry.list_aliases();
    if !aliases.is_empty() {
        println!("\nAliases:");
        for (alias, target) in aliases {
            println!("  - {alias} -> {target}");
        }
    }
}

/// Loads configuration from file or user config, then applies command-line overrides
pub fn load_and_apply_config(args: &Args) -> Result<SimulationConfig, CliError> {
    let config = match &args.config {
        Some(path) => {
            println!("Loading configuration from: {}", path.display());
            SimulationConfig::load(path)?
        }
        None => SimulationConfig::load_from_user_config(),
    };

    apply_overrides(config, args)
}

/// Applies command-line overrides and validates the result
pub fn apply_overrides(
    mut config: SimulationConfig,
    args: &Args,
) -> Result<SimulationConfig, CliError> {
    if let Some(width) = args.width {
        config.field.width = width;
    }
    if let Some(interval) = args.sample_interval {
        config.field.sample_interval = interval;
    }
    if let Some(tension) = args.tension {
        config.field.tension = tension;
    }
    if let Some(dampening) = args.dampening {
        config.field.dampening = dampening;
    }
    if let Some(spread) = args.spread {
        config.field.spread = spread;
    }
    if let Some(iterations) = args.iterations {
        config.field.diffusion_iterations = iterations;
    }

    if let Some(integrator) = &args.integrator {
        IntegratorRegistry::default()
            .create(integrator)
            .map_err(CliError::InvalidIntegrator)?;
        config.field.integrator = integrator.clone();
    }

    if let Some(index) = args.index {
        config.splash.index = Some(index);
    }
    if let Some(magnitude) = args.magnitude {
        config.splash.magnitude = magnitude;
    }
    if let Some(seed) = args.seed {
        config.splash.seed = Some(seed);
    }

    config.validate()?;
    Ok(config)
}
