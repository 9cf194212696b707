use clap::Parser;
use ripple::cli::{self, Args};
use ripple::prelude::*;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.list_integrators {
        cli::handle_list_integrators();
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "ripple=debug" } else { "ripple=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<(), cli::CliError> {
    let config = cli::load_and_apply_config(args)?;

    if let Ok(toml) = config.to_toml() {
        debug!("=== Current Configuration (TOML) ===\n{}", toml);
    }

    if let Some(path) = &args.save_config {
        config.save(path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let simulation = Simulation::new(&config)?;
    let index = match (config.splash.index, config.splash.seed) {
        (Some(index), _) => index,
        (None, Some(seed)) => SplashRng::from_seed(seed).pick_index(simulation.len()),
        (None, None) => simulation.center_index(),
    };

    info!(
        nodes = simulation.len(),
        index,
        magnitude = config.splash.magnitude,
        "splash"
    );
    simulation.inject_impulse(index, config.splash.magnitude)?;

    // Stand-in for a renderer: observe the surface at its own cadence
    let frame = Duration::from_millis(args.frames_ms.max(1));
    while simulation.is_running() {
        let snapshot = simulation.snapshot();
        info!(
            tick = snapshot.tick,
            max_displacement = snapshot.max_displacement(),
            kinetic_energy = snapshot.kinetic_energy(),
            "frame"
        );
        thread::sleep(frame);
    }

    if let Some(report) = simulation.wait().or_else(|| simulation.controller().last_report()) {
        println!(
            "Run finished after {} ticks ({} ms simulated): {:?}",
            report.ticks,
            report.elapsed.as_millis(),
            report.termination
        );
    }

    let snapshot = simulation.snapshot();
    println!(
        "Final surface: max displacement {:.3}, kinetic energy {:.3}",
        snapshot.max_displacement(),
        snapshot.kinetic_energy()
    );

    Ok(())
}
