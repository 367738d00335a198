use envsim::cli::{self, Command};
use envsim::SimulationConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let run = match cli::parse_args(std::env::args().skip(1)) {
        Ok(Command::Run(run)) => run,
        Ok(Command::Help) => {
            println!("{}", cli::usage());
            return Ok(());
        }
        Err(err) => {
            println!("Error: {}", cli::error_message(&err));
            println!("Please use argument -h for help: $ envsim -h");
            return Ok(());
        }
    };
    for &species in &run.initialized {
        println!(
            "Initialized {} to: {}",
            species.plural().to_lowercase(),
            run.sizes.get(species)
        );
    }

    let config = SimulationConfig::new().with_populations(run.sizes);
    let report = launch(config)?;
    log::info!(
        "finished after {} ticks ({})",
        report.summary.ticks,
        report.summary.termination
    );
    Ok(())
}

#[cfg(feature = "gui")]
fn launch(
    config: SimulationConfig,
) -> Result<envsim::SimulationReport, Box<dyn std::error::Error>> {
    Ok(envsim::renderer::run_windowed(config)?)
}

#[cfg(not(feature = "gui"))]
fn launch(
    config: SimulationConfig,
) -> Result<envsim::SimulationReport, Box<dyn std::error::Error>> {
    use envsim::HeadlessRenderer;
    use envsim::constants::HEADLESS_REPORT_INTERVAL;

    let renderer = HeadlessRenderer::new(HEADLESS_REPORT_INTERVAL);
    Ok(envsim::run_simulation(&config, renderer)?)
}
