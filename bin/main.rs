//! Quaybn runner
//!
//! Builds the default terminal network, compares the standard scenarios
//! against the baseline and ranks the drivers of delay.

use std::error::Error;
use std::process;

use quaybn_core::catalog::Equipment;
use quaybn_core::network::{
    age_var, CRANE_OPERABLE, DELAY, EFFICIENCY, EQUIPMENT_CAPACITY, OPERATOR_AVAILABILITY,
    PM_MAJOR, RAIN, VISIBILITY, WIND,
};
use quaybn_core::operations::DELAY_STATES;
use quaybn_core::{
    build_network, default_scenarios, evaluate_scenarios, percent_delta, sensitivity_sweep,
    Evidence, Logger, RunConfig, SimRng, TerminalConfig, BASELINE,
};
use quaybn_maths::sampling::sample_batch;

fn main() {
    Logger::get_logger();
    if let Err(err) = run() {
        log::error!("{}", err);
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let conf = RunConfig::from_env()?;
    log::info!("{:?}", conf);
    let net = build_network(&TerminalConfig::default())?;
    let mut rng = SimRng::new(conf.seed);

    let metrics = [EFFICIENCY, EQUIPMENT_CAPACITY, DELAY];
    let table = evaluate_scenarios(&net, &default_scenarios(), &metrics, conf.samples, &mut rng)?;
    println!(
        "Expected state, {} draws per scenario (seed {})\n{}",
        conf.samples, conf.seed, table
    );
    println!("Change from baseline (%)\n{}", percent_delta(&table, BASELINE)?);

    let drivers: Vec<String> = [
        WIND,
        RAIN,
        VISIBILITY,
        CRANE_OPERABLE,
        PM_MAJOR,
        OPERATOR_AVAILABILITY,
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .chain(Equipment::ALL.iter().map(|&eq| age_var(eq)))
    .collect();
    println!("Delay sensitivity");
    for row in sensitivity_sweep(&net, &drivers, DELAY, conf.samples, &mut rng)? {
        println!(
            "{:<24}  min {:>8.4}  max {:>8.4}  swing {:>8.4}",
            row.variable, row.min, row.max, row.swing
        );
    }

    let storm = Evidence::new().with(WIND, 3);
    let draws = conf.samples.min(2_000);
    let batch = sample_batch(&net, draws, Some(&storm), &conf.sampler(), &mut rng)?;
    let mut counts = [0_usize; DELAY_STATES];
    for s in &batch {
        if let Some(state) = s.state_of(&net, DELAY) {
            counts[state - 1] += 1;
        }
    }
    println!("\nDelay given storm wind ({} matching draws)", batch.len());
    for (i, c) in counts.iter().enumerate() {
        println!("  level {}: {:.4}", i + 1, *c as f64 / batch.len().max(1) as f64);
    }
    Ok(())
}
