//! `wheelforge simulate`

use std::path::Path;

use anyhow::Result;

use wf_game::GameController;
use wf_link::OfflineLink;

use super::{load_config, print_frequencies, print_summary};

pub fn execute(config: Option<&Path>, spins: Option<usize>, seed: Option<u64>) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(spins) = spins {
        config.simulation_spins = spins;
    }
    if seed.is_some() {
        config.seed = seed;
    }

    let mut controller = GameController::new(&config, Box::new(OfflineLink))?;
    println!("🎡 Simulating {} spins...\n", config.simulation_spins);
    let recorded = controller.run_simulation()?;

    let snapshot = controller.stats().snapshot();
    print_frequencies(&snapshot, controller.table());

    if controller.table().has_dice() {
        println!();
        print_summary("All-Time Stats", &snapshot.summary);
        println!();
        print_summary("Last 5 Stats", &snapshot.recent_summary(controller.table(), 5));
    }

    println!("\n✅ {} spins recorded", recorded);
    Ok(())
}
