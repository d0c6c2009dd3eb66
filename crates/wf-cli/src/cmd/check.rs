//! `wheelforge check-config`

use std::path::Path;

use anyhow::{Context, Result};

use wf_game::GameConfig;

pub fn execute(path: &Path, dump: bool) -> Result<()> {
    let config = GameConfig::load(path)
        .with_context(|| format!("{} is not a valid config", path.display()))?;
    let table = config.build_table()?;
    let timing = config.spin_timing();

    println!("✅ {} is valid\n", path.display());
    println!(
        "  Segments : {} (total weight {})",
        table.len(),
        table.total_weight()
    );
    println!(
        "  Timing   : {:?}, wind-up {}s, spin {}-{}s, {}-{} revolutions",
        timing.profile,
        timing.wind_up_secs,
        timing.min_spin_secs,
        timing.max_spin_secs,
        timing.min_revolutions,
        timing.max_revolutions
    );
    println!(
        "  Broker   : {}:{} ({} → '{}', '{}' → game)",
        config.link.host,
        config.link.port,
        config.link.client_id,
        config.link.state_topic,
        config.link.spin_topic
    );
    println!(
        "  Session  : hold {}s, {} simulation spins, window {}, {} fps, seed {}",
        config.result_hold_secs,
        config.simulation_spins,
        config.window_capacity,
        config.fps,
        config
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "random".to_string())
    );

    if dump {
        println!("\n{}", config.to_yaml()?);
    }
    Ok(())
}
