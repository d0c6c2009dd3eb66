//! Subcommands and shared report printing

pub mod check;
pub mod paytable;
pub mod run;
pub mod simulate;

use std::path::Path;

use anyhow::{Context, Result};

use wf_game::GameConfig;
use wf_wheel::{DiceSummary, SegmentTable, StatisticsSnapshot};

/// Config file if given, defaults otherwise
pub fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

fn percent(part: f64) -> f64 {
    part * 100.0
}

/// Observed vs expected frequency per segment
pub fn print_frequencies(snapshot: &StatisticsSnapshot, table: &SegmentTable) {
    println!(
        "{:>4}  {:<14} {:>6} {:>9} {:>9}",
        "#", "Segment", "Hits", "Observed", "Expected"
    );
    for f in snapshot.frequencies(table) {
        println!(
            "{:>4}  {:<14} {:>6} {:>8.1}% {:>8.1}%",
            f.segment.0,
            f.label,
            f.count,
            percent(f.observed),
            percent(f.expected)
        );
    }
    println!("Total spins: {}", snapshot.total_spins());
}

/// Chuck-a-Luck summary table
pub fn print_summary(title: &str, summary: &DiceSummary) {
    println!("── {} ({} spins) ──", title, summary.spins);
    if summary.dice_rolled > 0 {
        for face in 1..=6u8 {
            println!(
                "  {:<11}: {:>4} | {:5.1}%",
                face,
                summary.face_hits[(face - 1) as usize],
                percent(summary.face_share(face))
            );
        }
    }
    println!(
        "  {:<11}: {:>4} | {:5.1}%",
        "House Wins",
        summary.house_wins,
        percent(summary.house_share())
    );
    println!(
        "  {:<11}: {:>4} | {:5.1}%",
        "Spin Again",
        summary.spin_agains,
        percent(summary.spin_again_share())
    );
    let combos = summary.combos();
    if combos > 0 {
        for (label, hits) in [
            ("Singles", summary.singles),
            ("Doubles", summary.doubles),
            ("Triples", summary.triples),
        ] {
            println!(
                "  {:<11}: {:>4} | {:5.1}%",
                label,
                hits,
                percent(hits as f64 / combos as f64)
            );
        }
    }
}
