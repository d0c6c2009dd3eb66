//! `wheelforge paytable`

use std::path::Path;

use anyhow::Result;

use wf_wheel::PayoutTable;

use super::load_config;

pub fn execute(config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let table = config.build_table()?;
    let paytable = PayoutTable::from_table(&table);

    println!("PAYOUTS & ODDS ({} segments)\n", table.len());
    println!("{:<8} {:>9} {:>8} {:>8}", "Payout", "Segments", "Weight", "Chance");
    for row in &paytable.rows {
        println!(
            "{:<8} {:>9} {:>8.1} {:>7.2}%",
            format!("{}x", row.payout),
            row.segment_count(),
            row.weight,
            row.probability * 100.0
        );
    }

    if !paytable.face_odds.is_empty() {
        println!("\nBet on one face (3 to 1 / 2 to 1 / 1 to 1 / push / lose):\n");
        println!(
            "{:<5} {:>7} {:>7} {:>7} {:>6} {:>6} {:>8}",
            "Face", "Triple", "Double", "Single", "Push", "Lose", "Return"
        );
        for odds in &paytable.face_odds {
            println!(
                "{:<5} {:>7} {:>7} {:>7} {:>6} {:>6} {:>7.1}%",
                odds.face,
                odds.triple,
                odds.double,
                odds.single,
                odds.push,
                odds.lose,
                odds.expected_return() * 100.0
            );
        }
        println!("\n(weights out of {})", paytable.total_weight);
    }
    Ok(())
}
