//! Model file inspection

use std::path::Path;

use anyhow::{Context, Result};

use v2v_core::Action;
use v2v_rl::q_table::argmax;
use v2v_rl::ModelSnapshot;

pub fn inspect(path: &Path) -> Result<()> {
    let snapshot = ModelSnapshot::read(path)
        .with_context(|| format!("Failed to read model from {}", path.display()))?;

    println!("Model: {}", path.display());
    println!("  States:           {}", snapshot.q_table.len());
    println!("  Exploration rate: {:.4}", snapshot.epsilon);
    println!("  Total actions:    {}", snapshot.stats.total_actions);
    println!("  Avoided:          {}", snapshot.stats.collisions_avoided);
    println!("  Success rate:     {:.3}", snapshot.stats.success_rate);

    if snapshot.q_table.is_empty() {
        return Ok(());
    }

    let mut preferred = [0_usize; Action::COUNT];
    for values in snapshot.q_table.values() {
        preferred[argmax(values).index()] += 1;
    }

    println!("\nPreferred action per state:");
    for action in Action::ALL {
        println!("  {:<22} {}", action.name(), preferred[action.index()]);
    }
    Ok(())
}
