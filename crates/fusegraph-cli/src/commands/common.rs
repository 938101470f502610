//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use fusegraph_ir::GraphProgram;
use fusegraph_runtime::{PhotonCount, PhotonDistribution};

/// Load a graph program from a JSON or YAML file.
pub fn load_program(path: &str) -> Result<GraphProgram> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;

    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");

    let program: GraphProgram = match ext.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml_ng::from_str(&source)
            .map_err(|e| anyhow::anyhow!("YAML parse error: {e}"))?,
        _ => serde_json::from_str(&source).map_err(|e| anyhow::anyhow!("JSON parse error: {e}"))?,
    };
    program
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid program: {e}"))?;
    Ok(program)
}

fn bar(fraction: f64) -> String {
    "█".repeat((fraction * 50.0).round() as usize)
}

/// Print a probability distribution with bars.
pub fn print_distribution(dist: &PhotonDistribution) {
    println!("\n{} Distribution ({} outcomes):", style("✓").green().bold(), dist.len());

    let mut sorted: Vec<_> = dist.iter().collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (state, p) in sorted.iter().take(16) {
        println!(
            "  {}: {:>8.6} {}",
            style(state).cyan(),
            p,
            style(bar(*p)).green()
        );
    }
    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }
    if let Some(acceptance) = dist.acceptance() {
        println!("\n  Postselection success: {}", style(format!("{acceptance:.6}")).yellow());
    }
}

/// Print sampled counts with bars.
pub fn print_counts(counts: &PhotonCount) {
    let total = counts.total();
    println!("\n{} Results ({} shots):", style("✓").green().bold(), total);

    let mut sorted: Vec<_> = counts.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));

    for (state, count) in sorted.iter().take(16) {
        let fraction = if total == 0 {
            0.0
        } else {
            *count as f64 / total as f64
        };
        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(state).cyan(),
            count,
            fraction * 100.0,
            style(bar(fraction)).green()
        );
    }
    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }
    if let Some(acceptance) = counts.acceptance() {
        println!("\n  Postselection success: {}", style(format!("{acceptance:.6}")).yellow());
    }
}
