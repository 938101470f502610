//! Compile command implementation.

use std::fs;

use anyhow::{Context, Result};
use console::style;

use fusegraph_compile::{CompiledCircuit, compile};

use super::common::load_program;

/// Execute the compile command.
pub fn execute(input: &str, output: Option<&str>, format: &str) -> Result<()> {
    let program = load_program(input)?;
    let circuit = compile(&program)?;

    match format.to_lowercase().as_str() {
        "text" => print_summary(input, &circuit),
        "json" => println!("{}", serde_json::to_string_pretty(&circuit)?),
        other => anyhow::bail!("Unknown format: '{other}'. Available: text, json"),
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&circuit)?;
        fs::write(path, json).with_context(|| format!("Failed to write file: {path}"))?;
        if format == "text" {
            println!("  Output: {}", style(path).green());
        }
    }

    Ok(())
}

fn print_summary(input: &str, circuit: &CompiledCircuit) {
    println!("{} Compiling {}", style("→").cyan().bold(), style(input).green());

    println!("\n  Clusters ({}):", circuit.clusters.len());
    for cluster in &circuit.clusters {
        println!("    {cluster}");
    }

    println!("\n  Photons ({}):", circuit.num_photons());
    for photon in &circuit.photons {
        let angle = photon
            .angle
            .map_or_else(|| "-".to_string(), |a| format!("{a}π"));
        println!(
            "    {:>3}  node {:<4} {:<8} angle {}",
            photon.id,
            photon.node.to_string(),
            photon.role.to_string(),
            angle
        );
    }

    if !circuit.fusions.is_empty() {
        println!("\n  Fusions ({}):", circuit.fusions.len());
        for fusion in &circuit.fusions {
            println!("    {fusion}");
        }
    }

    if !circuit.corrections.is_empty() {
        println!("\n  Corrections ({}):", circuit.corrections.len());
        for correction in &circuit.corrections {
            println!("    photon {} ← clifford {}", correction.photon, correction.index);
        }
    }

    println!("\n  Postselection: {}", circuit.postselection());
    println!("\n{}", circuit.network);
    println!(
        "{} Compilation complete: {} modes, {} elements",
        style("✓").green().bold(),
        circuit.network.num_modes(),
        circuit.network.len()
    );
}
