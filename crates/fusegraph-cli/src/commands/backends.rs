//! Backends command implementation.

use anyhow::Result;
use console::style;

use fusegraph_hal::{Backend, BackendConfig};
use fusegraph_runtime::default_registry;

/// Environment variable holding the Quandela cloud token.
const QUANDELA_TOKEN: &str = "QUANDELA_TOKEN";

fn print_capabilities(backend: &dyn Backend) {
    let caps = backend.capabilities();
    println!("    Modes: {}", caps.max_modes);
    println!("    Photons: {}", caps.max_photons);
    println!("    Max shots: {}", caps.max_shots);
    let mut queries = vec!["samples"];
    if caps.supports_probabilities {
        queries.push("probabilities");
    }
    println!("    Queries: {}", queries.join(", "));
}

/// Execute the backends command.
pub async fn execute() -> Result<()> {
    println!("{} Available backends:\n", style("Fusegraph").cyan().bold());

    let registry = default_registry();
    for name in registry.available_backends() {
        let backend = match registry.create(BackendConfig::new(&name)) {
            Ok(backend) => backend,
            Err(e) => {
                println!("  {} {} ({e})", style("○").dim(), style(&name).dim());
                println!();
                continue;
            }
        };

        if name == "simulator" {
            let available = backend.availability().await?.is_available;
            println!(
                "  {} {} (local)",
                if available {
                    style("●").green()
                } else {
                    style("○").red()
                },
                style(&name).bold(),
            );
            print_capabilities(backend.as_ref());
        } else if std::env::var(QUANDELA_TOKEN).is_ok_and(|t| !t.is_empty()) {
            let available = backend.availability().await.is_ok_and(|a| a.is_available);
            println!(
                "  {} {} ({})",
                if available {
                    style("●").green()
                } else {
                    style("○").yellow()
                },
                style(&name).bold(),
                backend.capabilities().name
            );
            print_capabilities(backend.as_ref());
            if !available {
                println!("    Status: offline or maintenance");
            }
        } else {
            println!(
                "  {} {} (not configured)",
                style("○").dim(),
                style(&name).dim()
            );
            println!("    Set {QUANDELA_TOKEN} environment variable to enable");
        }
        println!();
    }

    Ok(())
}
