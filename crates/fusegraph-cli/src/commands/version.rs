//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - graph-state compilation for linear-optical hardware",
        style("Fusegraph").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  fusegraph-ir        Graphs, optical elements and networks");
    println!("  fusegraph-compile   Cluster decomposition, fusion and assembly");
    println!("  fusegraph-hal       Hardware abstraction layer");
    println!("  fusegraph-runtime   Backend binding, postselection and labels");
    println!("  fusegraph-cli       Command-line interface");
    println!();
    println!(
        "Repository: {}",
        style("https://github.com/fusegraph/fusegraph").underlined()
    );
    println!("License:    {}", style("Apache-2.0").dim());
}
