//! Load a benchmark directory and print its demand matrix and net groups.

use fpgaview::prelude::*;
use std::path::Path;

fn main() -> Result<(), FpgaViewError> {
    let dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/case01".to_string());
    let dir = Path::new(&dir);

    if !dir.is_dir() {
        eprintln!("Directory not found: {}", dir.display());
        eprintln!("Usage: cargo run --example summarize [path/to/benchmark]");
        std::process::exit(1);
    }

    let design = FpgaViewCore::load(&DesignFiles::from_dir(dir))?;
    let analysis = FpgaViewCore::analyze(&design, &AnalysisOptions::default());

    println!("Demand between devices (nets crossing each pair):");
    for i in 0..analysis.demand.size() {
        for j in i + 1..analysis.demand.size() {
            let crossings = analysis.demand.get(i, j);
            if crossings > 0 {
                println!("  F{} <-> F{}: {}", i + 1, j + 1, crossings / 2);
            }
        }
    }

    println!("\n{} net groups:", analysis.groups.len());
    for group in &analysis.groups {
        println!("  {:<24} {} nets", group.signature.key(), group.nets.len());
    }
    Ok(())
}
