//! FpgaView CLI - multi-FPGA design statistics, visualization data and net groups.

use clap::{Args, Parser, Subcommand, ValueEnum};
use fpgaview::report::{write_consolidated_report, write_net_group_report};
use fpgaview::{
    AnalysisOptions, Design, DesignFiles, DesignStats, FpgaViewCore, FpgaViewError, GroupOrder,
    VisualizationData,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::Level;

#[derive(Parser)]
#[command(name = "fpgaview")]
#[command(about = "Multi-FPGA design statistics, visualization data and net grouping", long_about = None)]
#[command(version)]
struct Cli {
    /// Log more detail to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print device, node, net and topology statistics
    Stats {
        #[command(flatten)]
        design: DesignArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: StatsFormat,
    },

    /// Export device graph data for visualization as JSON
    Visualize {
        #[command(flatten)]
        design: DesignArgs,

        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Group nets by device fan-out signature
    Groups {
        #[command(flatten)]
        design: DesignArgs,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Group nets by source device and sink device set, ignoring counts
    Consolidate {
        #[command(flatten)]
        design: DesignArgs,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Load a design and write visualization data and the net-group report
    Run {
        #[command(flatten)]
        design: DesignArgs,

        /// Directory for visualization_data.json and net_groups.txt
        #[arg(long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,

        /// Order groups by numeric device ids instead of signature text
        #[arg(long)]
        numeric_order: bool,
    },
}

#[derive(Args)]
struct DesignArgs {
    /// Directory holding design.info, design.fpga.out, design.net and design.topo
    #[arg(value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Device info file (overrides DIR/design.info)
    #[arg(long, value_name = "FILE")]
    info: Option<PathBuf>,

    /// Placement file (overrides DIR/design.fpga.out)
    #[arg(long, value_name = "FILE")]
    placement: Option<PathBuf>,

    /// Net file (overrides DIR/design.net)
    #[arg(long, value_name = "FILE")]
    nets: Option<PathBuf>,

    /// Topology file (overrides DIR/design.topo)
    #[arg(long, value_name = "FILE")]
    topo: Option<PathBuf>,
}

impl DesignArgs {
    fn files(&self) -> DesignFiles {
        let defaults = DesignFiles::from_dir(&self.dir);
        DesignFiles {
            info: self.info.clone().unwrap_or(defaults.info),
            placement: self.placement.clone().unwrap_or(defaults.placement),
            nets: self.nets.clone().unwrap_or(defaults.nets),
            topology: self.topo.clone().unwrap_or(defaults.topology),
        }
    }

    fn load(&self) -> Result<Design, FpgaViewError> {
        FpgaViewCore::load(&self.files())
    }
}

#[derive(Args)]
struct ReportArgs {
    /// Output file (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: ReportFormat,

    /// Order groups by numeric device ids instead of signature text
    #[arg(long)]
    numeric_order: bool,
}

#[derive(Clone, ValueEnum)]
enum StatsFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[derive(Clone, ValueEnum)]
enum ReportFormat {
    /// Annotated text report
    Text,
    /// JSON output
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Stats { design, format } => handle_stats(&design, format),
        Commands::Visualize { design, output } => handle_visualize(&design, output.as_deref()),
        Commands::Groups { design, report } => handle_groups(&design, &report),
        Commands::Consolidate { design, report } => handle_consolidate(&design, &report),
        Commands::Run {
            design,
            out_dir,
            numeric_order,
        } => handle_run(&design, &out_dir, numeric_order),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn group_order(numeric: bool) -> GroupOrder {
    if numeric {
        GroupOrder::Numeric
    } else {
        GroupOrder::Lexicographic
    }
}

/// Buffered writer for `path`, or stdout.
fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn handle_stats(args: &DesignArgs, format: StatsFormat) -> Result<(), FpgaViewError> {
    let design = args.load()?;
    let stats = DesignStats::from_design(&design);
    match format {
        StatsFormat::Human => output_stats_human(&stats),
        StatsFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}

fn output_stats_human(stats: &DesignStats) {
    println!("--- Design Statistics ---");

    println!("Total FPGAs: {}", stats.device_count);
    for device in &stats.devices {
        println!(
            "  FPGA {}: Max IO = {}, Mapped Nodes = {}",
            device.id, device.max_io, device.node_count
        );
    }

    println!("\nTotal Logical Nodes: {}", stats.node_count);
    for (node, device) in &stats.sample_nodes {
        println!("  Node {} is on FPGA {}", node, device);
    }

    println!("\nTotal Nets: {}", stats.net_count);
    if let Some(net) = &stats.first_net {
        println!(
            "  Example Net {}: Source {} -> {} sinks.",
            net.id, net.source, net.sink_count
        );
    }

    let size = stats.topology.size();
    println!("\nTopology Matrix ({}x{}):", size, size);
    for (i, row) in stats.topology.rows().enumerate() {
        let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        println!("  F{}: {}", i + 1, cells.join(", "));
    }

    println!("-------------------------");
}

fn handle_visualize(args: &DesignArgs, output: Option<&Path>) -> Result<(), FpgaViewError> {
    let design = args.load()?;
    let data = VisualizationData::from_design(&design)?;
    let mut out = open_output(output)?;
    data.write_json(&mut out)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn handle_groups(args: &DesignArgs, report: &ReportArgs) -> Result<(), FpgaViewError> {
    let design = args.load()?;
    let groups = design.group_nets(group_order(report.numeric_order));
    let mut out = open_output(report.output.as_deref())?;
    match report.format {
        ReportFormat::Text => write_net_group_report(&groups, &mut out)?,
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &groups)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn handle_consolidate(args: &DesignArgs, report: &ReportArgs) -> Result<(), FpgaViewError> {
    let design = args.load()?;
    let options = AnalysisOptions {
        group_order: group_order(report.numeric_order),
    };
    let consolidated = FpgaViewCore::analyze(&design, &options).consolidated();
    let mut out = open_output(report.output.as_deref())?;
    match report.format {
        ReportFormat::Text => write_consolidated_report(&consolidated, &mut out)?,
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &consolidated)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn handle_run(args: &DesignArgs, out_dir: &Path, numeric_order: bool) -> Result<(), FpgaViewError> {
    let options = AnalysisOptions {
        group_order: group_order(numeric_order),
    };
    let summary = FpgaViewCore::run(&args.files(), out_dir, &options)?;

    println!("All files parsed successfully!");
    println!("File loading time: {} milliseconds", summary.load_time.as_millis());
    println!("Visualization data written to: {}", summary.visualization.display());
    println!(
        "Net groups information has been written to: {} ({} groups)",
        summary.net_groups.display(),
        summary.group_count
    );
    Ok(())
}
