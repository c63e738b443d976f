use clap::{ArgGroup, Parser, Subcommand};
use rasbfile::{
    load_flows, BFile, Block, FragilityResult, FragilityResults, StructureLookup,
    UnknownStructurePolicy,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "bfile", about = "Inspect and amend HEC-RAS b-files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every block, breach structure and outlet series
    Inspect {
        input: PathBuf,
    },
    /// Decode and re-encode, reporting whether the bytes survive unchanged
    Check {
        input: PathBuf,
    },
    /// Set structure failure elevations
    #[command(group(ArgGroup::new("names").required(true).args(["lookup", "connections"])))]
    #[command(group(ArgGroup::new("values").required(true).args(["fragility", "structure"])))]
    AmendBreach {
        input: PathBuf,
        /// JSON object mapping structure name to SNET id
        #[arg(long)]
        lookup: Option<PathBuf>,
        /// JSON array of geometry connection names, in structure-table order
        #[arg(long)]
        connections: Option<PathBuf>,
        /// Fragility-curve results JSON
        #[arg(short, long)]
        fragility: Option<PathBuf>,
        /// Single structure to amend (with --elevation)
        #[arg(short, long, requires = "elevation")]
        structure: Option<String>,
        #[arg(short, long)]
        elevation: Option<f64>,
        /// Log and skip structures missing from the lookup or b-file
        #[arg(long)]
        skip_unknown: bool,
        /// Write here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the flows of an outlet time series
    UpdateOutlet {
        input: PathBuf,
        /// Substring of the outlet series name
        #[arg(short, long)]
        series: String,
        /// JSON array of flows, or hydrograph rows of [time, flow]
        #[arg(short, long)]
        flows: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {

        // ── Inspect ──────────────────────────────────────────────────────────
        Commands::Inspect { input } => {
            let bf = BFile::open(&input)?;
            println!("B-file: {}", input.display());
            println!("{:>5}  {:<12} Header", "Block", "Kind");
            for (i, block) in bf.blocks().iter().enumerate() {
                let header = match block {
                    Block::Default(b)          => b.header().unwrap_or("").to_owned(),
                    Block::BreachData(b)       => format!("{} structure(s)", b.structures().len()),
                    Block::OutletTimeSeries(t) => t.name().to_owned(),
                };
                println!("{:>5}  {:<12} {}", i, block.kind(), header);
            }

            println!();
            println!("{:>6} {:>6} {:>6} {:>6} {:>6} {:>10}",
                     "SNET", "Rows", "MW", "SPB", "Prog", "Fail elev");
            for s in bf.breach_structures() {
                let l = s.layout();
                println!("{:>6} {:>6} {:>6} {:>6} {:>6} {:>10}",
                    s.structure_id(), l.row_span, l.mass_wasting, l.simplified_physical,
                    l.progression_ordinates, s.failure_elevation_cell().as_str().trim());
            }

            for ts in bf.outlet_series() {
                println!();
                println!("Outlet '{}': {} rows, {} trailing line(s)",
                         ts.name(), ts.declared_row_count(), ts.trailing_lines().len());
            }
        }

        // ── Check ────────────────────────────────────────────────────────────
        Commands::Check { input } => {
            let original = std::fs::read(&input)?;
            let encoded  = BFile::decode(&original)?.encode();
            if encoded == original {
                println!("{}: round-trip identical ({} bytes)", input.display(), original.len());
            } else {
                let at = original.iter().zip(&encoded).position(|(a, b)| a != b)
                    .unwrap_or_else(|| original.len().min(encoded.len()));
                return Err(format!("{}: re-encoded bytes differ from offset {}",
                                   input.display(), at).into());
            }
        }

        // ── AmendBreach ──────────────────────────────────────────────────────
        Commands::AmendBreach {
            input, lookup, connections, fragility, structure, elevation, skip_unknown, output,
        } => {
            let table = match (lookup, connections) {
                (Some(path), _)    => StructureLookup::from_json_file(path)?,
                (None, Some(path)) => StructureLookup::from_connections_file(path)?,
                (None, None)       => return Err("one of --lookup or --connections is required".into()),
            };
            info!(structures = table.len(), "Loaded structure lookup");
            let mut bf = BFile::open(&input)?.with_lookup(table);

            let results = match (fragility, structure, elevation) {
                (Some(path), _, _) => FragilityResults::from_json_file(path)?,
                (None, Some(name), Some(value)) => FragilityResults {
                    results: vec![FragilityResult {
                        name,
                        failure_elevation: value,
                    }],
                },
                _ => return Err("--fragility or --structure with --elevation is required".into()),
            };
            let policy = if skip_unknown {
                UnknownStructurePolicy::Skip
            } else {
                UnknownStructurePolicy::Abort
            };
            let report = bf.apply_failure_elevations(&results, policy)?;

            let dest = output.unwrap_or(input);
            bf.save(&dest)?;
            println!("Amended {} structure(s), skipped {} → {}",
                     report.applied.len(), report.skipped.len(), dest.display());
            for name in &report.skipped {
                println!("  skipped  {}", name);
            }
        }

        // ── UpdateOutlet ─────────────────────────────────────────────────────
        Commands::UpdateOutlet { input, series, flows, output } => {
            let values = load_flows(&flows)?;
            let mut bf = BFile::open(&input)?;
            bf.amend_outlet_flows(&series, &values)?;
            let dest = output.unwrap_or(input);
            bf.save(&dest)?;
            println!("Replaced {} flow value(s) in '{}' → {}",
                     values.len(), series, dest.display());
        }
    }

    Ok(())
}
