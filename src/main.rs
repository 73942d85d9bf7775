//! # marlinpost binary
//!
//! ```bash
//! # Post-process a job to stdout with default properties
//! marlinpost --job job.json
//!
//! # Custom properties, output file, verbose logging
//! marlinpost --job job.json --properties post.toml --output part.gcode -v
//! ```

use clap::Parser;
use marlinpost::{init_logging, post_process_file, BUILD_DATE, VERSION};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

/// Marlin post-processor for CAM job event streams
#[derive(Parser, Debug)]
#[command(name = "marlinpost")]
#[command(version)]
#[command(about = "Turns a CAM job event stream into Marlin G-code")]
#[command(long_about = None)]
struct Args {
    /// Job event stream (JSON array of events)
    #[arg(short, long, value_name = "FILE")]
    job: PathBuf,

    /// Post properties file (.toml or .json)
    #[arg(short, long, value_name = "FILE")]
    properties: Option<PathBuf>,

    /// Output file; G-code goes to stdout when omitted
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;
    info!("marlinpost {} (built {})", VERSION, BUILD_DATE);

    if let Err(e) = run(&args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: &Args) -> anyhow::Result<()> {
    let program = post_process_file(&args.job, args.properties.as_deref())?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &program)?;
            info!("Wrote {} bytes to {}", program.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(program.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
