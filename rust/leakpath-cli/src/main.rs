use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use leakpath_cli::probe::{load_grid, probe, render_text};
use leakpath_core::GridCell;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "leakpath-probe", version, about = "Find an air leak path in a ship grid description")]
struct Args {
    /// Grid description (JSON)
    #[arg(long = "grid", value_name = "PATH")]
    grid: PathBuf,

    /// Start cell as x,y,z
    #[arg(long = "start", value_name = "X,Y,Z", allow_hyphen_values = true)]
    start: GridCell,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_ansi(false).json().with_writer(std::io::stderr).init();

    let args = Args::parse();
    info!(?args, "starting probe");

    let grid = load_grid(&args.grid)?;
    let report = probe(&grid, args.start);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }
    Ok(())
}
