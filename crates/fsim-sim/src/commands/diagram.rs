use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use fsim_diagram::{canonical_hash, diagram_from_json, ring_diagram, Diagram};
use tracing::info;

#[derive(Args, Debug)]
pub struct DiagramArgs {
    /// Order of the generated ring diagram; ignored with `--snapshot`.
    #[arg(long, default_value_t = 1)]
    pub order: usize,
    /// Inverse temperature spanned by the generated diagram.
    #[arg(long, default_value_t = 1.0)]
    pub beta: f64,
    /// JSON diagram snapshot to load instead of generating one.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
    /// Write a Graphviz rendering to this path.
    #[arg(long)]
    pub gv: Option<PathBuf>,
}

pub fn run(args: &DiagramArgs) -> Result<(), Box<dyn Error>> {
    let mut diagram = load(args)?;
    diagram.fix_diagram()?;
    diagram.check_diagram()?;
    print!("{}", diagram.pretty_string());
    println!("hash: {}", canonical_hash(&diagram));
    if let Some(path) = &args.gv {
        diagram.write_graphviz(path)?;
        info!(path = %path.display(), "graphviz written");
    }
    Ok(())
}

fn load(args: &DiagramArgs) -> Result<Diagram, Box<dyn Error>> {
    match &args.snapshot {
        Some(path) => Ok(diagram_from_json(&fs::read_to_string(path)?)?),
        None => Ok(ring_diagram(args.order, args.beta)?),
    }
}
