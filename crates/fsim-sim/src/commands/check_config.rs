use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use fsim_markov::ParaMc;
use serde_json::{json, Value};

#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    /// YAML or JSON parameter file.
    #[arg(long)]
    pub config: PathBuf,
}

pub fn run(args: &CheckConfigArgs) -> Result<(), Box<dyn Error>> {
    let para = ParaMc::from_path(&args.config)?;
    println!("{}", serde_json::to_string_pretty(&summary(&para))?);
    Ok(())
}

fn summary(para: &ParaMc) -> Value {
    json!({
        "valid": true,
        "lattice": para.lattice.size,
        "n_sublat": para.lattice.n_sublat,
        "beta": para.current_beta(),
        "temperature": para.temperature(),
        "annealing": [para.initial_beta, para.delta_beta, para.final_beta],
        "order": para.order,
        "order_reweight": para.order_reweight,
        "seed": para.seed,
        "counter": para.counter,
    })
}
