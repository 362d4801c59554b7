use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use fsim_estimate::{Estimator, Sample};
use fsim_markov::{MarkovMonitor, ParaMc, C_ESTIMATOR, R_ESTIMATOR};

#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// Checkpoint directory holding the estimator archives.
    #[arg(long)]
    pub checkpoint: PathBuf,
    /// Parameter file the checkpoint was written with.
    #[arg(long)]
    pub config: PathBuf,
}

pub fn run(args: &EstimateArgs) -> Result<(), Box<dyn Error>> {
    let para = ParaMc::from_path(&args.config)?;
    let mut monitor = MarkovMonitor::load(&para, &args.checkpoint)?;
    for estimator in monitor.c_estimator.iter_mut() {
        println!("{}", report_line(C_ESTIMATOR, estimator));
    }
    for estimator in monitor.r_estimator.iter_mut() {
        println!("{}", report_line(R_ESTIMATOR, estimator));
    }
    Ok(())
}

fn report_line<T: Sample>(bundle: &str, estimator: &mut Estimator<T>) -> String {
    let estimate = estimator.estimate();
    format!(
        "{bundle}[{}]: {estimate} (ratio {:.4}, {} flushes)",
        estimator.name(),
        estimator.ratio(),
        estimator.history().len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_line_shows_estimate_and_ratio() {
        let mut estimator = Estimator::<f64>::new("Order1");
        estimator.measure(3.0);
        estimator.add_statistics();
        assert_eq!(
            report_line(R_ESTIMATOR, &mut estimator),
            "rEstimator[Order1]: 1.5+/-0 (ratio 0.0000, 1 flushes)"
        );
    }
}
