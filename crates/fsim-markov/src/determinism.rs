use fsim_core::derive_substream_seed;

const RESUME_SALT: u64 = 0xA5A5_A5A5_A5A5_A5A5;

/// Seed of an independent trajectory within an ensemble.
pub fn trajectory_seed(master_seed: u64, trajectory_index: usize) -> u64 {
    derive_substream_seed(master_seed, trajectory_index as u64)
}

/// Seed used when a trajectory is resumed from a checkpoint written after
/// `counter` steps. Differs from the fresh-start seed so a resumed run does
/// not replay the random stream it already consumed.
pub fn resume_seed(master_seed: u64, trajectory_index: usize, counter: u64) -> u64 {
    derive_substream_seed(trajectory_seed(master_seed, trajectory_index) ^ RESUME_SALT, counter)
}
