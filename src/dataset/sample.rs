// Seeded random sampling.
//
// The same (records, size, seed) triple always yields the same sample, so a
// run can be reproduced without re-downloading or re-shuffling anything.
// Sampled records keep their original relative order.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use super::Record;

/// Default sample size (one embedding request of 1000 texts).
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;

/// Default seed for reproducible sampling.
pub const DEFAULT_SEED: u64 = 42;

/// Draw `size` records without replacement using a seeded RNG.
///
/// If there are `size` records or fewer, all of them are returned unchanged.
pub fn sample_records(records: Vec<Record>, size: usize, seed: u64) -> Vec<Record> {
    if records.len() <= size {
        return records;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, records.len(), size).into_vec();
    picked.sort_unstable();

    debug!(
        population = records.len(),
        size = size,
        seed = seed,
        "Sampled records"
    );

    let mut keep = vec![false; records.len()];
    for i in picked {
        keep[i] = true;
    }

    records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect()
}
