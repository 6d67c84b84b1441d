//! Counter-based random streams for the thermal noise.
//!
//! Every (seed, step, cell) triple owns its own ChaCha key, so the noise a
//! cell sees never depends on how cells are scheduled across threads.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generator handed to the collision of one cell at one step.
pub type CellRng = ChaCha8Rng;

/// build the random stream of a single cell at a single step
pub fn cell_rng(seed: u64, step: u64, cell: usize) -> CellRng {
    let mut key = [0u8; 32];
    key[..8].copy_from_slice(&seed.to_le_bytes());
    key[8..16].copy_from_slice(&step.to_le_bytes());
    key[16..24].copy_from_slice(&(cell as u64).to_le_bytes());
    ChaCha8Rng::from_seed(key)
}
