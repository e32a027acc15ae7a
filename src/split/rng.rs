//! Seeded shuffling with a pinned generator.
//!
//! Split assignment must be identical across runs and platforms, so the
//! generator and the shuffle are fixed here instead of relying on whatever
//! `rand::rngs::StdRng` happens to be in the current `rand` release.
//!
//! - Generator: SplitMix64, state initialised to the raw seed.
//! - Shuffle: Fisher–Yates from the last index down to 1; the swap partner of
//!   index `i` is `(next_u64() * (i + 1)) >> 64` (128-bit product).

use rand::{Error, RngCore, SeedableRng};

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMix64 {
    state: u64,
}

impl RngCore for SplitMix64 {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for SplitMix64 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self {
            state: u64::from_le_bytes(seed),
        }
    }

    /// The state is the seed itself, without the default PCG scrambling.
    fn seed_from_u64(state: u64) -> Self {
        Self { state }
    }
}

/// Swap partner for index `i`, uniform in `0..=i`.
fn bounded(rng: &mut impl RngCore, i: usize) -> usize {
    ((u128::from(rng.next_u64()) * (i as u128 + 1)) >> 64) as usize
}

/// Shuffle `items` in place with the pinned Fisher–Yates walk.
pub fn shuffle<T>(items: &mut [T], rng: &mut impl RngCore) {
    for i in (1..items.len()).rev() {
        let j = bounded(rng, i);
        items.swap(i, j);
    }
}

/// Shuffled copy of `items` using a generator seeded with `seed`.
pub fn shuffled<T: Clone>(items: &[T], seed: u64) -> Vec<T> {
    let mut rng = SplitMix64::seed_from_u64(seed);
    let mut out = items.to_vec();
    shuffle(&mut out, &mut rng);
    out
}
