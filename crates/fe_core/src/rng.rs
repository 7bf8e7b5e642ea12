// crates/fe_core/src/rng.rs
//
// Deterministic, string-seeded RNG for roster sampling.
// Focus: stable seeding from an opaque seed string, unbiased range generation,
// word-index accounting.
//
// • The seed string is folded to 32 bits by a fixed xmur3-style hash.
// • The stream is a mulberry32 bit-mixing generator over that 32-bit state.
// • Integer-only ranges: unbiased via rejection sampling.
// • Cross-platform determinism: explicit wrapping arithmetic, no OS entropy.

use rand_core::{impls, Error, RngCore};

/// Fold an opaque seed string into a 32-bit generator state (xmur3 mix).
pub fn hash_seed(seed: &str) -> u32 {
    let bytes = seed.as_bytes();
    let mut h: u32 = 1_779_033_703 ^ (bytes.len() as u32);
    for &b in bytes {
        h = (h ^ u32::from(b)).wrapping_mul(3_432_918_353);
        h = h.rotate_left(13);
    }
    h = (h ^ (h >> 16)).wrapping_mul(2_246_822_507);
    h = (h ^ (h >> 13)).wrapping_mul(3_266_489_909);
    h ^ (h >> 16)
}

/// Seed for the `attempt`-th derived stream of `base` (paired generation).
pub fn derive_seed(base: &str, attempt: u32) -> String {
    format!("{base}/{attempt}")
}

/// Seeded mulberry32 stream.
#[derive(Debug, Clone)]
pub struct SeedRng {
    state: u32,
    words_consumed: u64,
}

impl SeedRng {
    /// Construct from the opaque seed string carried by an `AllocationSpec`.
    #[inline]
    pub fn from_seed_str(seed: &str) -> Self {
        Self::from_state(hash_seed(seed))
    }

    #[inline]
    pub fn from_state(state: u32) -> Self {
        Self { state, words_consumed: 0 }
    }

    /// Total number of 32-bit words drawn so far (saturating).
    /// This is a **draw counter**, not a byte counter.
    #[inline]
    pub fn words_consumed(&self) -> u64 {
        self.words_consumed
    }

    /// One mulberry32 step. This is the only place where the counter is advanced.
    #[inline]
    fn next_word(&mut self) -> u32 {
        self.words_consumed = self.words_consumed.saturating_add(1);
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Unbiased integer in [0, n) using rejection sampling with the standard
    /// "threshold" trick. Returns `None` if `n == 0`.
    ///
    /// Let `threshold = 2^32 mod n` (computed via `wrapping_neg() % n`).
    /// Accept `x` if `x >= threshold`; then `x % n` is uniformly distributed.
    #[inline]
    pub fn gen_range(&mut self, n: u32) -> Option<u32> {
        if n == 0 {
            return None;
        }
        let threshold = n.wrapping_neg() % n;
        loop {
            let x = self.next_word();
            if x >= threshold {
                return Some(x % n);
            }
        }
    }

    /// Choose a single index in `[0, n)`; returns `None` if `n == 0`.
    #[inline]
    pub fn choose_index(&mut self, n: usize) -> Option<usize> {
        let n = u32::try_from(n).unwrap_or(u32::MAX);
        self.gen_range(n).map(|v| v as usize)
    }
}

impl RngCore for SeedRng {
    fn next_u32(&mut self) -> u32 {
        self.next_word()
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
