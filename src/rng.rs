//! Small uniform random generator for gameplay and visual effects.
//!
//! Particle bursts draw a hundred-plus values inside a single frame, so the
//! generator keeps its own advancing state instead of re-sampling the
//! performance clock. Seeding comes from the platform entropy source
//! (`getrandom`, js backend in the browser); tests construct deterministic
//! instances via [`Rng::from_seed`].

/// xorshift64* generator. Not cryptographic; plenty for shuffles and confetti.
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Seed from platform entropy. Entropy failure is survivable for visual
    /// randomness, so it falls back to a fixed odd constant instead of
    /// surfacing an error.
    pub fn seeded() -> Self {
        let mut buf = [0u8; 8];
        let seed = match getrandom::getrandom(&mut buf) {
            Ok(()) => u64::from_le_bytes(buf),
            Err(_) => 0x9E37_79B9_7F4A_7C15,
        };
        Self::from_seed(seed)
    }

    /// Deterministic construction. A zero seed is remapped — xorshift state
    /// must be non-zero or the stream degenerates to all zeros.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform float in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform float in `[lo, hi)`.
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.unit()
    }

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "index() needs a non-empty range");
        (self.unit() * len as f64) as usize
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}
