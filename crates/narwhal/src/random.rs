//! Seedable randomness used to break positional ties.
//!
//! Coincident nodes have no direction between them, so forces nudge them apart by a tiny random
//! offset ("jitter"). The source is explicit and owned by the [`Simulation`](crate::Simulation)
//! so that two runs with the same seed are bit-identical.

/// A uniform pseudo-random source in `[0, 1)`.
pub trait RandomSource: std::fmt::Debug {
    fn next_f64(&mut self) -> f64;

    /// A tiny signed offset in `[-5e-7, 5e-7)`.
    fn jiggle(&mut self) -> f64 {
        (self.next_f64() - 0.5) * 1e-6
    }
}

/// xorshift64* generator with 53-bit float output.
#[derive(Debug, Clone)]
pub struct XorShift64Star {
    state: u64,
}

impl XorShift64Star {
    pub fn new(seed: u64) -> Self {
        // A zero state is a fixed point of xorshift.
        Self { state: seed.max(1) }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D_u64)
    }
}

impl RandomSource for XorShift64Star {
    fn next_f64(&mut self) -> f64 {
        let u = self.next_u64() >> 11;
        (u as f64) / ((1u64 << 53) as f64)
    }
}

/// Replaces an exactly-zero component with jitter and returns the updated squared length.
pub(crate) fn jiggle_zero(
    x: &mut f64,
    y: &mut f64,
    mut len_sq: f64,
    rng: &mut dyn RandomSource,
) -> f64 {
    if *x == 0.0 {
        *x = rng.jiggle();
        len_sq += *x * *x;
    }
    if *y == 0.0 {
        *y = rng.jiggle();
        len_sq += *y * *y;
    }
    len_sq
}
