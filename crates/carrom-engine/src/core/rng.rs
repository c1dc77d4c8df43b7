//! Seedable xorshift64 generator used for AI jitter and penalty placement.
//! Deterministic per seed so matches and tests can be replayed.

/// Seedable pseudo-random number generator (xorshift64).
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform index in `[0, upper_bound)`. Returns 0 for an empty range.
    pub fn next_index(&mut self, upper_bound: usize) -> usize {
        if upper_bound == 0 {
            return 0;
        }
        (self.next_u64() % upper_bound as u64) as usize
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        // 24 high bits fit the f32 mantissa exactly.
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform float in `[lo, hi)`.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    /// Uniform float in `[-spread, spread)`.
    pub fn jitter(&mut self, spread: f32) -> f32 {
        self.range(-spread, spread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_deterministic() {
        let mut rng1 = Rng::new(42);
        let mut rng2 = Rng::new(42);
        for _ in 0..10 {
            assert_eq!(rng1.next_index(1000), rng2.next_index(1000));
        }
    }

    #[test]
    fn rng_zero_seed_handled() {
        let mut rng = Rng::new(0);
        let _ = rng.next_index(100);
    }

    #[test]
    fn floats_stay_in_range() {
        let mut rng = Rng::new(7);
        for _ in 0..1000 {
            let f = rng.next_f32();
            assert!((0.0..1.0).contains(&f), "f={}", f);
            let r = rng.range(0.7, 1.1);
            assert!(r >= 0.7 && r <= 1.1, "r={}", r);
            let j = rng.jitter(0.15);
            assert!(j >= -0.15 && j <= 0.15, "j={}", j);
        }
    }

    #[test]
    fn empty_index_range_is_zero() {
        let mut rng = Rng::new(3);
        assert_eq!(rng.next_index(0), 0);
    }
}
