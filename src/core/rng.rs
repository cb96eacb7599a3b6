use rand::{Error, Rng, RngCore, SeedableRng};
use rand_distr::Geometric;

/// Seed used when none is given, and in place of 0 (a fixed point of xorshift)
pub const DEFAULT_SEED: u32 = 1;

/// Floor applied to uniforms and rates before taking logs or dividing
const MIN_POSITIVE: f64 = 1e-9;

/// 32-bit xorshift generator (shifts 13, 17, 5).
///
/// Small and fully reproducible: the whole state is the last output, so two
/// generators built from the same seed produce the same stream forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    pub fn new(seed: u32) -> Self {
        let state = if seed == 0 { DEFAULT_SEED } else { seed };
        Self { state }
    }

    /// Draw a uniform value in [0, 1]
    pub fn next_unit(&mut self) -> f64 {
        self.next_u32() as f64 / u32::MAX as f64
    }
}

impl Default for XorShift32 {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl RngCore for XorShift32 {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for XorShift32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state as u32)
    }
}

/// Sample an Exponential(rate) duration in hours: `-ln(u) / rate`
pub fn exponential(rng: &mut XorShift32, rate: f64) -> f64 {
    let u = rng.next_unit().max(MIN_POSITIVE);
    -u.ln() / rate.max(MIN_POSITIVE)
}

/// Sample a batch size on {1, 2, ...} from a geometric law with the given mean
pub fn geometric_batch_size(rng: &mut XorShift32, mean: f64) -> u32 {
    let p = (1.0 / mean.max(1.0)).clamp(MIN_POSITIVE, 1.0);
    match Geometric::new(p) {
        Ok(dist) => {
            let failures: u64 = rng.sample(dist);
            u32::try_from(failures.saturating_add(1)).unwrap_or(u32::MAX)
        }
        Err(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sequence() {
        // xorshift32 from seed 1
        let mut rng = XorShift32::new(1);
        assert_eq!(rng.next_u32(), 270_369);
        assert_eq!(rng.next_u32(), 67_634_689);
    }

    #[test]
    fn test_zero_seed_does_not_stick() {
        let mut rng = XorShift32::new(0);
        assert_ne!(rng.next_u32(), 0);
        assert_eq!(XorShift32::new(0), XorShift32::new(DEFAULT_SEED));
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = XorShift32::seed_from_u64(1234);
        let mut b = XorShift32::new(1234);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_unit_range() {
        let mut rng = XorShift32::new(99);
        for _ in 0..10_000 {
            let u = rng.next_unit();
            assert!((0.0..=1.0).contains(&u));
        }
    }

    #[test]
    fn test_exponential_is_finite_and_positive() {
        let mut rng = XorShift32::new(7);
        for _ in 0..10_000 {
            let x = exponential(&mut rng, 3.0);
            assert!(x.is_finite());
            assert!(x >= 0.0);
        }
        // A non-positive rate is floored instead of dividing by zero
        assert!(exponential(&mut rng, 0.0).is_finite());
        assert!(exponential(&mut rng, -5.0).is_finite());
    }

    #[test]
    fn test_exponential_mean() {
        let mut rng = XorShift32::new(42);
        let n = 50_000;
        let rate = 4.0;
        let mean = (0..n).map(|_| exponential(&mut rng, rate)).sum::<f64>() / n as f64;
        assert!((mean - 1.0 / rate).abs() < 0.02, "mean was {}", mean);
    }

    #[test]
    fn test_geometric_batch_size() {
        let mut rng = XorShift32::new(5);
        let n = 20_000;
        let mut total = 0u64;
        for _ in 0..n {
            let size = geometric_batch_size(&mut rng, 10.0);
            assert!(size >= 1);
            total += size as u64;
        }
        let mean = total as f64 / n as f64;
        assert!((mean - 10.0).abs() < 1.0, "mean was {}", mean);
        // Means at or below one collapse to single items
        assert_eq!(geometric_batch_size(&mut rng, 0.5), 1);
    }
}
