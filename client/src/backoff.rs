use rand::{Rng, RngCore};
use std::time::Duration;

/// Uniformly random delay in `[min, max]`, at millisecond resolution.
pub fn jitter(rng: &mut impl RngCore, min: Duration, max: Duration) -> Duration {
    let min_ms = min.as_millis() as u64;
    let max_ms = max.as_millis() as u64;
    if max_ms <= min_ms {
        return min;
    }
    Duration::from_millis(rng.gen_range(min_ms..=max_ms))
}
