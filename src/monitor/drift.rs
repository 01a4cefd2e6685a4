use rand::Rng;

use crate::monitor::mirror::clamp_score;

/// Bounded random walk used while no live feed is present.
#[derive(Debug)]
pub struct DriftSimulator<R> {
    rng: R,
    step: f64,
}

impl<R: Rng> DriftSimulator<R> {
    pub fn new(rng: R, step: f64) -> Self {
        Self {
            rng,
            step: if step.is_finite() { step.abs() } else { 0.0 },
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Moves `score` by a uniform delta in `[-step, step]` and clamps to [0, 100].
    pub fn perturb(&mut self, score: f64) -> f64 {
        if self.step == 0.0 {
            return clamp_score(score);
        }
        let delta = self.rng.gen_range(-self.step..=self.step);
        clamp_score(score + delta)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn steps_stay_within_bounds() {
        let mut drift = DriftSimulator::new(StdRng::seed_from_u64(7), 5.0);
        let mut score = 50.0;
        for _ in 0..1_000 {
            let next = drift.perturb(score);
            assert!((next - score).abs() <= 5.0 + 1e-9);
            assert!((0.0..=100.0).contains(&next));
            score = next;
        }
    }

    #[test]
    fn clamps_at_edges() {
        let mut drift = DriftSimulator::new(StdRng::seed_from_u64(1), 5.0);
        for _ in 0..100 {
            assert!(drift.perturb(0.0) >= 0.0);
            assert!(drift.perturb(100.0) <= 100.0);
        }
    }

    #[test]
    fn zero_step_only_clamps() {
        let mut drift = DriftSimulator::new(StdRng::seed_from_u64(1), f64::NAN);
        assert_eq!(drift.step(), 0.0);
        assert_eq!(drift.perturb(120.0), 100.0);
        assert_eq!(drift.perturb(42.0), 42.0);
    }

    #[test]
    fn same_seed_same_walk() {
        let mut a = DriftSimulator::new(StdRng::seed_from_u64(99), 5.0);
        let mut b = DriftSimulator::new(StdRng::seed_from_u64(99), 5.0);
        for _ in 0..10 {
            assert_eq!(a.perturb(50.0), b.perturb(50.0));
        }
    }
}
