//! OrgSim v1 - Promotion and Turnover Policy
//!
//! Stochastic predicates consumed by the engine. Each call is a single
//! draw, so an identical seed and call order yield identical decisions.

use crate::error::{OrgError, Result};
use crate::random::{NormalSampler, RandomSource};

/// Share of departures filled externally at hierarchy level 1.
const EXTERNAL_HIRE_PROBABILITY: f64 = 0.5;
const TOP_PERFORMER_RESIGNS: f64 = 0.5;
const PROMOTE_TOP_PERFORMER: f64 = 0.25;
const REDUCE_SELF_PROMOTER: f64 = 0.1;
/// Once per manager per quarter: on average one layoff every 15 years.
const REDUCE_PERSONNEL: f64 = 1.0 / 60.0;
const LEVEL_UP_KNOWLEDGE_APPLICABILITY: NormalSampler = NormalSampler::new(0.6, 0.2);

#[derive(Debug, Clone)]
pub struct PromotionPolicy<R> {
    rng: R,
}

impl<R: RandomSource> PromotionPolicy<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Whether a bad manager's strongest subordinate walks out.
    pub fn top_performer_resigns(&mut self) -> bool {
        self.rng.chance(TOP_PERFORMER_RESIGNS)
    }

    /// Whether a departing manager at `hierarchy_level` is replaced from
    /// inside the team, with probability `1 - 0.5 / level`. The root has
    /// no level and is rejected.
    pub fn promote_internally(&mut self, hierarchy_level: u32) -> Result<bool> {
        if hierarchy_level == 0 {
            return Err(OrgError::InvalidArgument(
                "hierarchy level must be positive".to_string(),
            ));
        }
        let p = 1.0 - EXTERNAL_HIRE_PROBABILITY / hierarchy_level as f64;
        Ok(self.rng.chance(p))
    }

    /// Top performer (by knowledge) rather than best self-promoter.
    pub fn should_promote_top_performer(&mut self) -> bool {
        self.rng.uniform(0.0, 1.0) < PROMOTE_TOP_PERFORMER
    }

    pub fn should_reduce_personnel(&mut self) -> bool {
        self.rng.uniform(0.0, 1.0) <= REDUCE_PERSONNEL
    }

    /// Layoff hits the best self-promoter instead of the weakest contributor.
    pub fn should_reduce_self_promoter(&mut self) -> bool {
        self.rng.uniform(0.0, 1.0) <= REDUCE_SELF_PROMOTER
    }

    /// Fraction of a promoted employee's knowledge usable one level up.
    pub fn level_up_knowledge_applicability(&mut self) -> f64 {
        LEVEL_UP_KNOWLEDGE_APPLICABILITY.sample(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};

    #[test]
    fn level_zero_is_invalid() {
        let mut policy = PromotionPolicy::new(SeededRandom::new(1));
        assert!(matches!(
            policy.promote_internally(0),
            Err(OrgError::InvalidArgument(_))
        ));
    }

    #[test]
    fn promote_internally_is_bernoulli_in_level() {
        // level 1: p = 0.5; level 2: p = 0.75; level 4: p = 0.875
        let rng = ScriptedRandom::new().with_units([0.49, 0.5, 0.74, 0.75, 0.87, 0.88]);
        let mut policy = PromotionPolicy::new(rng);
        assert!(policy.promote_internally(1).unwrap());
        assert!(!policy.promote_internally(1).unwrap());
        assert!(policy.promote_internally(2).unwrap());
        assert!(!policy.promote_internally(2).unwrap());
        assert!(policy.promote_internally(4).unwrap());
        assert!(!policy.promote_internally(4).unwrap());
    }

    #[test]
    fn thresholds_are_applied() {
        let rng = ScriptedRandom::new().with_units([0.49, 0.24, 0.25, 0.1, 0.11, 0.01, 0.02]);
        let mut policy = PromotionPolicy::new(rng);
        assert!(policy.top_performer_resigns());
        assert!(policy.should_promote_top_performer());
        assert!(!policy.should_promote_top_performer());
        assert!(policy.should_reduce_self_promoter());
        assert!(!policy.should_reduce_self_promoter());
        assert!(policy.should_reduce_personnel());
        assert!(!policy.should_reduce_personnel());
    }

    #[test]
    fn deeper_levels_promote_internally_more_often() {
        let mut policy = PromotionPolicy::new(SeededRandom::new(21));
        let mut rate = |level: u32| {
            (0..10_000)
                .filter(|_| policy.promote_internally(level).unwrap())
                .count() as f64
                / 10_000.0
        };
        let (one, two, five, twenty) = (rate(1), rate(2), rate(5), rate(20));
        assert!((0.47..0.53).contains(&one), "level 1 rate {}", one);
        assert!((0.72..0.78).contains(&two), "level 2 rate {}", two);
        assert!((0.87..0.93).contains(&five), "level 5 rate {}", five);
        assert!((0.96..0.99).contains(&twenty), "level 20 rate {}", twenty);
        assert!(one < two && two < five && five < twenty);
    }

    #[test]
    fn applicability_comes_from_the_normal_draw() {
        let rng = ScriptedRandom::new().with_normals([0.55]);
        let mut policy = PromotionPolicy::new(rng);
        assert_eq!(policy.level_up_knowledge_applicability(), 0.55);
    }
}
