//! OrgSim v1 - Agent Factory
//!
//! Creates employees with randomized attributes. One factory per run;
//! identities increase monotonically from [`INITIAL_EMPLOYEE_ID`].

use crate::domain::{Demographic, Employee, EmployeeId, Strategy};
use crate::random::{NormalSampler, RandomSource, UniformSampler};

pub const INITIAL_EMPLOYEE_ID: u64 = 1000;

const KNOWLEDGE: NormalSampler = NormalSampler::new(1.0, 0.3);
const LEARNING_RATE: NormalSampler = NormalSampler::new(1.0, 0.2);
const NON_QUOTA_SELF_PROMOTION: UniformSampler = UniformSampler::new(0.0, 0.6);
const QUOTA_SELF_PROMOTION: UniformSampler = UniformSampler::new(0.0, 0.4);

/// Employee generator bound to one demographic strategy.
#[derive(Debug, Clone)]
pub struct EmployeeFactory<R> {
    rng: R,
    strategy: Strategy,
    next_id: u64,
}

impl<R: RandomSource> EmployeeFactory<R> {
    pub fn new(rng: R, strategy: Strategy) -> Self {
        Self {
            rng,
            strategy,
            next_id: INITIAL_EMPLOYEE_ID,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Create a fresh employee hired at `hire_week`.
    ///
    /// `manager_role` only steers the demographic draw through the
    /// strategy; it does not make the employee a manager.
    pub fn create_employee(&mut self, hire_week: u32, manager_role: bool) -> Employee {
        let knowledge = KNOWLEDGE.sample(&mut self.rng);
        let demographic = self.draw_demographic(manager_role);
        let self_promotion = match demographic {
            Demographic::NonQuota => NON_QUOTA_SELF_PROMOTION.sample(&mut self.rng),
            Demographic::Quota => QUOTA_SELF_PROMOTION.sample(&mut self.rng),
        };
        let learning_rate = LEARNING_RATE.sample(&mut self.rng);

        let id = EmployeeId(self.next_id);
        self.next_id += 1;

        Employee {
            id,
            hire_week,
            knowledge,
            learning_rate,
            self_promotion,
            demographic,
        }
    }

    fn draw_demographic(&mut self, manager_role: bool) -> Demographic {
        if !manager_role {
            return self.fair_coin();
        }
        match self.strategy {
            Strategy::NoQuota => self.fair_coin(),
            Strategy::NoQuotaManagers => Demographic::NonQuota,
            Strategy::HalfQuotaManagers => self.quota_with_probability(0.5),
            Strategy::ThreeQuarterQuotaManagers => self.quota_with_probability(0.75),
            Strategy::AllQuotaManagers => Demographic::Quota,
        }
    }

    fn fair_coin(&mut self) -> Demographic {
        if self.rng.chance(0.5) {
            Demographic::NonQuota
        } else {
            Demographic::Quota
        }
    }

    fn quota_with_probability(&mut self, probability: f64) -> Demographic {
        if self.rng.uniform(0.0, 1.0) <= probability {
            Demographic::Quota
        } else {
            Demographic::NonQuota
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};

    #[test]
    fn identities_are_monotonic_and_unique() {
        let mut factory = EmployeeFactory::new(SeededRandom::new(1), Strategy::NoQuota);
        let ids: Vec<u64> = (0..5).map(|_| factory.create_employee(0, false).id.0).collect();
        assert_eq!(ids, vec![1000, 1001, 1002, 1003, 1004]);
    }

    #[test]
    fn draw_order_is_knowledge_demographic_promotion_learning() {
        // unit draws: coin (0.7 -> quota), self-promotion (0.5 of 0.4)
        let rng = ScriptedRandom::new()
            .with_units([0.7, 0.5])
            .with_normals([1.2, 0.9]);
        let mut factory = EmployeeFactory::new(rng, Strategy::NoQuota);
        let e = factory.create_employee(3, false);
        assert_eq!(e.hire_week, 3);
        assert_eq!(e.knowledge, 1.2);
        assert_eq!(e.learning_rate, 0.9);
        assert_eq!(e.demographic, Demographic::Quota);
        assert_eq!(e.self_promotion, 0.2);
    }

    #[test]
    fn fixed_strategies_ignore_the_coin_for_managers() {
        let mut none = EmployeeFactory::new(SeededRandom::new(5), Strategy::NoQuotaManagers);
        let mut all = EmployeeFactory::new(SeededRandom::new(5), Strategy::AllQuotaManagers);
        for _ in 0..50 {
            let m = none.create_employee(0, true);
            assert_eq!(m.demographic, Demographic::NonQuota);
            assert!((0.0..0.6).contains(&m.self_promotion));

            let q = all.create_employee(0, true);
            assert_eq!(q.demographic, Demographic::Quota);
            assert!((0.0..0.4).contains(&q.self_promotion));
        }
    }

    #[test]
    fn non_manager_roles_use_the_fair_coin() {
        let mut factory = EmployeeFactory::new(SeededRandom::new(9), Strategy::AllQuotaManagers);
        let quota = (0..2_000)
            .filter(|_| factory.create_employee(0, false).demographic == Demographic::Quota)
            .count();
        assert!((800..1_200).contains(&quota), "quota hires {}", quota);
    }

    #[test]
    fn three_quarter_strategy_favours_quota() {
        let mut factory =
            EmployeeFactory::new(SeededRandom::new(13), Strategy::ThreeQuarterQuotaManagers);
        let quota = (0..2_000)
            .filter(|_| factory.create_employee(0, true).demographic == Demographic::Quota)
            .count();
        assert!((1_380..1_620).contains(&quota), "quota hires {}", quota);
    }

    #[test]
    fn quota_hires_promote_themselves_less() {
        let rng = ScriptedRandom::new().with_units([0.0, 0.99, 0.99, 0.99]);
        let mut factory = EmployeeFactory::new(rng, Strategy::HalfQuotaManagers);
        // 0.0 <= 0.5 -> quota, then 0.99 of 0.4
        let quota = factory.create_employee(0, true);
        assert_eq!(quota.demographic, Demographic::Quota);
        assert!(quota.self_promotion < 0.4);
        // 0.99 > 0.5 -> non-quota, then 0.99 of 0.6
        let other = factory.create_employee(0, true);
        assert_eq!(other.demographic, Demographic::NonQuota);
        assert!(other.self_promotion > 0.5);
    }
}
