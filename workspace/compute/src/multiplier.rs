use common::Scenario;

/// Month index from which the policy trajectory switches multipliers.
pub const POLICY_BREAKPOINT_MONTHS: usize = 24;

/// Demand multiplier of a scenario, as a function of the forecast month index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Multiplier {
    /// Same factor for every month
    Constant(f64),
    /// `before` for months below `breakpoint`, `after` from then on
    Piecewise {
        breakpoint: usize,
        before: f64,
        after: f64,
    },
}

impl Multiplier {
    /// Factor for the forecast month at `index` (0-based, forecast months only).
    pub fn at(&self, index: usize) -> f64 {
        match *self {
            Multiplier::Constant(value) => value,
            Multiplier::Piecewise {
                breakpoint,
                before,
                after,
            } => {
                if index < breakpoint {
                    before
                } else {
                    after
                }
            }
        }
    }
}

/// Multipliers for the non-baseline scenarios. Baseline is always 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioProfile {
    conservative: Multiplier,
    aggressive: Multiplier,
}

impl ScenarioProfile {
    pub fn new(conservative: Multiplier, aggressive: Multiplier) -> Self {
        Self {
            conservative,
            aggressive,
        }
    }

    /// Static scenario scaling used for infrastructure planning.
    pub fn scaling() -> Self {
        Self::new(Multiplier::Constant(0.85), Multiplier::Constant(1.2))
    }

    /// Policy trajectory that changes pace after two years.
    pub fn trajectory() -> Self {
        Self::new(
            Multiplier::Piecewise {
                breakpoint: POLICY_BREAKPOINT_MONTHS,
                before: 0.9,
                after: 0.75,
            },
            Multiplier::Piecewise {
                breakpoint: POLICY_BREAKPOINT_MONTHS,
                before: 1.1,
                after: 1.35,
            },
        )
    }

    pub fn multiplier(&self, scenario: Scenario) -> Multiplier {
        match scenario {
            Scenario::Conservative => self.conservative,
            Scenario::Baseline => Multiplier::Constant(1.0),
            Scenario::Aggressive => self.aggressive,
        }
    }
}
