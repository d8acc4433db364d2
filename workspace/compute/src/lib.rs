pub mod error;
pub mod infrastructure;
pub mod insights;
pub mod multiplier;
pub mod overlay;
pub mod ranking;
pub mod scenario;
pub mod threshold;

use common::{ForecastSeries, InfrastructureReport, PlanningAssumptions, Scenario, ScenarioComparison};

use error::Result;
use infrastructure::Estimator;
use multiplier::ScenarioProfile;

/// Planning derivations bound to one set of assumptions.
///
/// The infrastructure view uses the constant `scaling` profile and the
/// scenario comparison uses the piecewise `trajectory` profile. The two are
/// separate planning narratives and are kept apart on purpose.
#[derive(Debug, Clone, PartialEq)]
pub struct Planner {
    estimator: Estimator,
    scaling: ScenarioProfile,
    trajectory: ScenarioProfile,
}

impl Planner {
    pub fn new(assumptions: PlanningAssumptions) -> Result<Self> {
        Ok(Self::with_estimator(Estimator::new(assumptions)?))
    }

    pub fn with_estimator(estimator: Estimator) -> Self {
        Self {
            estimator,
            scaling: ScenarioProfile::scaling(),
            trajectory: ScenarioProfile::trajectory(),
        }
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    /// Infrastructure report for `scenario` under static scaling.
    pub fn infrastructure(&self, series: &ForecastSeries, scenario: Scenario) -> InfrastructureReport {
        self.estimator.report(series, scenario, &self.scaling)
    }

    /// All scenarios under the policy trajectory.
    pub fn compare_scenarios(&self, series: &ForecastSeries) -> ScenarioComparison {
        scenario::compare(series, &self.trajectory, &self.estimator)
    }
}

/// Returns a planner with the reference planning assumptions.
pub fn default_planner() -> Planner {
    Planner::with_estimator(Estimator::default())
}
