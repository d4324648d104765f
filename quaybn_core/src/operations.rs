//! Equipment availability, fleet capacity, operators and the resulting delay.

use quaybn_maths::dists::Categorical;
use quaybn_maths::model::{build_cpt, ordinal_kernel, Cpd, FunctionalCpd, Parent, Variable, CPT};
use quaybn_maths::ModelError;

use crate::catalog::{AgeClass, Equipment, Frequency, MaintenanceModel, Severity};
use crate::maintenance::{maintained_availability, MaintenancePolicy, SolverSettings};
use crate::network::{
    age_var, availability_var, pm_var, DELAY, EFFICIENCY, EQUIPMENT_CAPACITY,
    OPERATOR_AVAILABILITY,
};
use crate::reliability::{
    availability_state, intrinsic_availability, ReliabilityProfile, AVAILABILITY_STATES,
};
use crate::weather::EFFICIENCY_LEVELS;

/// Full, reduced, critical.
pub const CAPACITY_STATES: usize = 3;
/// Full crew, partial, shortage.
pub const OPERATOR_STATES: usize = 3;
/// Delay levels, 1 is none.
pub const DELAY_STATES: usize = 5;

/// How the continuous availability of each equipment type is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityModel {
    /// `MTBF / (MTBF + MTTR)` from the age class alone.
    Intrinsic,
    /// Life adjusted by the maintenance policy, solved for the annual
    /// availability; depends on the age and the three maintenance variables.
    MaintenanceAware,
}

impl Default for AvailabilityModel {
    fn default() -> Self {
        AvailabilityModel::MaintenanceAware
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationsConfig {
    /// Weight of each equipment type in the fleet capacity, in
    /// `Equipment::ALL` order.
    pub capacity_weights: [f64; 3],
    pub capacity_width: f64,
    pub operator_prior: Vec<f64>,
    /// Weights of efficiency, capacity and operators in the delay score.
    pub delay_weights: [f64; 3],
    pub delay_width: f64,
}

impl Default for OperationsConfig {
    fn default() -> Self {
        OperationsConfig {
            capacity_weights: [0.5, 0.3, 0.2],
            capacity_width: 1.0,
            operator_prior: vec![0.85, 0.12, 0.03],
            delay_weights: [0.5, 0.3, 0.2],
            delay_width: 1.25,
        }
    }
}

/// Prior over the frequency states of each maintenance class.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenancePriors {
    /// Indexed by severity, each over `Frequency::ALL`.
    pub classes: [Vec<f64>; 3],
}

impl Default for MaintenancePriors {
    fn default() -> Self {
        MaintenancePriors {
            classes: [
                vec![0.10, 0.55, 0.30, 0.05],
                vec![0.15, 0.10, 0.55, 0.20],
                vec![0.20, 0.00, 0.10, 0.70],
            ],
        }
    }
}

pub fn maintenance_priors(priors: &MaintenancePriors) -> Result<Vec<(&'static str, Cpd)>, ModelError> {
    let mut cpds = Vec::with_capacity(3);
    for &severity in Severity::ALL.iter() {
        let probs = priors.classes[severity.idx()].clone();
        if probs.len() != Frequency::ALL.len() {
            return Err(ModelError::MalformedTable {
                var: pm_var(severity).to_owned(),
                reason: format!(
                    "prior has {} entries, expected {}",
                    probs.len(),
                    Frequency::ALL.len()
                ),
            });
        }
        cpds.push((pm_var(severity), Categorical::new(probs)?.into()));
    }
    Ok(cpds)
}

pub fn age_prior(profile_prior: &[f64; 3]) -> Result<Cpd, ModelError> {
    Ok(Categorical::new(profile_prior.to_vec())?.into())
}

pub fn operator_prior(config: &OperationsConfig) -> Result<Cpd, ModelError> {
    if config.operator_prior.len() != OPERATOR_STATES {
        return Err(ModelError::MalformedTable {
            var: OPERATOR_AVAILABILITY.to_owned(),
            reason: format!(
                "prior has {} entries, expected {}",
                config.operator_prior.len(),
                OPERATOR_STATES
            ),
        });
    }
    Ok(Categorical::new(config.operator_prior.clone())?.into())
}

/// Low/Medium/High availability of one equipment type, evaluated from its
/// parents on every draw.
pub fn availability_cpd(
    profile: ReliabilityProfile,
    model: AvailabilityModel,
    maintenance: &MaintenanceModel,
    settings: &SolverSettings,
) -> Cpd {
    let equipment = profile.equipment;
    let age = Parent::new(age_var(equipment), AgeClass::ALL.len());
    match model {
        AvailabilityModel::Intrinsic => {
            FunctionalCpd::new(AVAILABILITY_STATES, vec![age], move |s: &[usize]| {
                let a = intrinsic_availability(profile.life(age_of(s[0])), profile.mttr);
                availability_state(a, &profile.thresholds).dist
            })
            .into()
        }
        AvailabilityModel::MaintenanceAware => {
            let mut parents = vec![age];
            parents.extend(
                Severity::ALL
                    .iter()
                    .map(|&sev| Parent::new(pm_var(sev), Frequency::ALL.len())),
            );
            let maintenance = maintenance.clone();
            let settings = settings.clone();
            FunctionalCpd::new(AVAILABILITY_STATES, parents, move |s: &[usize]| {
                let policy = match MaintenancePolicy::from_states(&s[1..]) {
                    Some(policy) => policy,
                    None => panic!(
                        "quaybn: maintenance states `{:?}` of `{}` are out of range",
                        &s[1..],
                        availability_var(equipment)
                    ),
                };
                let outcome =
                    maintained_availability(&profile, age_of(s[0]), &policy, &maintenance, &settings);
                availability_state(outcome.availability(), &profile.thresholds).dist
            })
            .into()
        }
    }
}

fn age_of(state: usize) -> AgeClass {
    match AgeClass::from_state(state) {
        Some(age) => age,
        None => panic!("quaybn: age state `{}` is out of range", state),
    }
}

/// `P(Equipment_Capacity | QC, YC, HT availability)`.
///
/// Each equipment contributes its shortfall from High (0 for High, 1 for
/// Low), weighted; the weighted shortfall places a triangular kernel over
/// Full/Reduced/Critical.
pub fn capacity_cpt(config: &OperationsConfig) -> Result<CPT, ModelError> {
    let weights = config.capacity_weights;
    let total: f64 = weights.iter().sum();
    if !(total > 0.0) || weights.iter().any(|w| *w < 0.0) {
        return Err(ModelError::MalformedTable {
            var: EQUIPMENT_CAPACITY.to_owned(),
            reason: format!("invalid capacity weights {:?}", weights),
        });
    }
    let parents: Vec<String> = Equipment::ALL.iter().map(|&eq| availability_var(eq)).collect();
    let parents: Vec<&str> = parents.iter().map(String::as_str).collect();
    build_cpt(
        &Variable::new(EQUIPMENT_CAPACITY, CAPACITY_STATES),
        &parents,
        &[AVAILABILITY_STATES; 3],
        |s| {
            let shortfall: f64 = s
                .iter()
                .zip(weights.iter())
                .map(|(&state, w)| w * (AVAILABILITY_STATES - state) as f64)
                .sum::<f64>()
                / (total * (AVAILABILITY_STATES - 1) as f64);
            let centre = 1.0 + shortfall * (CAPACITY_STATES - 1) as f64;
            ordinal_kernel(CAPACITY_STATES, centre, config.capacity_width)
        },
    )
}

/// `P(Delay | Efficiency, Equipment_Capacity, Operator_Availability)`.
pub fn delay_cpt(config: &OperationsConfig) -> Result<CPT, ModelError> {
    let [w_eff, w_cap, w_op] = config.delay_weights;
    build_cpt(
        &Variable::new(DELAY, DELAY_STATES),
        &[EFFICIENCY, EQUIPMENT_CAPACITY, OPERATOR_AVAILABILITY],
        &[EFFICIENCY_LEVELS, CAPACITY_STATES, OPERATOR_STATES],
        |s| {
            let score = w_eff * ordinal_position(s[0], EFFICIENCY_LEVELS)
                + w_cap * ordinal_position(s[1], CAPACITY_STATES)
                + w_op * ordinal_position(s[2], OPERATOR_STATES);
            let centre = 1.0 + score * (DELAY_STATES - 1) as f64;
            ordinal_kernel(DELAY_STATES, centre, config.delay_width)
        },
    )
}

/// Position of a one-based ordinal state within `[0, 1]`.
fn ordinal_position(state: usize, k: usize) -> f64 {
    (state - 1) as f64 / (k - 1) as f64
}
