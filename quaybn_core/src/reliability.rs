//! Equipment life and repair models and the discretization of a continuous
//! availability into the Low/Medium/High states of the network.

use quaybn_maths::dists::{mean_life, Categorical, TruncatedNormal, Weibull};
use quaybn_maths::DistError;

use crate::catalog::{
    AgeClass, AvailabilityThresholds, Equipment, EquipmentCatalog, LifeParams,
};

/// Availability states, in network order.
pub const AVAILABILITY_STATES: usize = 3;
pub const AVAILABILITY_LOW: usize = 1;
pub const AVAILABILITY_MEDIUM: usize = 2;
pub const AVAILABILITY_HIGH: usize = 3;

/// Weibull life parameters of an equipment type at a given age.
pub fn reliability(catalog: &EquipmentCatalog, equipment: Equipment, age: AgeClass) -> LifeParams {
    catalog.spec(equipment).life(age)
}

/// Repair time of an equipment type: a Normal truncated below at zero.
pub fn repair_distribution(
    catalog: &EquipmentCatalog,
    equipment: Equipment,
) -> Result<TruncatedNormal, DistError> {
    let spec = catalog.spec(equipment);
    TruncatedNormal::non_negative(spec.repair_mu, spec.repair_sigma)
}

/// Long-run availability without maintenance, `MTBF / (MTBF + MTTR)`.
pub fn intrinsic_availability(life: LifeParams, mttr: f64) -> f64 {
    let mtbf = mean_life(life.shape, life.scale);
    mtbf / (mtbf + mttr)
}

/// Distribution over Low/Medium/High for an availability value.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMasses {
    pub dist: Categorical,
    /// The ramps produced no usable mass and `dist` is the uniform fallback.
    pub degenerate: bool,
}

/// Soft-threshold discretization.
///
/// `P(Low)` falls linearly from 1 to 0 across `low ± margin`, `P(High)` rises
/// from 0 to 1 across `high ± margin` and `P(Medium)` takes the rest. A zero
/// margin gives hard cuts.
pub fn availability_state(availability: f64, thresholds: &AvailabilityThresholds) -> StateMasses {
    if !availability.is_finite() {
        return uniform_masses(availability, "non-finite availability");
    }
    let AvailabilityThresholds { low, high, margin } = *thresholds;
    let p_low = 1.0 - ramp(availability, low - margin, low + margin);
    let p_high = ramp(availability, high - margin, high + margin);
    let p_medium = (1.0 - p_low - p_high).max(0.0);
    match Categorical::from_weights(vec![p_low, p_medium, p_high]) {
        Ok(dist) => StateMasses {
            dist,
            degenerate: false,
        },
        Err(err) => uniform_masses(availability, &err.to_string()),
    }
}

fn uniform_masses(availability: f64, reason: &str) -> StateMasses {
    log::warn!(
        "degenerate availability masses for A = {} ({}), using a uniform row",
        availability,
        reason
    );
    StateMasses {
        dist: Categorical::uniform(AVAILABILITY_STATES),
        degenerate: true,
    }
}

/// 0 below `from`, 1 from `to` onwards, linear in between.
fn ramp(x: f64, from: f64, to: f64) -> f64 {
    if to <= from {
        return if x >= to { 1.0 } else { 0.0 };
    }
    ((x - from) / (to - from)).max(0.0).min(1.0)
}

/// Validated reliability figures of one equipment type, resolved once when
/// the network is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ReliabilityProfile {
    pub equipment: Equipment,
    /// Indexed by age class.
    pub life: [LifeParams; 3],
    pub mttr: f64,
    /// Indexed by severity.
    pub pm_duration: [f64; 3],
    pub thresholds: AvailabilityThresholds,
}

impl ReliabilityProfile {
    pub fn new(catalog: &EquipmentCatalog, equipment: Equipment) -> Result<Self, DistError> {
        let spec = catalog.spec(equipment);
        for life in spec.life.iter() {
            Weibull::new(life.shape, life.scale)?;
        }
        if spec.pm_duration.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(DistError::NonNegativeReal("maintenance duration"));
        }
        let mttr = repair_distribution(catalog, equipment)?.mean();
        log::debug!("{}: MTTR {:.3} h", equipment, mttr);
        Ok(ReliabilityProfile {
            equipment,
            life: spec.life,
            mttr,
            pm_duration: spec.pm_duration,
            thresholds: spec.thresholds,
        })
    }

    pub fn life(&self, age: AgeClass) -> LifeParams {
        self.life[age as usize]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn qc_thresholds() -> AvailabilityThresholds {
        EquipmentCatalog::default()
            .spec(Equipment::QuayCrane)
            .thresholds
    }

    #[test]
    fn repair_time_mean_is_above_mu() {
        let cat = EquipmentCatalog::default();
        let rep = repair_distribution(&cat, Equipment::QuayCrane).unwrap();
        // truncation at zero moves the mean up slightly from 8
        assert!(rep.mean() > 8.0 && rep.mean() < 8.1);
        let mut bad = EquipmentCatalog::default();
        bad.spec_mut(Equipment::HaulTruck).repair_sigma = 0.0;
        assert!(repair_distribution(&bad, Equipment::HaulTruck).is_err());
    }

    #[test]
    fn intrinsic_availability_by_age() {
        let cat = EquipmentCatalog::default();
        let profile = ReliabilityProfile::new(&cat, Equipment::QuayCrane).unwrap();
        let new = intrinsic_availability(profile.life(AgeClass::New), profile.mttr);
        let old = intrinsic_availability(profile.life(AgeClass::Old), profile.mttr);
        // MTBF ≈ 846.6 h, MTTR ≈ 8.03 h
        assert!((new - 0.9906).abs() < 1e-3);
        assert!(old < new);
        assert!(old > 0.0 && new < 1.0);
    }

    #[test]
    fn hard_states_away_from_the_cuts() {
        let th = qc_thresholds();
        assert_eq!(availability_state(0.5, &th).dist.probs(), &[1.0, 0.0, 0.0]);
        assert_eq!(availability_state(0.945, &th).dist.probs(), &[0.0, 1.0, 0.0]);
        assert_eq!(availability_state(0.999, &th).dist.probs(), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn soft_ramp_at_the_cuts() {
        let th = qc_thresholds();
        let at_low = availability_state(0.92, &th);
        assert!(!at_low.degenerate);
        assert!((at_low.dist.pmf(AVAILABILITY_LOW) - 0.5).abs() < 1e-9);
        assert!((at_low.dist.pmf(AVAILABILITY_MEDIUM) - 0.5).abs() < 1e-9);
        let near_high = availability_state(0.98, &th);
        assert!((near_high.dist.pmf(AVAILABILITY_HIGH) - 0.75).abs() < 1e-9);
        assert!((near_high.dist.pmf(AVAILABILITY_MEDIUM) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn zero_margin_is_a_hard_cut() {
        let th = AvailabilityThresholds {
            low: 0.9,
            high: 0.95,
            margin: 0.0,
        };
        assert_eq!(availability_state(0.9, &th).dist.probs(), &[0.0, 1.0, 0.0]);
        assert_eq!(availability_state(0.8999, &th).dist.probs(), &[1.0, 0.0, 0.0]);
        assert_eq!(availability_state(0.95, &th).dist.probs(), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn non_finite_availability_falls_back_to_uniform() {
        let masses = availability_state(f64::NAN, &qc_thresholds());
        assert!(masses.degenerate);
        for s in 1..=AVAILABILITY_STATES {
            assert!((masses.dist.pmf(s) - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn invalid_profile() {
        let mut cat = EquipmentCatalog::default();
        cat.spec_mut(Equipment::YardCrane).life[1] = LifeParams::new(-1.0, 600.0);
        assert!(ReliabilityProfile::new(&cat, Equipment::YardCrane).is_err());
        assert!(ReliabilityProfile::new(&cat, Equipment::QuayCrane).is_ok());
    }
}
