//! Preventive maintenance: virtual-age adjustment of the life distribution
//! and the maintenance-aware annual availability.
//!
//! Maintenance acts on the Weibull parameters. Each class rolls back part of
//! the equipment's virtual age, which stretches the scale `η`, and flattens the
//! wear-out shape `β`. Failures between maintenance events are minimally
//! repaired, so the expected number of failures in the productive time `U` of
//! a year is the cumulative hazard `(U / η′)^β′`, while `U` itself shrinks
//! with every failure and maintenance stop:
//!
//! ```text
//! f = ((T - PM - f·MTTR) / η′)^β′
//! ```
//!
//! The fixed point is found by damped iteration from `U₀ = max(T - PM, 0.1T)`.

use std::fmt;

use crate::catalog::{
    AgeClass, Equipment, Frequency, LifeParams, MaintenanceModel, Severity, HOURS_PER_YEAR,
};
use crate::reliability::ReliabilityProfile;

/// One frequency per severity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaintenancePolicy([Frequency; 3]);

impl MaintenancePolicy {
    pub fn new(minor: Frequency, medium: Frequency, major: Frequency) -> Self {
        MaintenancePolicy([minor, medium, major])
    }

    pub fn none() -> Self {
        MaintenancePolicy([Frequency::None; 3])
    }

    /// The policy selected by the states of the three maintenance variables
    /// (minor, medium, major).
    pub fn from_states(states: &[usize]) -> Option<Self> {
        match states {
            [minor, medium, major] => Some(MaintenancePolicy([
                Frequency::from_state(*minor)?,
                Frequency::from_state(*medium)?,
                Frequency::from_state(*major)?,
            ])),
            _ => None,
        }
    }

    /// Every combination of class frequencies.
    pub fn all() -> impl Iterator<Item = MaintenancePolicy> {
        Frequency::ALL.iter().flat_map(|&minor| {
            Frequency::ALL.iter().flat_map(move |&medium| {
                Frequency::ALL
                    .iter()
                    .map(move |&major| MaintenancePolicy([minor, medium, major]))
            })
        })
    }

    pub fn frequency(&self, severity: Severity) -> Frequency {
        self.0[severity.idx()]
    }

    pub fn with(mut self, severity: Severity, frequency: Frequency) -> Self {
        self.0[severity.idx()] = frequency;
        self
    }

    /// Annual events of a class divided by the model's frequency norm.
    pub fn normalized_events(&self, severity: Severity, model: &MaintenanceModel) -> f64 {
        self.frequency(severity).annual_events() / model.frequency_norm
    }
}

impl fmt::Display for MaintenancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}/{:?}/{:?}", self.0[0], self.0[1], self.0[2])
    }
}

/// Weibull parameters after maintenance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustedLife {
    pub shape: f64,
    pub scale: f64,
    /// `φ`, the fraction of virtual age kept; 1 without maintenance.
    pub rejuvenation: f64,
    /// `e`, the combined shape effectiveness; 0 without maintenance.
    pub shape_effectiveness: f64,
}

/// Kijima-style virtual-age adjustment.
///
/// `φ = ∏ (1 - ρ_c)^(n_c·κη_c)` and `η′ = η / max(φ, φ_min)`;
/// `e = 1 - ∏ (1 - κβ_c)^n_c` and `β′ = β·(1 - min(B·e, max_drop))`.
pub fn adjust_life(
    base: LifeParams,
    policy: &MaintenancePolicy,
    model: &MaintenanceModel,
) -> AdjustedLife {
    let mut phi = 1.0;
    let mut shape_kept = 1.0;
    for &severity in Severity::ALL.iter() {
        let n = policy.normalized_events(severity, model);
        let class = model.class(severity);
        phi *= (1.0 - class.rejuvenation).powf(n * class.scale_effect);
        shape_kept *= (1.0 - class.shape_effect).powf(n);
    }
    let effectiveness = 1.0 - shape_kept;
    let drop = (model.shape_sensitivity * effectiveness).min(model.max_shape_drop);
    AdjustedLife {
        shape: base.shape * (1.0 - drop),
        scale: base.scale / phi.max(model.min_rejuvenation),
        rejuvenation: phi,
        shape_effectiveness: effectiveness,
    }
}

/// Annual downtime spent on preventive maintenance (hours), counting each
/// class as its normalized event count times the per-event duration.
pub fn pm_downtime(
    policy: &MaintenancePolicy,
    durations: &[f64; 3],
    model: &MaintenanceModel,
) -> f64 {
    Severity::ALL
        .iter()
        .map(|&s| policy.normalized_events(s, model) * durations[s.idx()])
        .sum()
}

/// Iteration and clamping constants of the availability solver.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverSettings {
    pub horizon: f64,
    pub max_iterations: usize,
    /// Weight kept from the previous iterate.
    pub damping: f64,
    /// Relative change at which the iteration stops.
    pub tolerance: f64,
    /// Replaces a non-finite or non-positive failure count.
    pub failure_floor: f64,
    /// Availability reported when the result is not finite.
    pub fallback: f64,
    pub shape_range: (f64, f64),
    pub scale_range: (f64, f64),
    pub mttr_range: (f64, f64),
    /// Maximum share of the horizon that maintenance may take.
    pub max_pm_share: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            horizon: HOURS_PER_YEAR,
            max_iterations: 10,
            damping: 0.3,
            tolerance: 1e-6,
            failure_floor: 1e-9,
            fallback: 0.5,
            shape_range: (0.5, 10.0),
            scale_range: (1e-3, 1e6),
            mttr_range: (0.01, 1e3),
            max_pm_share: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverReport {
    pub availability: f64,
    /// Expected failures per horizon at the last iterate.
    pub failures: f64,
    pub iterations: usize,
    /// Whether the relative change fell under the tolerance before the
    /// iteration budget ran out.
    pub tolerance_met: bool,
    /// `|f - f_prev| / f_prev` of the last iteration.
    pub residual: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolverOutcome {
    Converged(SolverReport),
    Degenerate { reason: String, fallback: f64 },
}

impl SolverOutcome {
    /// The availability to use downstream; the fallback when degenerate.
    pub fn availability(&self) -> f64 {
        match self {
            SolverOutcome::Converged(report) => report.availability,
            SolverOutcome::Degenerate { fallback, .. } => *fallback,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, SolverOutcome::Degenerate { .. })
    }
}

/// Maintenance-aware annual availability `1 - PM/T - f·MTTR/T`.
///
/// All inputs are clamped to the ranges in `settings` first; the result is
/// clamped to `[0, 1]`.
///
/// The damped step contracts while the repair feedback
/// `k = β′·f·MTTR / (T - PM - f·MTTR)` at the fixed point stays under
/// `(1 + damping) / (1 - damping)`. Past `k ≈ 0.75` the default ten
/// iterations end above the tolerance; the report then carries
/// `tolerance_met = false` and the last residual.
pub fn solve_availability(
    shape: f64,
    scale: f64,
    mttr: f64,
    pm_hours: f64,
    settings: &SolverSettings,
) -> SolverOutcome {
    if [shape, scale, mttr, pm_hours].iter().any(|x| x.is_nan()) {
        return degenerate(
            format!(
                "undefined input (β′ = {}, η′ = {}, MTTR = {}, PM = {})",
                shape, scale, mttr, pm_hours
            ),
            settings,
        );
    }
    let t = settings.horizon;
    let shape = shape.max(settings.shape_range.0).min(settings.shape_range.1);
    let scale = scale.max(settings.scale_range.0).min(settings.scale_range.1);
    let mttr = mttr.max(settings.mttr_range.0).min(settings.mttr_range.1);
    let pm = pm_hours.max(0.0).min(settings.max_pm_share * t);

    let failure_count = |uptime: f64| -> f64 {
        if uptime <= 0.0 {
            return settings.failure_floor;
        }
        let f = (uptime / scale).powf(shape);
        if f.is_finite() && f > 0.0 {
            f
        } else {
            settings.failure_floor
        }
    };

    let mut f = failure_count((t - pm).max(0.1 * t));
    let mut iterations = 0;
    let mut residual = f64::NAN;
    let mut tolerance_met = false;
    while iterations < settings.max_iterations {
        iterations += 1;
        let f_new = failure_count(t - pm - f * mttr);
        let next = settings.damping * f + (1.0 - settings.damping) * f_new;
        residual = (next - f).abs() / f.abs().max(1e-12);
        log::trace!("solver iteration {}: f = {}", iterations, next);
        f = next;
        if residual <= settings.tolerance {
            tolerance_met = true;
            break;
        }
    }
    if !tolerance_met {
        log::debug!(
            "availability solver stopped after {} iterations with residual {:.2e} (β′ = {:.3}, η′ = {:.1})",
            iterations,
            residual,
            shape,
            scale
        );
    }

    let availability = 1.0 - pm / t - f * mttr / t;
    if !availability.is_finite() {
        return degenerate(
            format!("non-finite availability after {} iterations", iterations),
            settings,
        );
    }
    SolverOutcome::Converged(SolverReport {
        availability: availability.max(0.0).min(1.0),
        failures: f,
        iterations,
        tolerance_met,
        residual,
    })
}

fn degenerate(reason: String, settings: &SolverSettings) -> SolverOutcome {
    log::warn!(
        "availability solver degenerate: {}; using {}",
        reason,
        settings.fallback
    );
    SolverOutcome::Degenerate {
        reason,
        fallback: settings.fallback,
    }
}

/// Adjusts the life of `profile` at `age` for `policy` and solves for the
/// annual availability.
pub fn maintained_availability(
    profile: &ReliabilityProfile,
    age: AgeClass,
    policy: &MaintenancePolicy,
    model: &MaintenanceModel,
    settings: &SolverSettings,
) -> SolverOutcome {
    let adjusted = adjust_life(profile.life(age), policy, model);
    let pm = pm_downtime(policy, &profile.pm_duration, model);
    solve_availability(adjusted.shape, adjusted.scale, profile.mttr, pm, settings)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityRow {
    pub equipment: Equipment,
    pub age: AgeClass,
    pub policy: MaintenancePolicy,
    pub outcome: SolverOutcome,
}

/// Availability of every equipment × age × policy combination.
pub fn availability_table(
    profiles: &[ReliabilityProfile],
    model: &MaintenanceModel,
    settings: &SolverSettings,
) -> Vec<AvailabilityRow> {
    let mut rows = Vec::with_capacity(profiles.len() * AgeClass::ALL.len() * 64);
    for profile in profiles {
        for &age in AgeClass::ALL.iter() {
            for policy in MaintenancePolicy::all() {
                rows.push(AvailabilityRow {
                    equipment: profile.equipment,
                    age,
                    outcome: maintained_availability(profile, age, &policy, model, settings),
                    policy,
                });
            }
        }
    }
    rows
}
