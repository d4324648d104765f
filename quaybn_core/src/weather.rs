//! Weather priors and the weather → crane → efficiency tables.

use quaybn_maths::dists::Categorical;
use quaybn_maths::model::{build_cpt, Cpd, Variable, CPT};
use quaybn_maths::ModelError;

use crate::network::{CRANE_OPERABLE, EFFICIENCY, RAIN, VISIBILITY, WIND};

/// Calm, strong, storm.
pub const WIND_STATES: usize = 3;
/// None, light, moderate, heavy.
pub const RAIN_STATES: usize = 4;
/// Good, reduced, poor.
pub const VISIBILITY_STATES: usize = 3;
/// Operable, not operable.
pub const OPERABLE_STATES: usize = 2;
pub const CRANE_OPERABLE_YES: usize = 1;
pub const CRANE_OPERABLE_NO: usize = 2;
/// Efficiency levels, 1 is best.
pub const EFFICIENCY_LEVELS: usize = 10;

const EFFICIENCY_CUTS: [f64; EFFICIENCY_LEVELS - 1] = [0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2, 0.1];

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherConfig {
    pub wind_prior: Vec<f64>,
    pub rain_prior: Vec<f64>,
    pub visibility_prior: Vec<f64>,
    /// Multiplicative efficiency factor of each state.
    pub wind_factor: Vec<f64>,
    pub rain_factor: Vec<f64>,
    pub visibility_factor: Vec<f64>,
    /// `P(operable)` indexed by wind state, then visibility state.
    pub crane_operable: Vec<Vec<f64>>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        WeatherConfig {
            wind_prior: vec![0.917, 0.08, 0.003],
            rain_prior: vec![0.65, 0.20, 0.10, 0.05],
            visibility_prior: vec![0.88, 0.09, 0.03],
            wind_factor: vec![1.0, 0.75, 0.3],
            rain_factor: vec![1.0, 0.9, 0.7, 0.45],
            visibility_factor: vec![1.0, 0.85, 0.6],
            crane_operable: vec![
                vec![0.995, 0.98, 0.90],
                vec![0.85, 0.80, 0.70],
                // cranes are stopped in storm winds
                vec![0.0, 0.0, 0.0],
            ],
        }
    }
}

impl WeatherConfig {
    /// Checks every table has one entry per state.
    pub fn validate(&self) -> Result<(), ModelError> {
        let widths = [
            (WIND, "prior", self.wind_prior.len(), WIND_STATES),
            (RAIN, "prior", self.rain_prior.len(), RAIN_STATES),
            (VISIBILITY, "prior", self.visibility_prior.len(), VISIBILITY_STATES),
            (WIND, "efficiency factors", self.wind_factor.len(), WIND_STATES),
            (RAIN, "efficiency factors", self.rain_factor.len(), RAIN_STATES),
            (
                VISIBILITY,
                "efficiency factors",
                self.visibility_factor.len(),
                VISIBILITY_STATES,
            ),
            (CRANE_OPERABLE, "wind rows", self.crane_operable.len(), WIND_STATES),
        ];
        for &(var, what, found, expected) in widths.iter() {
            if found != expected {
                return Err(ModelError::MalformedTable {
                    var: var.to_owned(),
                    reason: format!("{} has {} entries, expected {}", what, found, expected),
                });
            }
        }
        if let Some(row) = self
            .crane_operable
            .iter()
            .position(|r| r.len() != VISIBILITY_STATES)
        {
            return Err(ModelError::RowWidth {
                var: CRANE_OPERABLE.to_owned(),
                row,
                expected: VISIBILITY_STATES,
                found: self.crane_operable[row].len(),
            });
        }
        Ok(())
    }

    /// Product of the wind, rain and visibility factors.
    pub fn efficiency_score(&self, wind: usize, rain: usize, visibility: usize) -> f64 {
        self.wind_factor[wind - 1] * self.rain_factor[rain - 1] * self.visibility_factor[visibility - 1]
    }
}

/// Efficiency level of a weather score: `≥ 0.9 → 1`, `≥ 0.8 → 2`, … ,
/// `≥ 0.1 → 9`, anything lower `→ 10`.
pub fn efficiency_bin(score: f64) -> usize {
    EFFICIENCY_CUTS
        .iter()
        .position(|&cut| score >= cut)
        .map_or(EFFICIENCY_LEVELS, |i| i + 1)
}

pub fn weather_priors(config: &WeatherConfig) -> Result<Vec<(&'static str, Cpd)>, ModelError> {
    Ok(vec![
        (WIND, Categorical::new(config.wind_prior.clone())?.into()),
        (RAIN, Categorical::new(config.rain_prior.clone())?.into()),
        (
            VISIBILITY,
            Categorical::new(config.visibility_prior.clone())?.into(),
        ),
    ])
}

/// `P(Crane_Operable | Wind, Visibility)`.
pub fn crane_operable_cpt(config: &WeatherConfig) -> Result<CPT, ModelError> {
    config.validate()?;
    build_cpt(
        &Variable::new(CRANE_OPERABLE, OPERABLE_STATES),
        &[WIND, VISIBILITY],
        &[WIND_STATES, VISIBILITY_STATES],
        |s| {
            let p = config.crane_operable[s[0] - 1][s[1] - 1];
            vec![p, 1.0 - p]
        },
    )
}

/// `P(Efficiency | Wind, Rain, Visibility, Crane_Operable)`: a point mass on
/// the binned weather score, or on the worst level when the cranes are down.
pub fn efficiency_cpt(config: &WeatherConfig) -> Result<CPT, ModelError> {
    config.validate()?;
    build_cpt(
        &Variable::new(EFFICIENCY, EFFICIENCY_LEVELS),
        &[WIND, RAIN, VISIBILITY, CRANE_OPERABLE],
        &[WIND_STATES, RAIN_STATES, VISIBILITY_STATES, OPERABLE_STATES],
        |s| {
            let level = if s[3] == CRANE_OPERABLE_NO {
                EFFICIENCY_LEVELS
            } else {
                efficiency_bin(config.efficiency_score(s[0], s[1], s[2]))
            };
            let mut row = vec![0.0; EFFICIENCY_LEVELS];
            row[level - 1] = 1.0;
            row
        },
    )
}
