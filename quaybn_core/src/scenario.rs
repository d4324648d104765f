//! Scenario comparison and one-at-a-time sensitivity analysis on top of the
//! Monte Carlo queries.
//!
//! Every metric is the expected (one-based) state of an ordinal variable
//! given the scenario's evidence. Cells with no matching sample are NaN.

use std::cmp::Ordering;
use std::fmt;

use quaybn_maths::inference::{query_distribution, query_many};
use quaybn_maths::model::BayesNet;
use quaybn_maths::sampling::Evidence;
use quaybn_maths::{QueryError, SimRng};

use crate::catalog::{AgeClass, Equipment, Frequency, Severity};
use crate::network::{age_var, pm_var, OPERATOR_AVAILABILITY, RAIN, VISIBILITY, WIND};

pub const BASELINE: &str = "Baseline";

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("baseline scenario `{0}` is not in the table")]
    MissingBaseline(String),
}

/// A labelled evidence set.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub label: String,
    pub evidence: Evidence,
}

impl Scenario {
    pub fn new<S: Into<String>>(label: S, evidence: Evidence) -> Scenario {
        Scenario {
            label: label.into(),
            evidence,
        }
    }
}

#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRow {
    pub label: String,
    /// One value per metric, in the table's metric order.
    pub values: Vec<f64>,
}

/// Rows are scenarios, columns are metrics.
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioTable {
    metrics: Vec<String>,
    rows: Vec<ScenarioRow>,
}

impl ScenarioTable {
    pub fn new(metrics: Vec<String>) -> ScenarioTable {
        ScenarioTable {
            metrics,
            rows: vec![],
        }
    }

    /// # Panics
    /// When the row does not have one value per metric.
    pub fn push_row(&mut self, row: ScenarioRow) {
        if row.values.len() != self.metrics.len() {
            panic!(
                "quaybn: scenario `{}` has {} values for {} metrics",
                row.label,
                row.values.len(),
                self.metrics.len()
            );
        }
        self.rows.push(row);
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn rows(&self) -> &[ScenarioRow] {
        &self.rows
    }

    pub fn row(&self, label: &str) -> Option<&ScenarioRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    pub fn get(&self, label: &str, metric: &str) -> Option<f64> {
        let col = self.metrics.iter().position(|m| m == metric)?;
        self.row(label).map(|r| r.values[col])
    }
}

impl fmt::Display for ScenarioTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|r| r.label.len())
            .chain(std::iter::once("scenario".len()))
            .max()
            .unwrap_or(0);
        write!(f, "{:<width$}", "scenario", width = width)?;
        for m in &self.metrics {
            write!(f, "  {:>12}", m)?;
        }
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "{:<width$}", row.label, width = width)?;
            for v in &row.values {
                write!(f, "  {:>12.4}", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Expected value of every metric under every scenario, each scenario
/// answered from its own `n` joint draws.
pub fn evaluate_scenarios<S: AsRef<str>>(
    net: &BayesNet,
    scenarios: &[Scenario],
    metrics: &[S],
    n: usize,
    rng: &mut SimRng,
) -> Result<ScenarioTable, ScenarioError> {
    let mut table = ScenarioTable::new(metrics.iter().map(|m| m.as_ref().to_owned()).collect());
    for scenario in scenarios {
        let posteriors = query_many(net, metrics, &scenario.evidence, n, rng)?;
        let matches = posteriors.first().map_or(0, |p| p.matches);
        if matches == 0 && !metrics.is_empty() {
            log::warn!(
                "scenario `{}`: no sample out of {} matched the evidence",
                scenario.label,
                n
            );
        } else {
            log::debug!("scenario `{}`: {} matching samples", scenario.label, matches);
        }
        table.push_row(ScenarioRow {
            label: scenario.label.clone(),
            values: posteriors
                .iter()
                .map(|p| p.expected_value().unwrap_or(f64::NAN))
                .collect(),
        });
    }
    Ok(table)
}

/// `100·(value/base - 1)`; 0 when both are exactly 0 and NaN when only the
/// base is.
pub fn percent_change(value: f64, base: f64) -> f64 {
    if base == 0.0 {
        if value == 0.0 {
            0.0
        } else {
            f64::NAN
        }
    } else {
        100.0 * (value / base - 1.0)
    }
}

/// Every cell as a percent change from the same metric in the `baseline` row.
pub fn percent_delta(table: &ScenarioTable, baseline: &str) -> Result<ScenarioTable, ScenarioError> {
    let base = table
        .row(baseline)
        .ok_or_else(|| ScenarioError::MissingBaseline(baseline.to_owned()))?;
    let mut deltas = ScenarioTable::new(table.metrics.clone());
    for row in &table.rows {
        deltas.push_row(ScenarioRow {
            label: row.label.clone(),
            values: row
                .values
                .iter()
                .zip(base.values.iter())
                .map(|(&v, &b)| percent_change(v, b))
                .collect(),
        });
    }
    Ok(deltas)
}

/// Response of a metric to each state of one variable.
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityRow {
    pub variable: String,
    /// Expected metric with the variable pinned to each state in turn; NaN
    /// where no sample matched.
    pub by_state: Vec<f64>,
    pub min: f64,
    pub max: f64,
    pub swing: f64,
}

/// One-at-a-time sweep of `variables`, sorted by decreasing swing.
pub fn sensitivity_sweep<S: AsRef<str>>(
    net: &BayesNet,
    variables: &[S],
    metric: &str,
    n: usize,
    rng: &mut SimRng,
) -> Result<Vec<SensitivityRow>, ScenarioError> {
    let mut rows = Vec::with_capacity(variables.len());
    for var in variables {
        let var = var.as_ref();
        let k = net
            .node(var)
            .ok_or_else(|| QueryError::UnknownVariable(var.to_owned()))?
            .k();
        let mut by_state = Vec::with_capacity(k);
        for state in 1..=k {
            let evidence = Evidence::new().with(var, state);
            let post = query_distribution(net, metric, &evidence, n, rng)?;
            by_state.push(post.expected_value().unwrap_or(f64::NAN));
        }
        let finite = by_state.iter().copied().filter(|v| v.is_finite());
        let (min, max) = finite.fold((f64::NAN, f64::NAN), |(lo, hi), v| (v.min(lo), v.max(hi)));
        log::debug!("{} → {}: {:?}", var, metric, by_state);
        rows.push(SensitivityRow {
            variable: var.to_owned(),
            by_state,
            min,
            max,
            swing: max - min,
        });
    }
    rows.sort_by(|a, b| match (a.swing.is_nan(), b.swing.is_nan()) {
        (false, false) => b.swing.partial_cmp(&a.swing).unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    });
    Ok(rows)
}

/// The standard comparison set, starting with the unconstrained baseline.
pub fn default_scenarios() -> Vec<Scenario> {
    let policy = |minor: Frequency, medium: Frequency, major: Frequency| {
        Severity::ALL
            .iter()
            .zip([minor, medium, major].iter())
            .map(|(&sev, f)| (pm_var(sev), f.state()))
            .collect::<Evidence>()
    };
    vec![
        Scenario::new(BASELINE, Evidence::new()),
        Scenario::new("High wind", Evidence::new().with(WIND, 2)),
        Scenario::new("Heavy rain", Evidence::new().with(RAIN, 4)),
        Scenario::new("Fog", Evidence::new().with(VISIBILITY, 3)),
        Scenario::new(
            "No maintenance",
            policy(Frequency::None, Frequency::None, Frequency::None),
        ),
        Scenario::new(
            "Intensive maintenance",
            policy(Frequency::Weekly, Frequency::Monthly, Frequency::Monthly),
        ),
        Scenario::new(
            "Aged fleet",
            Equipment::ALL
                .iter()
                .map(|&eq| (age_var(eq), AgeClass::Old.state()))
                .collect(),
        ),
        Scenario::new(
            "Operator shortage",
            Evidence::new().with(OPERATOR_AVAILABILITY, 3),
        ),
    ]
}
