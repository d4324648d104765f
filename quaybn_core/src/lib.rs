//! Delay propagation at a container terminal as a discrete Bayesian network.
//!
//! Weather drives crane operability and handling efficiency; equipment age and
//! preventive maintenance drive the availability of quay cranes, yard cranes
//! and haul trucks; together with the operators they set the delay level.
//! The network is queried by Monte Carlo through [`quaybn_maths`].

pub mod catalog;
pub mod maintenance;
pub mod network;
pub mod operations;
pub mod reliability;
pub mod scenario;
pub mod weather;

mod config;

pub use self::config::{Logger, RunConfig, RunConfigError};
pub use self::network::{build_network, declared_order, TerminalConfig};
pub use self::operations::AvailabilityModel;
pub use self::scenario::{
    default_scenarios, evaluate_scenarios, percent_delta, sensitivity_sweep, Scenario,
    ScenarioError, ScenarioTable, SensitivityRow, BASELINE,
};
pub use quaybn_maths::sampling::Evidence;
pub use quaybn_maths::SimRng;
