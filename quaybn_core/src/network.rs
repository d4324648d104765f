//! The terminal delay network: variable names, declared order and assembly
//! from a [`TerminalConfig`].

use std::collections::HashMap;

use quaybn_maths::model::{assemble, BayesNet, Cpd};
use quaybn_maths::ModelError;

use crate::catalog::{Equipment, EquipmentCatalog, MaintenanceModel, Severity};
use crate::maintenance::SolverSettings;
use crate::operations::{
    age_prior, availability_cpd, capacity_cpt, delay_cpt, maintenance_priors, operator_prior,
    AvailabilityModel, MaintenancePriors, OperationsConfig,
};
use crate::reliability::ReliabilityProfile;
use crate::weather::{crane_operable_cpt, efficiency_cpt, weather_priors, WeatherConfig};

pub const WIND: &str = "Wind";
pub const RAIN: &str = "Rain";
pub const VISIBILITY: &str = "Visibility";
pub const CRANE_OPERABLE: &str = "Crane_Operable";
pub const EFFICIENCY: &str = "Efficiency";
pub const PM_MINOR: &str = "PM_Minor";
pub const PM_MEDIUM: &str = "PM_Medium";
pub const PM_MAJOR: &str = "PM_Major";
pub const EQUIPMENT_CAPACITY: &str = "Equipment_Capacity";
pub const OPERATOR_AVAILABILITY: &str = "Operator_Availability";
pub const DELAY: &str = "Delay";

/// `QC_Age`, `YC_Age`, `HT_Age`.
pub fn age_var(equipment: Equipment) -> String {
    format!("{}_Age", equipment.code())
}

/// `QC_Availability`, `YC_Availability`, `HT_Availability`.
pub fn availability_var(equipment: Equipment) -> String {
    format!("{}_Availability", equipment.code())
}

pub fn pm_var(severity: Severity) -> &'static str {
    match severity {
        Severity::Minor => PM_MINOR,
        Severity::Medium => PM_MEDIUM,
        Severity::Major => PM_MAJOR,
    }
}

/// Node order of the network; every parent comes before its children.
pub fn declared_order() -> Vec<String> {
    let mut order: Vec<String> = [WIND, RAIN, VISIBILITY, CRANE_OPERABLE, EFFICIENCY]
        .iter()
        .map(|s| (*s).to_owned())
        .collect();
    order.extend(Severity::ALL.iter().map(|&s| pm_var(s).to_owned()));
    order.extend(Equipment::ALL.iter().map(|&eq| age_var(eq)));
    order.extend(Equipment::ALL.iter().map(|&eq| availability_var(eq)));
    order.extend(
        [EQUIPMENT_CAPACITY, OPERATOR_AVAILABILITY, DELAY]
            .iter()
            .map(|s| (*s).to_owned()),
    );
    order
}

/// Every constant the network is built from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TerminalConfig {
    pub weather: WeatherConfig,
    pub catalog: EquipmentCatalog,
    pub maintenance: MaintenanceModel,
    pub maintenance_priors: MaintenancePriors,
    pub solver: SolverSettings,
    pub operations: OperationsConfig,
    pub availability_model: AvailabilityModel,
}

/// Builds the conditional distribution of every node, keyed by name.
pub fn build_cpds(config: &TerminalConfig) -> Result<HashMap<String, Cpd>, ModelError> {
    let mut cpds: HashMap<String, Cpd> = HashMap::new();
    for (name, cpd) in weather_priors(&config.weather)? {
        cpds.insert(name.to_owned(), cpd);
    }
    cpds.insert(
        CRANE_OPERABLE.to_owned(),
        crane_operable_cpt(&config.weather)?.into(),
    );
    cpds.insert(EFFICIENCY.to_owned(), efficiency_cpt(&config.weather)?.into());

    for (name, cpd) in maintenance_priors(&config.maintenance_priors)? {
        cpds.insert(name.to_owned(), cpd);
    }
    for &eq in Equipment::ALL.iter() {
        let spec = config.catalog.spec(eq);
        cpds.insert(age_var(eq), age_prior(&spec.age_prior)?);
        let profile = ReliabilityProfile::new(&config.catalog, eq)?;
        cpds.insert(
            availability_var(eq),
            availability_cpd(
                profile,
                config.availability_model,
                &config.maintenance,
                &config.solver,
            ),
        );
    }

    cpds.insert(
        EQUIPMENT_CAPACITY.to_owned(),
        capacity_cpt(&config.operations)?.into(),
    );
    cpds.insert(
        OPERATOR_AVAILABILITY.to_owned(),
        operator_prior(&config.operations)?,
    );
    cpds.insert(DELAY.to_owned(), delay_cpt(&config.operations)?.into());
    Ok(cpds)
}

/// Builds and assembles the terminal network.
pub fn build_network(config: &TerminalConfig) -> Result<BayesNet, ModelError> {
    let cpds = build_cpds(config)?;
    let order = declared_order();
    let net = assemble(cpds, order.as_slice())?;
    log::info!(
        "terminal network assembled: {} nodes, {:?} availability",
        net.var_num(),
        config.availability_model
    );
    Ok(net)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_has_every_node_once() {
        let order = declared_order();
        assert_eq!(order.len(), 17);
        assert_eq!(order[0], WIND);
        assert_eq!(order.last().map(String::as_str), Some(DELAY));
        let mut sorted = order.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), order.len());
    }

    #[test]
    fn default_network() {
        let net = build_network(&TerminalConfig::default()).unwrap();
        assert_eq!(net.var_num(), 17);
        assert!(net.warnings().is_empty());
        let qc = net.node("QC_Availability").unwrap();
        assert_eq!(qc.parents_positions().len(), 4);
        let delay = net.node(DELAY).unwrap();
        assert_eq!(delay.k(), 5);
        assert!(net.ancestors(DELAY).contains(&WIND));
    }

    #[test]
    fn intrinsic_availability_drops_maintenance_edges() {
        let config = TerminalConfig {
            availability_model: AvailabilityModel::Intrinsic,
            ..TerminalConfig::default()
        };
        let net = build_network(&config).unwrap();
        assert_eq!(net.var_num(), 17);
        let ht = net.node("HT_Availability").unwrap();
        assert_eq!(ht.parents_positions().len(), 1);
        assert!(!net.ancestors(DELAY).contains(&PM_MAJOR));
    }

    #[test]
    fn missing_nodes() {
        let config = TerminalConfig::default();
        let order = declared_order();

        let mut cpds = build_cpds(&config).unwrap();
        cpds.remove(DELAY);
        let net = assemble(cpds, order.as_slice()).unwrap();
        assert_eq!(net.var_num(), 16);
        assert_eq!(net.warnings().len(), 1);
        assert_eq!(net.warnings()[0].name, DELAY);

        let mut cpds = build_cpds(&config).unwrap();
        cpds.remove(OPERATOR_AVAILABILITY);
        // the delay table still names the operators as a parent
        assert!(matches!(
            assemble(cpds, order.as_slice()),
            Err(ModelError::UnknownParent { .. })
        ));
    }

    #[test]
    fn bad_catalog_fails_the_build() {
        let mut config = TerminalConfig::default();
        config.catalog.spec_mut(Equipment::HaulTruck).repair_sigma = -1.0;
        assert!(matches!(build_network(&config), Err(ModelError::Dist(_))));
    }
}
