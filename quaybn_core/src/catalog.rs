//! Published reliability and maintenance constants for the terminal fleet.
//!
//! Every enum here maps to the one-based states of a network variable through
//! `state()`/`from_state()`; the order of `ALL` is the state order.

use std::fmt;

/// Hours in the availability horizon (one year).
pub const HOURS_PER_YEAR: f64 = 8760.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Equipment {
    QuayCrane,
    YardCrane,
    HaulTruck,
}

impl Equipment {
    pub const ALL: [Equipment; 3] = [
        Equipment::QuayCrane,
        Equipment::YardCrane,
        Equipment::HaulTruck,
    ];

    /// Short code used as the prefix of the equipment's network variables.
    pub fn code(self) -> &'static str {
        match self {
            Equipment::QuayCrane => "QC",
            Equipment::YardCrane => "YC",
            Equipment::HaulTruck => "HT",
        }
    }

    fn idx(self) -> usize {
        match self {
            Equipment::QuayCrane => 0,
            Equipment::YardCrane => 1,
            Equipment::HaulTruck => 2,
        }
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeClass {
    New,
    Mid,
    Old,
}

impl AgeClass {
    pub const ALL: [AgeClass; 3] = [AgeClass::New, AgeClass::Mid, AgeClass::Old];

    pub fn state(self) -> usize {
        self as usize + 1
    }

    pub fn from_state(state: usize) -> Option<AgeClass> {
        AgeClass::ALL.get(state.checked_sub(1)?).copied()
    }
}

/// Preventive maintenance severity classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Minor,
    Medium,
    Major,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Minor, Severity::Medium, Severity::Major];

    pub(crate) fn idx(self) -> usize {
        self as usize
    }
}

/// How often a maintenance class is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    None,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::None,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ];

    /// Maintenance events per year.
    pub fn annual_events(self) -> f64 {
        match self {
            Frequency::None => 0.0,
            Frequency::Weekly => 52.0,
            Frequency::Monthly => 12.0,
            Frequency::Yearly => 1.0,
        }
    }

    pub fn state(self) -> usize {
        self as usize + 1
    }

    pub fn from_state(state: usize) -> Option<Frequency> {
        Frequency::ALL.get(state.checked_sub(1)?).copied()
    }
}

/// Weibull life parameters: shape `β` and scale `η` (hours).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifeParams {
    pub shape: f64,
    pub scale: f64,
}

impl LifeParams {
    pub const fn new(shape: f64, scale: f64) -> LifeParams {
        LifeParams { shape, scale }
    }
}

/// Cut points used to discretize a continuous availability into
/// Low/Medium/High, with a linear ramp of half-width `margin` at each cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvailabilityThresholds {
    pub low: f64,
    pub high: f64,
    pub margin: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentSpec {
    /// Life parameters indexed by age class.
    pub life: [LifeParams; 3],
    /// Repair time before truncation at zero: mean and standard deviation (hours).
    pub repair_mu: f64,
    pub repair_sigma: f64,
    /// Downtime per normalized preventive maintenance event, indexed by
    /// severity (hours). Must stay below the repair downtime an event saves,
    /// or more frequent maintenance lowers the availability.
    pub pm_duration: [f64; 3],
    pub thresholds: AvailabilityThresholds,
    /// Prior over New/Mid/Old.
    pub age_prior: [f64; 3],
}

impl EquipmentSpec {
    pub fn life(&self, age: AgeClass) -> LifeParams {
        self.life[age as usize]
    }

    pub fn pm_duration(&self, severity: Severity) -> f64 {
        self.pm_duration[severity.idx()]
    }
}

/// Per-equipment constants for the whole fleet.
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentCatalog {
    specs: [EquipmentSpec; 3],
}

impl EquipmentCatalog {
    pub fn new(quay_crane: EquipmentSpec, yard_crane: EquipmentSpec, haul_truck: EquipmentSpec) -> Self {
        EquipmentCatalog {
            specs: [quay_crane, yard_crane, haul_truck],
        }
    }

    pub fn spec(&self, equipment: Equipment) -> &EquipmentSpec {
        &self.specs[equipment.idx()]
    }

    pub fn spec_mut(&mut self, equipment: Equipment) -> &mut EquipmentSpec {
        &mut self.specs[equipment.idx()]
    }
}

const AGE_PRIOR: [f64; 3] = [0.3, 0.5, 0.2];

impl Default for EquipmentCatalog {
    fn default() -> Self {
        EquipmentCatalog::new(
            EquipmentSpec {
                life: [
                    LifeParams::new(1.2, 900.0),
                    LifeParams::new(1.6, 650.0),
                    LifeParams::new(2.2, 450.0),
                ],
                repair_mu: 8.0,
                repair_sigma: 3.0,
                pm_duration: [0.1, 0.5, 4.0],
                thresholds: AvailabilityThresholds {
                    low: 0.92,
                    high: 0.97,
                    margin: 0.02,
                },
                age_prior: AGE_PRIOR,
            },
            EquipmentSpec {
                life: [
                    LifeParams::new(1.1, 800.0),
                    LifeParams::new(1.5, 600.0),
                    LifeParams::new(2.0, 420.0),
                ],
                repair_mu: 6.0,
                repair_sigma: 2.5,
                pm_duration: [0.08, 0.4, 3.0],
                thresholds: AvailabilityThresholds {
                    low: 0.93,
                    high: 0.975,
                    margin: 0.02,
                },
                age_prior: AGE_PRIOR,
            },
            EquipmentSpec {
                life: [
                    LifeParams::new(1.0, 600.0),
                    LifeParams::new(1.4, 450.0),
                    LifeParams::new(1.9, 320.0),
                ],
                repair_mu: 4.0,
                repair_sigma: 2.0,
                pm_duration: [0.06, 0.3, 2.2],
                thresholds: AvailabilityThresholds {
                    low: 0.94,
                    high: 0.98,
                    margin: 0.02,
                },
                age_prior: AGE_PRIOR,
            },
        )
    }
}

/// Effect of one maintenance class on the life distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaintenanceClass {
    /// Fraction of virtual age removed per (normalized) event.
    pub rejuvenation: f64,
    /// Weight of the rejuvenation on the scale.
    pub scale_effect: f64,
    /// Per-event reduction of the wear-out shape.
    pub shape_effect: f64,
}

/// Constants of the virtual-age adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceModel {
    /// Indexed by severity.
    pub classes: [MaintenanceClass; 3],
    /// Annual events are divided by this before entering the adjustment.
    pub frequency_norm: f64,
    pub shape_sensitivity: f64,
    /// Upper bound on the relative shape reduction.
    pub max_shape_drop: f64,
    /// Floor applied to the rejuvenation factor before dividing the scale.
    pub min_rejuvenation: f64,
}

impl MaintenanceModel {
    pub fn class(&self, severity: Severity) -> &MaintenanceClass {
        &self.classes[severity.idx()]
    }
}

impl Default for MaintenanceModel {
    fn default() -> Self {
        MaintenanceModel {
            classes: [
                MaintenanceClass {
                    rejuvenation: 0.05,
                    scale_effect: 0.6,
                    shape_effect: 0.01,
                },
                MaintenanceClass {
                    rejuvenation: 0.15,
                    scale_effect: 0.8,
                    shape_effect: 0.03,
                },
                MaintenanceClass {
                    rejuvenation: 0.40,
                    scale_effect: 1.0,
                    shape_effect: 0.08,
                },
            ],
            frequency_norm: 12.0,
            shape_sensitivity: 1.0,
            max_shape_drop: 0.30,
            min_rejuvenation: 1e-6,
        }
    }
}
