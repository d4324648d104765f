mod discrete;

use std::collections::HashMap;

use once_cell::sync::Lazy;
use quaybn_maths::dists::Categorical;
use quaybn_maths::model::*;

// states: 1 = false, 2 = true
const ORDER: [&str; 4] = ["cloudy", "sprinkler", "rain", "wet_grass"];

static LOGGER: Lazy<()> = Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

fn init_logger() {
    Lazy::force(&LOGGER);
}

fn discvar_constructor() -> HashMap<String, Cpd> {
    let mut cpds = HashMap::new();
    cpds.insert(
        "cloudy".to_owned(),
        Cpd::from(Categorical::new(vec![0.5, 0.5]).unwrap()),
    );

    let sprinkler = Variable::new("sprinkler", 2);
    let elements = vec![vec![0.5_f64, 0.5], vec![0.9, 0.1]];
    let cpt = CPT::from_rows(&sprinkler, vec![Parent::new("cloudy", 2)], elements).unwrap();
    cpds.insert("sprinkler".to_owned(), Cpd::from(cpt));

    let rain = Variable::new("rain", 2);
    let elements = vec![vec![0.8_f64, 0.2], vec![0.2, 0.8]];
    let cpt = CPT::from_rows(&rain, vec![Parent::new("cloudy", 2)], elements).unwrap();
    cpds.insert("rain".to_owned(), Cpd::from(cpt));

    let wet_grass = Variable::new("wet_grass", 2);
    let elements = vec![
        vec![1.0_f64, 0.0],
        vec![0.1, 0.9],
        vec![0.1, 0.9],
        vec![0.01, 0.99],
    ];
    let parents = vec![Parent::new("sprinkler", 2), Parent::new("rain", 2)];
    let cpt = CPT::from_rows(&wet_grass, parents, elements).unwrap();
    cpds.insert("wet_grass".to_owned(), Cpd::from(cpt));
    cpds
}
