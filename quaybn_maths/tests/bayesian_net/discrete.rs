use quaybn_maths::inference::{log_likelihood, query_distribution};
use quaybn_maths::model::*;
use quaybn_maths::sampling::{sample_batch, Evidence, SamplerConfig};
use quaybn_maths::{ModelError, SimRng};

use super::{discvar_constructor, init_logger, ORDER};

#[test]
fn build() {
    init_logger();
    let net = assemble(discvar_constructor(), &ORDER).unwrap();
    assert_eq!(net.var_num(), 4);
    let wet = net.node("wet_grass").unwrap();
    assert_eq!(wet.parents_positions(), &[1, 2]);
    match wet.cpd() {
        Cpd::Tabular(cpt) => {
            // (sprinkler = true, rain = false) is row (2 - 1)·2 + (1 - 1)
            assert_eq!(cpt.row_index(&[2, 1]), 2);
            assert_eq!(cpt.row_for(&[2, 1]).pmf(2), 0.9);
        }
        _ => panic!("wet_grass should be tabular"),
    }
}

#[test]
fn build_without_rain() {
    init_logger();
    let mut cpds = discvar_constructor();
    cpds.remove("rain");
    let err = assemble(cpds, &ORDER).unwrap_err();
    assert!(matches!(err, ModelError::UnknownParent { ref parent, .. } if parent == "rain"));

    let mut cpds = discvar_constructor();
    cpds.remove("rain");
    cpds.remove("wet_grass");
    let net = assemble(cpds, &ORDER).unwrap();
    assert_eq!(net.var_num(), 2);
    assert_eq!(net.warnings().len(), 2);
}

#[test]
fn sample() {
    init_logger();
    let net = assemble(discvar_constructor(), &ORDER).unwrap();
    let mut rng = SimRng::new(2024);
    let n = 100_000;
    let samples = sample_batch(&net, n, None, &SamplerConfig::default(), &mut rng).unwrap();
    let wet = samples
        .iter()
        .filter(|s| s.state_of(&net, "wet_grass") == Some(2))
        .count();
    // P(wet) = 0.9·0.41 + 0.9·0.21 + 0.99·0.09
    assert!((wet as f64 / n as f64 - 0.6471).abs() < 0.01);
}

#[test]
fn pinned_parents_reproduce_the_row() {
    init_logger();
    let net = assemble(discvar_constructor(), &ORDER).unwrap();
    let mut rng = SimRng::new(7);
    for &(s, r, expected) in &[(1, 2, 0.9), (2, 1, 0.9), (2, 2, 0.99), (1, 1, 0.0)] {
        let ev = Evidence::new().with("sprinkler", s).with("rain", r);
        let post = query_distribution(&net, "wet_grass", &ev, 200_000, &mut rng).unwrap();
        assert!(post.matches > 0);
        assert!((post.prob(2).unwrap() - expected).abs() < 0.01);
    }
}

#[test]
fn diagnostic_query() {
    init_logger();
    let net = assemble(discvar_constructor(), &ORDER).unwrap();
    let mut rng = SimRng::new(99);
    let ev = Evidence::new().with("wet_grass", 2);
    let post = query_distribution(&net, "rain", &ev, 200_000, &mut rng).unwrap();
    assert!((post.prob(2).unwrap() - 0.7079).abs() < 0.01);

    let ll = log_likelihood(&net, &ev, 200_000, &mut rng).unwrap();
    assert!((ll - 0.6471_f64.ln()).abs() < 0.02);

    let batch = sample_batch(&net, 1_000, Some(&ev), &SamplerConfig::default(), &mut rng).unwrap();
    assert!(batch.iter().all(|s| s.state_of(&net, "wet_grass") == Some(2)));
}
