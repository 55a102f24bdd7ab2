//! End-to-end evaluation of the nominal compression system.

use hl_components::ComponentError;
use hl_cycle::{CompressionSystem, CycleError, DesignPoint, INPUT_NAMES, KantrowitzLimit, sweep};
use hl_fluids::IdealGasModel;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn nominal_design_point() {
    init_tracing();
    let fluid = IdealGasModel::new();
    let system = CompressionSystem::new(&DesignPoint::default()).expect("nominal design builds");
    let sol = system.evaluate(&fluid).expect("nominal design evaluates");

    assert!(sol.pwr > 0.0 && sol.fnet > 0.0);
    assert!((sol.w_in - 0.4043).abs() < 1e-3, "W = {}", sol.w_in);
    assert!((sol.f_ram - 69.35).abs() < 0.05, "F_ram = {}", sol.f_ram);
    assert!((sol.c1_pwr - 164_056.0).abs() < 1_000.0, "C1 = {}", sol.c1_pwr);
    assert!((sol.c2_pwr - 100_420.0).abs() < 1_000.0, "C2 = {}", sol.c2_pwr);
    assert!((sol.pwr - 264_476.0).abs() < 2_000.0, "pwr = {}", sol.pwr);
    assert!((sol.fnet - 91.85).abs() < 1.5, "Fnet = {}", sol.fnet);
    assert!((sol.ps_bearing - 5_803.2).abs() < 10.0, "Ps = {}", sol.ps_bearing);

    let residuals = sol.residuals().unwrap();
    for name in [
        "diffuser.area_resid",
        "comp1_funnel.area_resid",
        "comp2_funnel.area_resid",
        "perf.ps_bearing_resid",
    ] {
        assert!(residuals.contains_key(name), "missing {name}");
    }
}

#[test]
fn stage_failures_abort_with_context() {
    init_tracing();
    let fluid = IdealGasModel::new();

    let greedy = DesignPoint {
        split_w1: 0.44,
        ..DesignPoint::default()
    };
    let err = CompressionSystem::new(&greedy)
        .unwrap()
        .evaluate(&fluid)
        .unwrap_err();
    assert!(matches!(
        err,
        CycleError::Stage { ref stage, source: ComponentError::NegativeFlow { .. } } if stage == "split"
    ));
    assert!(err.to_string().contains("0.44"));

    // A diffuser far smaller than the sonic area has no subsonic solution
    let choked = DesignPoint {
        diffuser_area: Some(0.01),
        ..DesignPoint::default()
    };
    let err = CompressionSystem::new(&choked)
        .unwrap()
        .evaluate(&fluid)
        .unwrap_err();
    assert!(matches!(err, CycleError::Stage { ref stage, .. } if stage == "diffuser"));
    assert!(err.is_convergence());
}

#[test]
fn every_input_name_is_accepted() {
    let design = DesignPoint::default();
    for name in INPUT_NAMES {
        assert!(design.input(name).is_ok(), "{name}");
    }
}

#[test]
fn pod_mach_sweep() {
    init_tracing();
    let values = [0.3, 0.4, 0.5, 0.6];
    let points = sweep(&IdealGasModel::new(), &DesignPoint::default(), "pod_mach", &values)
        .expect("known input");

    assert_eq!(points.len(), values.len());
    let captured: Vec<f64> = points
        .iter()
        .map(|p| p.result.as_ref().expect("point evaluates").w_in)
        .collect();
    // Faster pods capture more air through the same inlet
    assert!(captured.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn kantrowitz_limit_rises_with_tube_size() {
    let fluid = IdealGasModel::new();
    let mut last = 0.0;
    for radius in [1.0, 1.115, 1.5, 2.0] {
        let report = KantrowitzLimit {
            tube_radius: radius,
            ..KantrowitzLimit::default()
        }
        .solve(&fluid)
        .expect("limit solves");
        assert!(report.limit_mach > last && report.limit_mach < 1.0);
        last = report.limit_mach;
    }
}
