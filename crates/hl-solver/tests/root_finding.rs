//! Root finders against the isentropic area-Mach relation.

use hl_solver::{BisectConfig, SecantConfig, SolverError, SolverResult, bisect, secant};

fn area_ratio(mach: f64, gamma: f64) -> f64 {
    let g_exp = (gamma + 1.0) / (2.0 * (gamma - 1.0));
    ((gamma + 1.0) / 2.0).powf(-g_exp) * (1.0 + (gamma - 1.0) / 2.0 * mach * mach).powf(g_exp)
        / mach
}

#[test]
fn bisection_picks_the_requested_branch() {
    let target = 1.6875; // A/A* at M = 2 and M ~ 0.372 for gamma 1.4
    let cfg = BisectConfig::default();
    let f = |m: f64| -> SolverResult<f64> { Ok(area_ratio(m, 1.4) - target) };

    let sub = bisect(f, 1e-4, 1.0, &cfg).unwrap();
    let sup = bisect(f, 1.0, 50.0, &cfg).unwrap();

    assert!(sub.x < 1.0 && (sub.x - 0.3722).abs() < 1e-3);
    assert!((sup.x - 2.0).abs() < 1e-6);
}

#[test]
fn bisection_rejects_area_below_throat() {
    let f = |m: f64| -> SolverResult<f64> { Ok(area_ratio(m, 1.4) - 0.9) };
    let err = bisect(f, 1e-4, 1.0, &BisectConfig::default()).unwrap_err();
    assert!(matches!(err, SolverError::NoSignChange { .. }));
}

#[test]
fn secant_from_point_three_reaches_subsonic_root() {
    let target = 1.6875;
    let f = |m: f64| -> SolverResult<f64> { Ok(area_ratio(m, 1.4) - target) };
    let root = secant(f, 0.3, 0.31, &SecantConfig::default()).unwrap();
    assert!((root.x - 0.3722).abs() < 1e-3);
    assert!(root.residual.abs() < 1e-9);
}
