//! Integration tests for the two-pass estimator, pruning and the study driver.

use approx::assert_abs_diff_eq;
use macbeth_data::{AssetReturnTable, RiskFactorSeries};
use macbeth_estimation::{
    BetaVector, FactorRun, RansacConfig, Study, StudyConfig, fit_line, prune_sweep, robust_fit,
    stage_one, stage_two,
};
use ndarray::ArrayView1;

fn years(n: usize) -> Vec<String> {
    (0..n).map(|t| (1960 + t).to_string()).collect()
}

#[test]
fn test_end_to_end_two_assets() {
    let factor = RiskFactorSeries::new("growth", vec![None, Some(0.01), Some(0.02), Some(-0.01)]);
    let assets = AssetReturnTable::new(
        "year",
        years(4),
        vec![
            ("a".into(), vec![Some(0.5), Some(0.03), Some(0.05), Some(0.00)]),
            ("b".into(), vec![Some(0.7), Some(0.02), Some(0.01), Some(0.04)]),
        ],
    )
    .unwrap();

    let first_pass = stage_one(&factor, &assets, 1, 1).unwrap();
    assert_eq!(first_pass.len(), 2);
    assert_eq!(first_pass.get("a").unwrap().n_obs, 3);

    let premia = stage_two(&assets.tail(1), &first_pass.betas()).unwrap();
    assert_eq!(premia.n_periods(), 3);
    assert!(premia.skipped.is_empty());
    assert!(premia.lambda.is_finite());
    assert!(premia.lambda0.is_finite());
}

/// Eight clean assets on a per-period line in beta plus one low-beta and one
/// high-beta asset with inflated returns.
fn contaminated_cross_section() -> (BetaVector, AssetReturnTable) {
    let intercepts = [1.0, 2.0, 0.5];
    let slopes = [0.5, 0.3, 0.7];
    let mut betas = BetaVector::new();
    let mut columns = Vec::new();
    let mut push = |id: String, beta: f64, shift: f64| {
        betas.insert(id.clone(), beta);
        let column: Vec<Option<f64>> = (0..3)
            .map(|t| Some(intercepts[t] + slopes[t] * beta + shift))
            .collect();
        columns.push((id, column));
    };
    for b in 1..=8 {
        push(format!("p{b}"), f64::from(b), 0.0);
    }
    push("out_lo".into(), -2.0, 8.0);
    push("out_hi".into(), 7.5, 3.0);
    let assets = AssetReturnTable::new("year", years(3), columns).unwrap();
    (betas, assets)
}

#[test]
fn test_pruning_moves_intercept_toward_clean_value() {
    let (betas, assets) = contaminated_cross_section();
    let clean_lambda0 = (1.0 + 2.0 + 0.5) / 3.0;

    let frames = prune_sweep(&betas, &assets, 0..=3).unwrap();
    let distance: Vec<f64> = frames
        .iter()
        .map(|f| (f.premia.lambda0 - clean_lambda0).abs())
        .collect();

    assert!(distance[1] < distance[0]);
    assert!(distance[2] < distance[1]);
    assert!(distance[2] < 1e-9);
    assert!(distance[3] < 1e-9);
    assert_abs_diff_eq!(frames[2].premia.lambda, 0.5, epsilon = 1e-9);

    let removed: Vec<&str> = frames[2].subset.removed().map(String::as_str).collect();
    assert_eq!(removed, vec!["out_lo", "p1", "p8", "out_hi"]);
}

#[test]
fn test_ransac_properties() {
    let x = [1.0, 2.0, 3.0, 3.5, 4.0, 5.0, 6.0, 6.5, 7.0, 8.0];
    let y: Vec<f64> = x
        .iter()
        .map(|&v| 1.0 + 0.5 * v + if v == 3.5 || v == 6.5 { 10.0 } else { 0.0 })
        .collect();

    let wide = RansacConfig {
        residual_threshold: 1e6,
        ..Default::default()
    };
    let fit = robust_fit(&x, &y, &wide).unwrap();
    let ols = fit_line(ArrayView1::from(&x[..]), ArrayView1::from(&y)).unwrap();
    assert!(fit.inlier_mask.iter().all(|&m| m));
    assert_abs_diff_eq!(fit.slope, ols.slope, epsilon = 1e-10);
    assert_abs_diff_eq!(fit.intercept, ols.intercept, epsilon = 1e-10);

    let tight = RansacConfig {
        residual_threshold: 0.5,
        random_seed: 42,
        ..Default::default()
    };
    let fit = robust_fit(&x, &y, &tight).unwrap();
    assert_eq!(fit.outliers(), vec![3, 7]);
}

/// Six assets priced by the factor and two with the same exposures but
/// average returns lifted by 10.
fn study_inputs() -> (AssetReturnTable, RiskFactorSeries) {
    let factor = [f64::NAN, 0.4, -0.3, 1.2, 0.1, -0.6];
    let mut columns = Vec::new();
    let mut add = |id: &str, beta: f64, alpha: f64| {
        let column: Vec<Option<f64>> = factor
            .iter()
            .map(|f| Some(alpha + beta * if f.is_nan() { 0.0 } else { *f }))
            .collect();
        columns.push((id.to_string(), column));
    };
    for b in 1..=6 {
        add(&format!("p{b}"), f64::from(b), 1.0);
    }
    add("o1", 2.5, 11.0);
    add("o2", 4.5, 11.0);
    (
        AssetReturnTable::new("year", years(6), columns).unwrap(),
        RiskFactorSeries::from_f64("growth", &factor),
    )
}

#[test]
fn test_study_flags_lifted_assets() {
    let (assets, factor) = study_inputs();
    let study = Study::new(StudyConfig {
        ransac: RansacConfig {
            residual_threshold: 0.5,
            ..Default::default()
        },
        ..Default::default()
    });
    let report = study
        .run(
            &assets,
            &[
                FactorRun::new("filtered", factor.clone(), 1, 1),
                FactorRun::new("unfiltered", factor, 3, 3),
            ],
        )
        .unwrap();

    assert_eq!(report.runs.len(), 2);
    for run in &report.runs {
        assert_eq!(run.first_pass.len(), 8);
        assert_abs_diff_eq!(run.betas().get("o2").unwrap(), 4.5, epsilon = 1e-9);
        assert_eq!(run.pruning.len(), 3);
        let outliers: Vec<&str> = run.robust.outliers().into_iter().map(String::as_str).collect();
        assert_eq!(outliers, vec!["o1", "o2"]);
        assert_abs_diff_eq!(run.robust.fit.intercept, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_study_config_from_json() {
    let config: StudyConfig =
        serde_json::from_str(r#"{ "max_prune_level": 1, "ransac": { "random_seed": 7 } }"#)
            .unwrap();
    assert_eq!(config.max_prune_level, 1);
    assert_eq!(config.ransac.random_seed, 7);
    assert_eq!(config.ransac.max_trials, 100);
    assert!(!config.align_second_pass);
}
