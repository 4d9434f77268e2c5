//! Invariant tests over seeds, shapes and predictors.
//!
//! Covers additivity, symmetry, dummy features, linearity in the
//! predictor, seed determinism, budget accounting and chunking
//! equivalence, on both the exact-enumeration and Monte-Carlo paths.

use approx::assert_abs_diff_eq;
use rstest::rstest;

use kernelshap::testing::{random_matrix, random_weights, with_constant_column, LogisticModel, LinearModel};
use kernelshap::{
    ExplainConfig, ExplainError, FnPredictor, KernelExplainer, Matrix, MatrixView, Predictor,
};

fn explainer_with(
    model: impl Predictor,
    background: Matrix,
    config: ExplainConfig,
) -> KernelExplainer<impl Predictor> {
    KernelExplainer::new(model, background, config).unwrap()
}

// =============================================================================
// Additivity (efficiency)
// =============================================================================

#[rstest]
#[case(2, 1)]
#[case(3, 7)]
#[case(6, 3)]
#[case(12, 5)]
#[case(25, 9)]
fn additivity_holds_for_linear_models(#[case] d: usize, #[case] seed: u64) {
    let background = random_matrix(8, d, seed, -2.0, 2.0);
    let model = LinearModel::new(random_weights(d, seed ^ 0xabcd), 0.3);
    let explainer = explainer_with(model, background, ExplainConfig::default());

    let query = random_matrix(1, d, seed ^ 0x77, -2.0, 2.0);
    let explanation = explainer.explain(query.row_slice(0)).unwrap();
    assert!(
        explanation.verify(1e-6),
        "additivity violated for d = {}, seed = {}",
        d,
        seed
    );
}

#[rstest]
#[case(4, 11)]
#[case(9, 2)]
#[case(16, 8)]
fn additivity_holds_for_logistic_models(#[case] d: usize, #[case] seed: u64) {
    let background = random_matrix(6, d, seed, 0.0, 1.0);
    let model = LogisticModel::new(random_weights(d, seed ^ 0x55), -0.2);
    let explainer = explainer_with(model, background, ExplainConfig::default());

    let query = random_matrix(1, d, seed ^ 0x99, 0.0, 1.0);
    let explanation = explainer.explain(query.row_slice(0)).unwrap();
    assert!(explanation.verify(1e-6));
}

// =============================================================================
// Symmetry
// =============================================================================

/// Background with identical first two columns: swapping features 0 and 1
/// leaves the predictor and the data distribution unchanged.
fn symmetric_background(rows: usize, d: usize, seed: u64) -> Matrix {
    let mut data = random_matrix(rows, d, seed, 0.0, 1.0).into_vec();
    for i in 0..rows {
        data[i * d + 1] = data[i * d];
    }
    Matrix::from_vec(data, rows, d)
}

#[test]
fn exchangeable_features_get_equal_attribution_exact() {
    let d = 6;
    let background = symmetric_background(5, d, 21);
    // Equal weights on the exchangeable pair; the sigmoid keeps the model
    // nonlinear.
    let mut weights = random_weights(d, 4);
    weights[1] = weights[0];
    let model = LogisticModel::new(weights, -0.1);
    let explainer = explainer_with(model, background, ExplainConfig::default());

    let mut x = random_matrix(1, d, 77, 0.0, 1.0).into_vec();
    x[1] = x[0];
    let explanation = explainer.explain(&x).unwrap();
    assert!(explanation.is_exact());
    for output in 0..2 {
        assert_abs_diff_eq!(
            explanation.value(0, output),
            explanation.value(1, output),
            epsilon = 1e-8
        );
    }
}

#[test]
fn exchangeable_features_get_close_attribution_sampled() {
    let d = 12;
    let background = symmetric_background(6, d, 33);
    let model = LogisticModel::new(vec![0.1; d], 0.05);
    let explainer = explainer_with(model, background, ExplainConfig::default());

    let mut x = random_matrix(1, d, 13, 0.0, 1.0).into_vec();
    x[1] = x[0];
    let explanation = explainer.explain(&x).unwrap();
    assert!(!explanation.is_exact());
    for output in 0..2 {
        let gap = (explanation.value(0, output) - explanation.value(1, output)).abs();
        assert!(gap < 1e-2, "symmetry gap {} on the sampled path", gap);
    }
}

// =============================================================================
// Dummy features
// =============================================================================

#[test]
fn dummy_feature_gets_zero_attribution_sampled() {
    // Eleven informative features plus a constant column; the default
    // budget for d = 12 forces Monte-Carlo sampling. The linear model is
    // fitted exactly, so the dummy coefficient vanishes despite sampling.
    let d = 12;
    let background = with_constant_column(&random_matrix(6, d - 1, 3, -1.0, 1.0), 0.5);
    let mut weights = random_weights(d - 1, 19);
    weights.push(2.0);
    let model = LinearModel::new(weights, 0.1);
    let explainer = explainer_with(model, background, ExplainConfig::default());

    let mut x = random_matrix(1, d - 1, 41, -1.0, 1.0).into_vec();
    x.push(0.5);
    let explanation = explainer.explain(&x).unwrap();
    assert!(!explanation.is_exact());
    assert!(explanation.value(d - 1, 0).abs() < 1e-4);
    assert!(explanation.verify(1e-6));
}

// =============================================================================
// Linearity in the predictor
// =============================================================================

#[rstest]
#[case(8)]  // exact enumeration
#[case(12)] // Monte-Carlo sampling
fn explanations_are_linear_in_the_predictor(#[case] d: usize) {
    let alpha = 2.5;
    let beta = -1.25;
    let background = random_matrix(5, d, 6, -1.0, 1.0);
    let w1 = random_weights(d, 100);
    let w2 = random_weights(d, 200);

    let combined = {
        let (w1, w2) = (w1.clone(), w2.clone());
        FnPredictor::new(move |batch: MatrixView<'_>| {
            let out: Vec<f64> = (0..batch.n_rows())
                .map(|i| {
                    let row = batch.row_slice(i);
                    let f1: f64 = row.iter().zip(&w1).map(|(x, w)| x * w).sum::<f64>() + 0.5;
                    let f2: f64 = row.iter().zip(&w2).map(|(x, w)| x * w).sum::<f64>() - 0.25;
                    alpha * f1 + beta * f2
                })
                .collect();
            Ok(Matrix::from_vec(out, batch.n_rows(), 1))
        })
    };

    let e1 = explainer_with(
        LinearModel::new(w1, 0.5),
        background.clone(),
        ExplainConfig::default(),
    );
    let e2 = explainer_with(
        LinearModel::new(w2, -0.25),
        background.clone(),
        ExplainConfig::default(),
    );
    let ec = explainer_with(combined, background, ExplainConfig::default());

    let x = random_matrix(1, d, 7, -1.0, 1.0);
    let x = x.row_slice(0);
    let p1 = e1.explain(x).unwrap();
    let p2 = e2.explain(x).unwrap();
    let pc = ec.explain(x).unwrap();

    for j in 0..d {
        assert_abs_diff_eq!(
            pc.value(j, 0),
            alpha * p1.value(j, 0) + beta * p2.value(j, 0),
            epsilon = 1e-8
        );
    }
}

// =============================================================================
// Determinism & budget accounting
// =============================================================================

#[test]
fn same_seed_gives_bitwise_identical_attributions() {
    let d = 12;
    let background = random_matrix(6, d, 50, 0.0, 1.0);
    let model_a = LogisticModel::new(random_weights(d, 51), 0.2);
    let model_b = LogisticModel::new(random_weights(d, 51), 0.2);
    let config = ExplainConfig::builder().seed(1234).build().unwrap();

    let ea = explainer_with(model_a, background.clone(), config.clone());
    let eb = explainer_with(model_b, background, config);

    let x = random_matrix(1, d, 52, 0.0, 1.0);
    let pa = ea.explain(x.row_slice(0)).unwrap();
    let pb = eb.explain(x.row_slice(0)).unwrap();

    assert_eq!(pa.values().len(), pb.values().len());
    for (a, b) in pa.values().iter().zip(pb.values()) {
        assert_eq!(a.to_bits(), b.to_bits(), "attributions drifted between runs");
    }
}

#[test]
fn sampled_budget_is_spent_exactly() {
    let d = 12;
    let background = random_matrix(4, d, 60, 0.0, 1.0);
    let model = LinearModel::new(random_weights(d, 61), 0.0);
    let explainer = explainer_with(model, background, ExplainConfig::default());

    let x = random_matrix(1, d, 62, 0.0, 1.0);
    let explanation = explainer.explain(x.row_slice(0)).unwrap();
    // 2^12 - 2 interior masks exceed the default budget, so the budget is
    // consumed in full.
    assert_eq!(explanation.n_coalitions(), 2 * d + 2048);
    assert!(!explanation.is_exact());
}

#[test]
fn enumerable_problems_use_fewer_coalitions() {
    let d = 4;
    let background = random_matrix(4, d, 70, 0.0, 1.0);
    let model = LinearModel::new(random_weights(d, 71), 0.0);
    let explainer = explainer_with(model, background, ExplainConfig::default());

    let x = random_matrix(1, d, 72, 0.0, 1.0);
    let explanation = explainer.explain(x.row_slice(0)).unwrap();
    assert_eq!(explanation.n_coalitions(), 14);
    assert!(explanation.is_exact());
}

#[test]
fn chunked_prediction_is_bitwise_identical() {
    let d = 6;
    let background = random_matrix(5, d, 80, 0.0, 1.0);
    let model = LogisticModel::new(random_weights(d, 81), -0.3);
    let x = random_matrix(1, d, 82, 0.0, 1.0);

    let whole = explainer_with(
        LogisticModel::new(random_weights(d, 81), -0.3),
        background.clone(),
        ExplainConfig::default(),
    )
    .explain(x.row_slice(0))
    .unwrap();

    // 5-row blocks of 6 features never share a predictor call at 30 cells.
    let config = ExplainConfig::builder().max_cell_budget(30).build().unwrap();
    let chunked = explainer_with(model, background, config)
        .explain(x.row_slice(0))
        .unwrap();

    for (a, b) in whole.values().iter().zip(chunked.values()) {
        assert_eq!(a.to_bits(), b.to_bits(), "chunking changed the result");
    }
}

// =============================================================================
// Failure modes
// =============================================================================

#[test]
fn nan_predictor_is_reported() {
    let nan_model = FnPredictor::new(|batch: MatrixView<'_>| {
        Ok(Matrix::from_vec(vec![f64::NAN; batch.n_rows()], batch.n_rows(), 1))
    });
    let background = random_matrix(3, 4, 90, 0.0, 1.0);
    let err = KernelExplainer::new(nan_model, background, ExplainConfig::default())
        .err()
        .expect("NaN predictions must be rejected");
    assert!(matches!(err, ExplainError::NonFinitePrediction { .. }));
}

#[test]
fn undersized_budget_is_rejected_with_minimum() {
    let d = 10;
    let background = random_matrix(3, d, 91, 0.0, 1.0);
    let model = LinearModel::new(random_weights(d, 92), 0.0);
    let config = ExplainConfig::builder().n_samples(2 * d - 1).build().unwrap();
    let explainer = explainer_with(model, background, config);

    let x = random_matrix(1, d, 93, 0.0, 1.0);
    match explainer.explain(x.row_slice(0)) {
        Err(ExplainError::BudgetTooSmall { min, .. }) => assert_eq!(min, 2 * d),
        other => panic!("expected BudgetTooSmall, got {:?}", other.map(|_| ())),
    }
}
