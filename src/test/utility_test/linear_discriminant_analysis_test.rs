use super::*;

/// Two square clusters around (0, 0) and (3, 4) with identical spread, so the
/// discriminant direction is exactly (0.6, 0.8).
fn square_clusters() -> (Array2<f64>, Array1<i32>) {
    let x = array![
        [1.0, 0.0],
        [-1.0, 0.0],
        [0.0, 1.0],
        [0.0, -1.0],
        [4.0, 4.0],
        [2.0, 4.0],
        [3.0, 5.0],
        [3.0, 3.0]
    ];
    let y = array![0, 0, 0, 0, 1, 1, 1, 1];
    (x, y)
}

fn three_clusters() -> (Array2<f64>, Array1<i32>) {
    gaussian_clusters(
        &[vec![0.0, 0.0, 0.0], vec![3.0, 0.0, 1.0], vec![0.0, 3.0, -1.0]],
        25,
        0.7,
        11,
    )
}

#[test]
fn test_lda_default_state() {
    let lda = LDA::default();
    assert_eq!(lda.get_sw_reg(), DEFAULT_SW_REG);
    assert!(!lda.is_harmonic());
    assert!(lda.get_solution().is_none());
    assert!(lda.get_feature_names().is_none());
    assert!(LDA::new(true).is_harmonic());
}

#[test]
fn test_lda_not_fitted() {
    let lda = LDA::new(false);
    let x = array![[1.0, 2.0]];
    assert_eq!(lda.transform(x.view()), Err(ModelError::NotFitted));
    assert_eq!(lda.export_linear_formula(None), Err(ModelError::NotFitted));
    assert!(matches!(lda.get_params(), Err(ModelError::NotFitted)));
}

#[test]
fn test_lda_set_regularization() {
    let mut lda = LDA::new(false);
    lda.set_regularization(0.05).unwrap();
    assert_eq!(lda.get_sw_reg(), 0.05);
    lda.set_regularization(0.0).unwrap();
    assert_eq!(lda.get_sw_reg(), 0.0);

    for bad in [-1e-3, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            lda.set_regularization(bad),
            Err(ModelError::InputValidationError(_))
        ));
    }
    assert_eq!(lda.get_sw_reg(), 0.0);
}

#[test]
fn test_lda_fit_transform_matches_fit_then_transform() {
    let (x, y) = three_clusters();

    let mut a = LDA::new(false);
    let direct = a.fit_transform(x.view(), y.view()).unwrap();

    let mut b = LDA::new(false);
    b.fit(x.view(), y.view()).unwrap();
    let staged = b.transform(x.view()).unwrap();

    assert_eq!(direct.dim(), (75, 2));
    assert_abs_diff_eq!(direct, staged, epsilon = 1e-12);
}

#[test]
fn test_lda_refit_is_idempotent() {
    let (x, y) = three_clusters();
    let mut lda = LDA::new(true);
    lda.fit(x.view(), y.view()).unwrap();
    let first = lda.get_solution().unwrap().clone();
    lda.fit(x.view(), y.view()).unwrap();
    assert_eq!(lda.get_solution().unwrap(), &first);
}

#[test]
fn test_lda_export_linear_formula() {
    let (x, y) = square_clusters();
    let mut lda = LDA::new(false);
    lda.fit(x.view(), y.view()).unwrap();

    let solution = lda.get_solution().unwrap();
    assert_eq!(solution.n_components(), 1);
    assert_eq!(solution.classes, vec![0, 1]);
    assert_abs_diff_eq!(
        solution.eigenvectors.column(0),
        array![0.6, 0.8],
        epsilon = 1e-9
    );

    assert_eq!(
        lda.export_linear_formula(None).unwrap(),
        "lda: COMBINE ARG=x0,x1 COEFFICIENTS=0.6,0.8 PERIODIC=NO"
    );
    assert_eq!(
        lda.export_linear_formula(Some(&["d1", "d2"])).unwrap(),
        "lda: COMBINE ARG=d1,d2 COEFFICIENTS=0.6,0.8 PERIODIC=NO"
    );

    lda.set_feature_names(vec!["dist", "angle"]);
    assert_eq!(
        lda.export_linear_formula(None).unwrap(),
        "lda: COMBINE ARG=dist,angle COEFFICIENTS=0.6,0.8 PERIODIC=NO"
    );
    // explicit names win over stored ones
    assert!(
        lda.export_linear_formula(Some(&["a", "b"]))
            .unwrap()
            .starts_with("lda: COMBINE ARG=a,b ")
    );

    assert!(matches!(
        lda.export_linear_formula(Some(&["only_one"])),
        Err(ModelError::InputValidationError(_))
    ));
}

#[test]
fn test_lda_export_several_components() {
    let (x, y) = three_clusters();
    let mut lda = LDA::new(false);
    lda.fit(x.view(), y.view()).unwrap();

    let formula = lda.export_linear_formula(None).unwrap();
    let lines: Vec<&str> = formula.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("lda0: COMBINE ARG=x0,x1,x2 COEFFICIENTS="));
    assert!(lines[1].starts_with("lda1: COMBINE ARG=x0,x1,x2 COEFFICIENTS="));
    assert!(lines.iter().all(|line| line.ends_with(" PERIODIC=NO")));
}

#[test]
fn test_format_coefficient() {
    assert_eq!(format_coefficient(0.6), "0.6");
    assert_eq!(format_coefficient(-0.25), "-0.25");
    assert_eq!(format_coefficient(0.123456789), "0.123457");
    assert_eq!(format_coefficient(1.0), "1");
    assert_eq!(format_coefficient(-1e-9), "0");
    assert_eq!(format_coefficient(0.0), "0");
}

#[test]
fn test_lda_get_params() {
    let (x, y) = square_clusters();
    let mut lda = LDA::new(false);
    lda.fit(x.view(), y.view()).unwrap();

    let params = lda.get_params().unwrap();
    assert_eq!(params.len(), 4);
    for key in ["eigenvalues", "eigenvectors", "S_b", "S_w"] {
        assert!(params.contains_key(key), "missing {}", key);
    }
    match params.get("S_w") {
        Some(LdaParam::Matrix(s_w)) => assert_eq!(s_w.dim(), (2, 2)),
        other => panic!("unexpected S_w entry: {:?}", other),
    }

    lda.set_feature_names(vec!["a", "b"]);
    let params = lda.get_params().unwrap();
    assert_eq!(
        params.get("feature_names"),
        Some(&LdaParam::FeatureNames(vec!["a".to_string(), "b".to_string()]))
    );
}

#[test]
fn test_compute_lda_save_params() {
    let (x, y) = square_clusters();
    let (x3, y3) = three_clusters();

    let mut lda = LDA::new(false);
    lda.fit(x.view(), y.view()).unwrap();
    let stored = lda.get_solution().unwrap().clone();

    // without saving, the stored solution is kept
    let other = lda.compute_lda(x3.view(), y3.view(), false).unwrap();
    assert_eq!(other.n_components(), 2);
    assert_eq!(lda.get_solution(), Some(&stored));

    let saved = lda.compute_lda(x3.view(), y3.view(), true).unwrap();
    assert_eq!(lda.get_solution(), Some(&saved));
}

#[test]
fn test_failed_fit_keeps_previous_solution() {
    let (x, y) = square_clusters();
    let mut lda = LDA::new(false);
    lda.fit(x.view(), y.view()).unwrap();
    let stored = lda.get_solution().unwrap().clone();

    let single_class = array![0, 0, 0, 0, 0, 0, 0, 0];
    assert_eq!(
        lda.fit(x.view(), single_class.view()).map(|_| ()),
        Err(ModelError::InvalidClassCount(1))
    );

    let lonely = array![0, 0, 0, 0, 1, 1, 1, 2];
    assert_eq!(
        lda.fit(x.view(), lonely.view()).map(|_| ()),
        Err(ModelError::InsufficientSamples { class: 2, count: 1 })
    );

    assert_eq!(lda.get_solution(), Some(&stored));
}

#[test]
fn test_lda_transform_validation() {
    let (x, y) = square_clusters();
    let mut lda = LDA::new(false);
    lda.fit(x.view(), y.view()).unwrap();

    let empty = Array2::<f64>::zeros((0, 2));
    let wrong = array![[1.0, 2.0, 3.0]];
    let nan = array![[f64::NAN, 1.0]];
    for bad in [empty, wrong, nan] {
        assert!(matches!(
            lda.transform(bad.view()),
            Err(ModelError::InputValidationError(_))
        ));
    }
}

#[test]
fn test_load_solution() {
    let (x, y) = square_clusters();
    let mut fitted = LDA::new(false);
    fitted.fit(x.view(), y.view()).unwrap();
    let solution = fitted.get_solution().unwrap().clone();

    let mut restored = LDA::new(false);
    restored.load_solution(solution.clone()).unwrap();
    assert_abs_diff_eq!(
        restored.transform(x.view()).unwrap(),
        fitted.transform(x.view()).unwrap(),
        epsilon = 1e-15
    );

    let mut broken = solution;
    broken.within = Array2::zeros((3, 3));
    assert!(matches!(
        restored.load_solution(broken),
        Err(ModelError::InputValidationError(_))
    ));
}

#[test]
fn test_lda_separates_true_labels_better_than_shuffled() {
    let (x, y) = gaussian_clusters(&[vec![0.0, 0.0], vec![3.0, 1.0]], 50, 1.0, 21);
    let mut lda = LDA::new(false);
    let true_lambda = lda.solve(x.view(), y.view()).unwrap().eigenvalues[0];

    // alternate labels, ignoring the cluster structure
    let shuffled = Array1::from_iter((0..100).map(|i| (i % 2) as i32));
    let shuffled_lambda = lda.solve(x.view(), shuffled.view()).unwrap().eigenvalues[0];

    assert!(true_lambda > 10.0 * shuffled_lambda);
    assert!(lda.fit(x.view(), y.view()).is_ok());
}

#[test]
fn test_lda_single_feature() {
    let x = array![[0.0], [0.2], [1.0], [1.1], [2.0], [2.3]];
    let y = array![5, 5, 7, 7, 9, 9];
    let mut lda = LDA::new(false);
    lda.fit(x.view(), y.view()).unwrap();

    let solution = lda.get_solution().unwrap();
    assert_eq!(solution.n_components(), 1);
    assert_eq!(solution.classes, vec![5, 7, 9]);
    assert_abs_diff_eq!(solution.eigenvectors[[0, 0]], 1.0, epsilon = 1e-12);
    assert_relative_eq!(
        lda.transform(x.view()).unwrap().column(0).to_owned(),
        x.column(0).to_owned(),
        epsilon = 1e-12
    );
}
