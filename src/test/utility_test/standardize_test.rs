use super::*;

#[test]
fn test_standardize_mean_std() {
    let x = array![[1.0, 2.0, 7.0], [3.0, 4.0, 7.0], [5.0, 9.0, 7.0]];
    let mut scaler = InputStandardization::default();
    assert_eq!(scaler.get_mode(), ScalingMode::MeanStd);
    assert!(!scaler.is_fitted());

    let scaled = scaler.fit_transform(x.view()).unwrap();
    assert!(scaler.is_fitted());
    assert_abs_diff_eq!(
        scaler.get_offset().unwrap(),
        &array![3.0, 5.0, 7.0],
        epsilon = 1e-12
    );

    let column_means = scaled.mean_axis(Axis(0)).unwrap();
    assert_abs_diff_eq!(column_means, array![0.0, 0.0, 0.0], epsilon = 1e-12);
    for j in 0..2 {
        let variance = scaled.column(j).mapv(|v| v * v).mean().unwrap();
        assert_relative_eq!(variance, 1.0, epsilon = 1e-12);
    }

    // constant column is only shifted
    assert_eq!(scaler.get_scale().unwrap()[2], 1.0);
    assert!(scaled.column(2).iter().all(|&v| v == 0.0));
}

#[test]
fn test_standardize_range() {
    let x = array![[0.0, -4.0], [2.0, 0.0], [10.0, 4.0]];
    let mut scaler = InputStandardization::new(ScalingMode::Range);
    let scaled = scaler.fit_transform(x.view()).unwrap();

    assert_abs_diff_eq!(
        scaled,
        array![[-1.0, -1.0], [-0.6, 0.0], [1.0, 1.0]],
        epsilon = 1e-12
    );
}

#[test]
fn test_standardize_reapplies_fitted_statistics() {
    let train = array![[0.0], [2.0], [4.0]];
    let mut scaler = InputStandardization::new(ScalingMode::Range);
    scaler.fit(train.view()).unwrap();

    let new = array![[6.0], [-2.0]];
    assert_abs_diff_eq!(
        scaler.transform(new.view()).unwrap(),
        array![[2.0], [-2.0]],
        epsilon = 1e-12
    );
}

#[test]
fn test_standardize_errors() {
    let scaler = InputStandardization::default();
    assert_eq!(
        scaler.transform(array![[1.0]].view()),
        Err(ModelError::NotFitted)
    );

    let mut scaler = InputStandardization::default();
    let empty = Array2::<f64>::zeros((0, 3));
    assert!(matches!(
        scaler.fit(empty.view()),
        Err(ModelError::InputValidationError(_))
    ));
    let nan = array![[1.0, f64::NAN]];
    assert!(matches!(
        scaler.fit(nan.view()),
        Err(ModelError::InputValidationError(_))
    ));

    scaler.fit(array![[1.0, 2.0], [3.0, 4.0]].view()).unwrap();
    assert!(matches!(
        scaler.transform(array![[1.0, 2.0, 3.0]].view()),
        Err(ModelError::InputValidationError(_))
    ));
}
