use super::*;

#[test]
fn test_early_stopping_validation() {
    assert!(EarlyStopping::<usize>::new(0, 0.0, true).is_err());
    assert!(EarlyStopping::<usize>::new(1, -0.1, true).is_err());
    assert!(EarlyStopping::<usize>::new(1, f64::NAN, true).is_err());

    let stopper = EarlyStopping::<usize>::new(3, 0.5, false).unwrap();
    assert_eq!(stopper.get_patience(), 3);
    assert_eq!(stopper.get_min_delta(), 0.5);
    assert!(!stopper.is_consecutive());
    assert!(stopper.best_loss().is_none());
    assert!(!stopper.early_stop());
}

#[test]
fn test_early_stopping_keeps_best_checkpoint() {
    let mut stopper = EarlyStopping::new(2, 0.0, true).unwrap();
    let losses = [5.0, 3.0, 4.0, 2.0, 2.5, 2.1];
    let mut stopped_at = None;
    for (epoch, &loss) in losses.iter().enumerate() {
        if stopper.step(loss, &format!("model@{}", epoch)) {
            stopped_at = Some(epoch);
            break;
        }
    }

    assert_eq!(stopped_at, Some(5));
    assert_eq!(stopper.best_loss(), Some(2.0));
    assert_eq!(stopper.best_epoch(), Some(3));
    assert_eq!(stopper.best_model().map(String::as_str), Some("model@3"));
}

#[test]
fn test_early_stopping_min_delta() {
    let mut stopper = EarlyStopping::new(2, 0.5, true).unwrap();
    assert!(!stopper.step(10.0, &0));
    // improvements smaller than min_delta do not count
    assert!(!stopper.step(9.8, &1));
    assert!(stopper.step(9.6, &2));
    assert_eq!(stopper.best_loss(), Some(10.0));
    assert_eq!(stopper.best_model(), Some(&0));
}

#[test]
fn test_early_stopping_non_consecutive_counter() {
    let mut consecutive = EarlyStopping::new(2, 0.0, true).unwrap();
    let mut cumulative = EarlyStopping::new(2, 0.0, false).unwrap();
    let losses = [3.0, 4.0, 2.0, 5.0];

    let results: Vec<(bool, bool)> = losses
        .iter()
        .map(|&loss| (consecutive.step(loss, &()), cumulative.step(loss, &())))
        .collect();

    // the counter is only reset with `consecutive`
    assert_eq!(results[3], (false, true));
    assert_eq!(consecutive.get_counter(), 1);
    assert_eq!(cumulative.get_counter(), 2);
}

#[test]
fn test_early_stopping_nan_and_reset() {
    let mut stopper = EarlyStopping::new(1, 0.0, true).unwrap();
    assert!(stopper.step(f64::NAN, &0));
    assert!(stopper.best_loss().is_none());

    stopper.reset();
    assert!(!stopper.early_stop());
    assert_eq!(stopper.get_counter(), 0);
    assert!(!stopper.step(1.0, &1));
    assert!(stopper.step(f64::NAN, &2));
    assert_eq!(stopper.best_model(), Some(&1));
}
