use super::*;

fn two_class_data(seed: u64) -> (Array2<f64>, Array1<i32>) {
    gaussian_clusters(&[vec![0.0, 0.0], vec![1.5, 0.5]], 30, 1.0, seed)
}

fn quiet_options(nepochs: usize) -> TrainingOptions {
    TrainingOptions {
        nepochs,
        log_every: nepochs.max(1),
        shuffle_seed: Some(0),
        ..TrainingOptions::default()
    }
}

#[test]
fn test_deep_lda_defaults() {
    let cv = DeepLdaCv::new(&[2, 8, 2], Activation::Tanh, Some(0)).unwrap();
    assert_eq!(cv.get_name(), "deeplda_cv");
    assert_eq!(cv.get_epochs(), 0);
    assert_eq!(cv.get_lorentzian_reg(), 0.0);
    assert_eq!(cv.get_network().n_outputs(), 2);
    assert!(cv.get_loss_train().is_empty());
    assert!(cv.get_early_stopping().is_none());
    assert!(cv.get_standardization().is_none());

    let options = TrainingOptions::default();
    assert!(options.standardize_inputs);
    assert_eq!(options.batch_size, BatchSize::Full);
    assert_eq!(options.nepochs, 1000);
}

#[test]
fn test_deep_lda_regularization() {
    let mut cv = DeepLdaCv::new(&[2, 4, 2], Activation::Tanh, Some(0)).unwrap();
    cv.set_regularization(0.05, None).unwrap();
    assert_eq!(cv.get_lda().get_sw_reg(), 0.05);
    assert_relative_eq!(cv.get_lorentzian_reg(), 40.0, epsilon = 1e-12);

    cv.set_regularization(DEEP_LDA_SW_REG, Some(0.0)).unwrap();
    assert_eq!(cv.get_lorentzian_reg(), 0.0);

    // failures leave both values untouched
    assert!(cv.set_regularization(0.0, None).is_err());
    assert!(cv.set_regularization(-1.0, Some(1.0)).is_err());
    assert!(cv.set_regularization(0.1, Some(-1.0)).is_err());
    assert_eq!(cv.get_lda().get_sw_reg(), DEEP_LDA_SW_REG);
    assert_eq!(cv.get_lorentzian_reg(), 0.0);
}

#[test]
fn test_deep_lda_not_fitted_and_input_width() {
    let cv = DeepLdaCv::new(&[2, 4, 2], Activation::ReLU, Some(0)).unwrap();
    let (x, _) = two_class_data(1);
    assert_eq!(cv.transform(x.view()), Err(ModelError::NotFitted));
    assert_eq!(cv.forward_nn(x.view()).unwrap().dim(), (60, 2));

    let wide = Array2::<f64>::zeros((3, 5));
    assert!(matches!(
        cv.forward_nn(wide.view()),
        Err(ModelError::InputValidationError(_))
    ));
}

#[test]
fn test_deep_lda_training_decreases_loss() {
    let (x, y) = two_class_data(2);
    let mut cv = DeepLdaCv::new(&[2, 10, 2], Activation::Tanh, Some(1)).unwrap();
    cv.set_regularization(DEEP_LDA_SW_REG, Some(0.0)).unwrap();
    cv.set_optimizer(crate::neural_network::Adam::new(0.01, 0.9, 0.999, 1e-8).unwrap());

    let outcome = cv
        .train((x.view(), y.view()), None, &quiet_options(50))
        .unwrap();
    assert_eq!(outcome, TrainingOutcome::MaxEpochsReached);
    assert_eq!(cv.get_epochs(), 50);
    assert_eq!(cv.get_loss_train().len(), 50);

    let losses = cv.get_loss_train();
    assert!(losses[49] < losses[0]);
    // without validation data the train loss is monitored
    assert_eq!(cv.get_loss_valid(), losses);

    assert!(cv.get_standardization().unwrap().is_fitted());
    let s = cv.transform(x.view()).unwrap();
    assert_eq!(s.dim(), (60, 1));
}

#[test]
fn test_deep_lda_early_stopping_restores_best() {
    let (x, y) = two_class_data(3);
    let (x_valid, y_valid) = two_class_data(4);
    let mut cv = DeepLdaCv::new(&[2, 6, 2], Activation::Tanh, Some(2)).unwrap();
    cv.set_regularization(DEEP_LDA_SW_REG, None).unwrap();
    // no later epoch can improve by 1e9
    cv.set_early_stopping(EarlyStopping::new(2, 1e9, true).unwrap());

    let outcome = cv
        .train(
            (x.view(), y.view()),
            Some((x_valid.view(), y_valid.view())),
            &quiet_options(100),
        )
        .unwrap();
    assert_eq!(outcome, TrainingOutcome::Converged { epoch: 3 });
    assert_eq!(cv.get_loss_train().len(), 3);
    assert_eq!(cv.get_early_stopping().unwrap().best_epoch(), Some(0));

    // weights and LDA solution of epoch 1 are back in place
    let restored_train = cv.evaluate_dataset((x.view(), y.view()), false).unwrap();
    assert_relative_eq!(restored_train, cv.get_loss_train()[0], epsilon = 1e-9);
    let restored_valid = cv
        .evaluate_dataset((x_valid.view(), y_valid.view()), false)
        .unwrap();
    assert_relative_eq!(restored_valid, cv.get_loss_valid()[0], epsilon = 1e-9);
    assert_eq!(
        cv.get_lda().get_solution(),
        cv.get_early_stopping()
            .unwrap()
            .best_model()
            .and_then(|best| best.discriminant.as_ref())
    );
}

#[test]
fn test_deep_lda_fixed_batches_are_reproducible() {
    let (x, y) = two_class_data(5);
    let options = TrainingOptions {
        batch_size: BatchSize::Fixed(30),
        ..quiet_options(3)
    };

    let run = || {
        let mut cv = DeepLdaCv::new(&[2, 5, 2], Activation::Softplus, Some(7)).unwrap();
        cv.set_optimizer(SGD::new(0.01).unwrap());
        cv.set_regularization(DEEP_LDA_SW_REG, None).unwrap();
        cv.train((x.view(), y.view()), None, &options).unwrap();
        cv.get_loss_train().to_vec()
    };
    let first = run();
    let second = run();
    assert_eq!(first.len(), 3);
    for (a, b) in first.iter().zip(second.iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-9);
    }
}

#[test]
fn test_deep_lda_train_epoch() {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    let (x, y) = two_class_data(6);
    let mut cv = DeepLdaCv::new(&[2, 4, 2], Activation::Tanh, Some(3)).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    assert!(matches!(
        cv.train_epoch((x.view(), y.view()), BatchSize::Fixed(0), &mut rng),
        Err(ModelError::InputValidationError(_))
    ));

    let before = cv.parameters();
    cv.train_epoch((x.view(), y.view()), BatchSize::Full, &mut rng)
        .unwrap();
    assert_eq!(cv.get_epochs(), 1);
    assert_ne!(cv.parameters().network, before.network);
    // a training step never stores a solution
    assert!(cv.get_lda().get_solution().is_none());
}

#[test]
fn test_deep_lda_train_validation() {
    let (x, y) = two_class_data(7);
    let mut cv = DeepLdaCv::new(&[2, 4, 2], Activation::Tanh, Some(3)).unwrap();

    let short_labels = y.slice(s![..10]);
    assert!(matches!(
        cv.train((x.view(), short_labels), None, &quiet_options(1)),
        Err(ModelError::InputValidationError(_))
    ));

    let options = TrainingOptions {
        log_every: 0,
        ..quiet_options(1)
    };
    assert!(matches!(
        cv.train((x.view(), y.view()), None, &options),
        Err(ModelError::InputValidationError(_))
    ));
    assert_eq!(cv.get_epochs(), 0);
}

#[test]
fn test_deep_lda_parameters_round_trip() {
    let (x, y) = two_class_data(8);
    let mut cv = DeepLdaCv::new(&[2, 6, 2], Activation::ELU, Some(4)).unwrap();
    cv.set_regularization(DEEP_LDA_SW_REG, None).unwrap();
    cv.train((x.view(), y.view()), None, &quiet_options(2))
        .unwrap();

    let checkpoint = cv.parameters();
    assert!(checkpoint.discriminant.is_some());
    let reference = cv.transform(x.view()).unwrap();

    cv.train((x.view(), y.view()), None, &quiet_options(3))
        .unwrap();
    assert_eq!(cv.get_epochs(), 5);

    cv.set_parameters(&checkpoint).unwrap();
    assert_abs_diff_eq!(cv.transform(x.view()).unwrap(), reference, epsilon = 1e-12);

    // a checkpoint of another architecture is rejected as a whole
    let other = DeepLdaCv::new(&[2, 3, 2], Activation::ELU, Some(4)).unwrap();
    assert!(cv.set_parameters(&other.parameters()).is_err());
    assert_eq!(cv.parameters(), checkpoint);
}
