use super::*;

#[test]
fn test_dense_forward_pass_dimensions() {
    // Test forward propagation dimension correctness
    let mut dense = Dense::new(4, 3, Activation::ReLU, Some(0)).unwrap();
    let input = generate_data(2, 4);

    let output = dense.forward(&input).unwrap();
    assert_eq!(output.dim(), (2, 3));
    assert_eq!(dense.infer(&input).unwrap(), output);
    assert_eq!(dense.param_count(), 4 * 3 + 3);
    assert_eq!(dense.layer_type(), "Dense");
    assert_eq!(dense.output_shape(), "(None, 3)");
}

#[test]
fn test_dense_initialization() {
    let a = Dense::new(16, 8, Activation::Tanh, Some(7)).unwrap();
    let b = Dense::new(16, 8, Activation::Tanh, Some(7)).unwrap();
    let c = Dense::new(16, 8, Activation::Tanh, Some(8)).unwrap();

    let (wa, wb, wc) = (
        a.get_weights().to_parameters(),
        b.get_weights().to_parameters(),
        c.get_weights().to_parameters(),
    );
    // same seed, same weights
    assert_eq!(wa, wb);
    assert_ne!(wa, wc);

    let LayerParameters::Dense { weight, bias } = wa;
    assert!(weight.iter().all(|w| w.abs() <= 0.25));
    assert!(bias.iter().all(|&b| b == 0.0));
}

#[test]
fn test_dense_invalid_construction_and_input() {
    assert!(matches!(
        Dense::new(0, 3, Activation::ReLU, None),
        Err(ModelError::InputValidationError(_))
    ));

    let mut dense = Dense::new(3, 2, Activation::ReLU, Some(1)).unwrap();
    let wrong = generate_data(2, 4);
    assert!(matches!(
        dense.forward(&wrong),
        Err(ModelError::InputValidationError(_))
    ));
}

#[test]
fn test_dense_backward_before_forward() {
    let mut dense = Dense::new(3, 2, Activation::Linear, Some(1)).unwrap();
    let result = dense.backward(&Array2::ones((2, 2)));
    assert!(matches!(result, Err(ModelError::ProcessingError(_))));
}

#[test]
fn test_dense_backward_gradients() {
    let mut dense = Dense::new(2, 1, Activation::Linear, Some(3)).unwrap();
    dense
        .set_weights(&LayerParameters::Dense {
            weight: array![[2.0], [-1.0]],
            bias: array![[0.5]],
        })
        .unwrap();

    let input = array![[1.0f32, 2.0], [3.0, -1.0]];
    let output = dense.forward(&input).unwrap();
    assert_abs_diff_eq!(output, array![[0.5f32], [7.5]], epsilon = 1e-6);

    let grad_input = dense.backward(&array![[1.0f32], [-2.0]]).unwrap();
    assert_abs_diff_eq!(
        grad_input,
        array![[2.0f32, -1.0], [-4.0, 2.0]],
        epsilon = 1e-6
    );
    assert_abs_diff_eq!(
        dense.get_grad_weights().unwrap(),
        &array![[-5.0f32], [4.0]],
        epsilon = 1e-6
    );
    assert_abs_diff_eq!(dense.get_grad_bias().unwrap(), &array![[-1.0f32]], epsilon = 1e-6);

    // the cache is consumed
    assert!(dense.backward(&array![[1.0f32], [1.0]]).is_err());
}

#[test]
fn test_dense_backward_shape_mismatch() {
    let mut dense = Dense::new(3, 2, Activation::Sigmoid, Some(1)).unwrap();
    dense.forward(&generate_data(4, 3)).unwrap();
    assert!(matches!(
        dense.backward(&Array2::ones((4, 3))),
        Err(ModelError::InputValidationError(_))
    ));
}

#[test]
fn test_dense_set_weights_rejects_wrong_shape() {
    let mut dense = Dense::new(3, 2, Activation::ReLU, Some(1)).unwrap();
    let before = dense.get_weights().to_parameters();
    let result = dense.set_weights(&LayerParameters::Dense {
        weight: Array2::zeros((2, 3)),
        bias: Array2::zeros((1, 3)),
    });
    assert!(matches!(result, Err(ModelError::InputValidationError(_))));
    let wrong_bias = dense.set_weights(&LayerParameters::Dense {
        weight: Array2::zeros((3, 2)),
        bias: Array2::zeros((1, 3)),
    });
    assert!(wrong_bias.is_err());
    assert_eq!(dense.get_weights().to_parameters(), before);
}
