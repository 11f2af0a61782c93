use super::*;

/// Patience-based early stopping that keeps a checkpoint of the best model.
///
/// Every call to `step` reports a monitored loss together with the current model. A loss
/// improves on the best one when it is lower by more than `min_delta`; the model is then
/// cloned as the new checkpoint. Each non-improving step increments a counter, and once the
/// counter reaches `patience` the `early_stop` flag is raised. With `consecutive = true` an
/// improvement resets the counter, so only consecutive non-improving steps count.
///
/// # Fields
///
/// - `patience` - Number of non-improving steps tolerated
/// - `min_delta` - Minimum decrease of the loss that counts as an improvement
/// - `consecutive` - Reset the counter on improvement
///
/// # Example
/// ```rust
/// use lda_colvar::neural_network::EarlyStopping;
///
/// let mut stopper = EarlyStopping::new(2, 0.0, true).unwrap();
/// for (epoch, loss) in [3.0, 1.0, 2.0, 2.0].into_iter().enumerate() {
///     stopper.step(loss, &epoch);
/// }
/// assert!(stopper.early_stop());
/// assert_eq!(stopper.best_model(), Some(&1));
/// assert_eq!(stopper.best_loss(), Some(1.0));
/// ```
#[derive(Debug, Clone)]
pub struct EarlyStopping<P> {
    patience: usize,
    min_delta: f64,
    consecutive: bool,
    counter: usize,
    n_steps: usize,
    best_loss: Option<f64>,
    best_epoch: Option<usize>,
    best_model: Option<P>,
    early_stop: bool,
}

impl<P: Clone> EarlyStopping<P> {
    /// Creates a new early stopping monitor
    ///
    /// # Parameters
    ///
    /// - `patience` - Number of non-improving steps before stopping, at least 1
    /// - `min_delta` - Non-negative improvement threshold
    /// - `consecutive` - Whether an improvement resets the counter
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - A new monitor
    /// - `Err(ModelError::InputValidationError)` - If `patience` is zero or `min_delta` is negative or not finite
    pub fn new(patience: usize, min_delta: f64, consecutive: bool) -> Result<Self, ModelError> {
        if patience == 0 {
            return Err(ModelError::InputValidationError(
                "patience must be at least 1".to_string(),
            ));
        }
        if !(min_delta >= 0.0 && min_delta.is_finite()) {
            return Err(ModelError::InputValidationError(format!(
                "min_delta must be non-negative and finite, got {}",
                min_delta
            )));
        }

        Ok(EarlyStopping {
            patience,
            min_delta,
            consecutive,
            counter: 0,
            n_steps: 0,
            best_loss: None,
            best_epoch: None,
            best_model: None,
            early_stop: false,
        })
    }

    get_field!(get_patience, patience, usize);
    get_field!(get_min_delta, min_delta, f64);
    get_field!(is_consecutive, consecutive, bool);
    get_field!(get_counter, counter, usize);
    get_field!(best_loss, best_loss, Option<f64>);
    get_field!(best_epoch, best_epoch, Option<usize>);
    get_field!(early_stop, early_stop, bool);
    get_field_as_ref!(best_model, best_model, Option<&P>);

    /// Reports the loss of one epoch
    ///
    /// A NaN loss never counts as an improvement.
    ///
    /// # Parameters
    ///
    /// - `loss` - Monitored loss of this epoch
    /// - `model` - Current model, cloned when the loss improves
    ///
    /// # Returns
    ///
    /// * `bool` - Whether training should stop
    pub fn step(&mut self, loss: f64, model: &P) -> bool {
        let improved = match self.best_loss {
            None => !loss.is_nan(),
            Some(best) => best - loss > self.min_delta,
        };

        if improved {
            self.best_loss = Some(loss);
            self.best_epoch = Some(self.n_steps);
            self.best_model = Some(model.clone());
            if self.consecutive {
                self.counter = 0;
            }
        } else {
            self.counter += 1;
            if self.counter >= self.patience {
                self.early_stop = true;
            }
        }

        self.n_steps += 1;
        self.early_stop
    }

    /// Forgets all history, keeping the configuration.
    pub fn reset(&mut self) {
        self.counter = 0;
        self.n_steps = 0;
        self.best_loss = None;
        self.best_epoch = None;
        self.best_model = None;
        self.early_stop = false;
    }
}
