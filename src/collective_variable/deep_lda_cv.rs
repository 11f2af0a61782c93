use super::*;
use crate::neural_network::{
    Activation, Adam, EarlyStopping, FeatureNetwork, NetworkParameters, Optimizer,
};
use crate::utility::standardize::{InputStandardization, ScalingMode};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Axis;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Suggested `sw_reg` for `DeepLdaCv::set_regularization`.
pub const DEEP_LDA_SW_REG: f64 = 0.02;

const LOG_SPACING: [usize; 3] = [6, 12, 12];
const LOG_DECIMALS: usize = 2;

/// Number of samples per optimizer step
///
/// # Variants
///
/// - `Full` - One batch containing the whole training set
/// - `Fixed(n)` - Batches of `n` samples, reshuffled every epoch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchSize {
    #[default]
    Full,
    Fixed(usize),
}

/// Options of `DeepLdaCv::train`
///
/// # Fields
///
/// - `standardize_inputs` - Fit an input standardization on the training set before epoch 1
/// - `scaling` - Scaling used when `standardize_inputs` is set
/// - `batch_size` - Samples per optimizer step
/// - `nepochs` - Maximum number of epochs
/// - `log_every` - Log every `log_every` epochs
/// - `info` - Print a description of the model before training
/// - `shuffle_seed` - Seed for batch shuffling; `None` draws from system entropy
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOptions {
    pub standardize_inputs: bool,
    pub scaling: ScalingMode,
    pub batch_size: BatchSize,
    pub nepochs: usize,
    pub log_every: usize,
    pub info: bool,
    pub shuffle_seed: Option<u64>,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        TrainingOptions {
            standardize_inputs: true,
            scaling: ScalingMode::MeanStd,
            batch_size: BatchSize::Full,
            nepochs: 1000,
            log_every: 1,
            info: false,
            shuffle_seed: None,
        }
    }
}

/// How a call to `DeepLdaCv::train` ended
///
/// # Variants
///
/// - `Converged { epoch }` - Early stopping fired after `epoch` epochs; the best checkpoint was restored
/// - `MaxEpochsReached` - All `nepochs` epochs were run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingOutcome {
    Converged { epoch: usize },
    MaxEpochsReached,
}

/// In-memory checkpoint of a `DeepLdaCv`
///
/// # Fields
///
/// - `network` - Weights of every layer of the feature network
/// - `discriminant` - Stored LDA solution, if any
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub network: NetworkParameters,
    pub discriminant: Option<DiscriminantSolution>,
}

/// A labelled dataset: inputs of shape (n_samples, n_inputs) and their class labels.
pub type LabelledData<'a> = (ArrayView2<'a, f64>, ArrayView1<'a, i32>);

/// Deep-LDA collective variable
///
/// A feature network maps the inputs to `H`, and LDA on `H` gives the CV. Training maximizes
/// the smallest retained Fisher eigenvalue of `H` (see `DiscriminantLoss`) by gradient descent
/// on the network weights, with the eigenvalue gradient computed analytically.
///
/// Each epoch runs one optimizer step per batch, then evaluates the train loss (storing the
/// LDA solution used by `transform`) and the validation loss (transient). The validation loss,
/// or the train loss without a validation set, drives early stopping.
///
/// # Fields
///
/// - `network` - Feature network
/// - `lda` - Projector applied to the network outputs
/// - `loss` - Eigenvalue loss with Lorentzian regularization, disabled until `set_regularization`
/// - `optimizer` - Optimizer, `Adam` with default settings unless set
/// - `early_stopping` - Optional early stopping monitor
/// - `standardization` - Input standardization fitted by `standardize_inputs`
/// - `epochs` - Number of epochs trained so far
/// - `loss_train` / `loss_valid` - Loss history, one entry per epoch
///
/// # Example
/// ```rust
/// use lda_colvar::collective_variable::*;
/// use lda_colvar::neural_network::{Activation, EarlyStopping};
/// use ndarray::array;
///
/// let x = array![[0.0, 0.1], [0.2, -0.1], [-0.1, 0.0], [3.0, 0.1], [3.2, -0.2], [2.9, 0.0]];
/// let y = array![0, 0, 0, 1, 1, 1];
///
/// let mut cv = DeepLdaCv::new(&[2, 5, 2], Activation::Tanh, Some(3)).unwrap();
/// cv.set_regularization(DEEP_LDA_SW_REG, None).unwrap();
/// cv.set_early_stopping(EarlyStopping::new(5, 0.0, true).unwrap());
///
/// let options = TrainingOptions { nepochs: 20, log_every: 10, ..TrainingOptions::default() };
/// cv.train((x.view(), y.view()), Some((x.view(), y.view())), &options).unwrap();
/// assert_eq!(cv.get_loss_train().len(), cv.get_epochs());
/// ```
pub struct DeepLdaCv {
    name: &'static str,
    network: FeatureNetwork,
    lda: LDA,
    loss: DiscriminantLoss,
    optimizer: Option<Box<dyn Optimizer>>,
    early_stopping: Option<EarlyStopping<ModelParameters>>,
    standardization: Option<InputStandardization>,
    epochs: usize,
    loss_train: Vec<f64>,
    loss_valid: Vec<f64>,
    logger: TrainingLogger,
}

impl DeepLdaCv {
    /// Creates an untrained Deep-LDA CV
    ///
    /// # Parameters
    ///
    /// - `layers` - Layer sizes of the feature network, input first
    /// - `activation` - Activation of the hidden layers
    /// - `seed` - Seed for weight initialization
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - The CV, with `LDA` defaults and the Lorentzian term disabled
    /// - `Err(ModelError::InputValidationError)` - If the layer sizes are invalid
    pub fn new(
        layers: &[usize],
        activation: Activation,
        seed: Option<u64>,
    ) -> Result<Self, ModelError> {
        Ok(DeepLdaCv {
            name: "deeplda_cv",
            network: FeatureNetwork::new(layers, activation, seed)?,
            lda: LDA::new(false),
            loss: DiscriminantLoss::default(),
            optimizer: None,
            early_stopping: None,
            standardization: None,
            epochs: 0,
            loss_train: Vec::new(),
            loss_valid: Vec::new(),
            logger: TrainingLogger::new(),
        })
    }

    get_field!(get_name, name, &'static str);
    get_field!(get_epochs, epochs, usize);
    get_field!(get_loss, loss, DiscriminantLoss);
    get_field_as_ref!(get_standardization, standardization, Option<&InputStandardization>);
    get_field_as_ref!(
        get_early_stopping,
        early_stopping,
        Option<&EarlyStopping<ModelParameters>>
    );

    /// Magnitude of the Lorentzian term.
    pub fn get_lorentzian_reg(&self) -> f64 {
        self.loss.get_lorentzian_reg()
    }

    /// The projector applied to the network outputs.
    pub fn get_lda(&self) -> &LDA {
        &self.lda
    }

    /// The feature network.
    pub fn get_network(&self) -> &FeatureNetwork {
        &self.network
    }

    /// Train loss of every epoch so far.
    pub fn get_loss_train(&self) -> &[f64] {
        &self.loss_train
    }

    /// Validation loss of every epoch so far.
    pub fn get_loss_valid(&self) -> &[f64] {
        &self.loss_valid
    }

    /// Sets both regularizations used in training
    ///
    /// `sw_reg` is added to the diagonal of `S_w`. The Lorentzian magnitude defaults to
    /// `2 / sw_reg` when `lorentzian_reg` is `None`.
    ///
    /// # Parameters
    ///
    /// - `sw_reg` - Regularization of the within-class scatter, see `DEEP_LDA_SW_REG`
    /// - `lorentzian_reg` - Magnitude of the Lorentzian term on the network outputs
    ///
    /// # Returns
    ///
    /// - `Ok(&mut Self)` - Reference to self
    /// - `Err(ModelError::InputValidationError)` - If a value is negative or not finite, or if
    ///   `sw_reg` is zero while `lorentzian_reg` is `None`; nothing is changed in that case
    pub fn set_regularization(
        &mut self,
        sw_reg: f64,
        lorentzian_reg: Option<f64>,
    ) -> Result<&mut Self, ModelError> {
        let lorentzian_reg = match lorentzian_reg {
            Some(value) => value,
            None if sw_reg > 0.0 => 2.0 / sw_reg,
            None => {
                return Err(ModelError::InputValidationError(format!(
                    "lorentzian_reg cannot be derived from sw_reg = {}",
                    sw_reg
                )));
            }
        };

        let mut lda = self.lda.clone();
        lda.set_regularization(sw_reg)?;
        self.loss.set_lorentzian_reg(lorentzian_reg)?;
        self.lda = lda;
        Ok(self)
    }

    /// Uses `optimizer` for training.
    pub fn set_optimizer<O: Optimizer + 'static>(&mut self, optimizer: O) -> &mut Self {
        self.optimizer = Some(Box::new(optimizer));
        self
    }

    /// Uses `Adam` with learning rate `1e-3`, betas `(0.9, 0.999)` and epsilon `1e-8`.
    pub fn default_optimizer(&mut self) -> &mut Self {
        self.set_optimizer(Adam::default())
    }

    /// Enables early stopping on the monitored loss.
    pub fn set_early_stopping(
        &mut self,
        early_stopping: EarlyStopping<ModelParameters>,
    ) -> &mut Self {
        self.early_stopping = Some(early_stopping);
        self
    }

    /// Fits the input standardization applied before the network.
    pub fn standardize_inputs(
        &mut self,
        x: ArrayView2<f64>,
        scaling: ScalingMode,
    ) -> Result<&mut Self, ModelError> {
        let mut standardization = InputStandardization::new(scaling);
        standardization.fit(x)?;
        self.standardization = Some(standardization);
        Ok(self)
    }

    /// Validates the input width, standardizes and converts to the network precision.
    fn prepare_inputs(&self, x: ArrayView2<f64>) -> Result<Array2<f32>, ModelError> {
        if x.ncols() != self.network.n_inputs() {
            return Err(ModelError::InputValidationError(format!(
                "{} expects {} inputs, got {}",
                self.name,
                self.network.n_inputs(),
                x.ncols()
            )));
        }
        let x = match &self.standardization {
            Some(standardization) => standardization.transform(x)?,
            None => x.to_owned(),
        };
        Ok(x.mapv(|v| v as f32))
    }

    /// Network outputs for `x`, without touching any training state
    ///
    /// # Parameters
    ///
    /// * `x` - Inputs, shape: (n_samples, n_inputs)
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f64>)` - Features `H`, shape: (n_samples, n_outputs)
    /// - `Err(ModelError::InputValidationError)` - If the number of inputs is wrong
    pub fn forward_nn(&self, x: ArrayView2<f64>) -> Result<Array2<f64>, ModelError> {
        let h = self.network.infer(&self.prepare_inputs(x)?)?;
        Ok(h.mapv(f64::from))
    }

    /// CV values: the network outputs projected on the stored LDA directions
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f64>)` - CV values, shape: (n_samples, n_components)
    /// - `Err(ModelError::NotFitted)` - If no LDA solution has been stored yet
    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>, ModelError> {
        let h = self.forward_nn(x)?;
        self.lda.transform(h.view())
    }

    /// Loss of features `h`, see `DiscriminantLoss::compute`.
    pub fn loss_function(
        &mut self,
        h: ArrayView2<f64>,
        y: ArrayView1<i32>,
        save_params: bool,
    ) -> Result<f64, ModelError> {
        self.loss.compute(&mut self.lda, h, y, save_params)
    }

    /// Loss of a whole dataset, evaluated without gradients
    ///
    /// # Parameters
    ///
    /// - `data` - Inputs and labels
    /// - `save_params` - Store the LDA solution of this dataset
    ///
    /// # Returns
    ///
    /// - `Ok(f64)` - The loss
    /// - `Err(ModelError)` - If the forward pass or the loss fails
    pub fn evaluate_dataset(
        &mut self,
        data: LabelledData,
        save_params: bool,
    ) -> Result<f64, ModelError> {
        let (x, y) = data;
        let h = self.forward_nn(x)?;
        self.loss_function(h.view(), y, save_params)
    }

    /// Runs one optimizer step per batch over the training set
    ///
    /// # Parameters
    ///
    /// - `data` - Training inputs and labels
    /// - `batch_size` - Samples per step
    /// - `rng` - Generator used to shuffle fixed-size batches
    ///
    /// # Returns
    ///
    /// - `Ok(())` - The epoch completed
    /// - `Err(ModelError)` - If any batch fails; the weights updated by earlier batches are kept
    pub fn train_epoch(
        &mut self,
        data: LabelledData,
        batch_size: BatchSize,
        rng: &mut StdRng,
    ) -> Result<(), ModelError> {
        let (x, y) = data;
        let n_samples = x.nrows();

        let batches: Vec<Vec<usize>> = match batch_size {
            BatchSize::Full => vec![(0..n_samples).collect()],
            BatchSize::Fixed(0) => {
                return Err(ModelError::InputValidationError(
                    "batch size must be greater than 0".to_string(),
                ));
            }
            BatchSize::Fixed(size) => {
                let mut indices: Vec<usize> = (0..n_samples).collect();
                indices.shuffle(rng);
                indices.chunks(size).map(|chunk| chunk.to_vec()).collect()
            }
        };

        if self.optimizer.is_none() {
            self.default_optimizer();
        }

        for batch in batches {
            let x_batch = x.select(Axis(0), &batch);
            let y_batch = y.select(Axis(0), &batch);

            let inputs = self.prepare_inputs(x_batch.view())?;
            let h = self.network.forward(&inputs)?.mapv(f64::from);
            let (_, grad) = self
                .loss
                .compute_with_grad(&self.lda, h.view(), y_batch.view())?;

            self.network.backward(&grad.mapv(|v| v as f32))?;
            match self.optimizer.as_deref_mut() {
                Some(optimizer) => self.network.apply_optimizer(optimizer),
                None => {
                    return Err(ModelError::ProcessingError(
                        "No optimizer configured".to_string(),
                    ));
                }
            }
        }

        self.epochs += 1;
        Ok(())
    }

    /// Trains the network
    ///
    /// # Parameters
    ///
    /// - `train_data` - Training inputs and labels
    /// - `valid_data` - Validation inputs and labels; the train loss is monitored when `None`
    /// - `options` - Batch size, number of epochs, logging and standardization
    ///
    /// # Returns
    ///
    /// - `Ok(TrainingOutcome)` - Whether early stopping fired
    /// - `Err(ModelError)` - On invalid input or if any batch or evaluation fails
    pub fn train(
        &mut self,
        train_data: LabelledData,
        valid_data: Option<LabelledData>,
        options: &TrainingOptions,
    ) -> Result<TrainingOutcome, ModelError> {
        validate_data(train_data, "training")?;
        if let Some(valid) = valid_data {
            validate_data(valid, "validation")?;
        }
        if options.log_every == 0 {
            return Err(ModelError::InputValidationError(
                "log_every must be greater than 0".to_string(),
            ));
        }

        if self.optimizer.is_none() {
            self.default_optimizer();
        }
        if options.standardize_inputs {
            self.standardize_inputs(train_data.0, options.scaling)?;
        }
        if options.info {
            self.print_info();
        }

        let mut rng = match options.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let progress_bar = ProgressBar::new(options.nepochs as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} | Loss: {msg}")
                .map_err(|e| ModelError::ProcessingError(e.to_string()))?
                .progress_chars("█▓░"),
        );

        for ep in 0..options.nepochs {
            self.train_epoch(train_data, options.batch_size, &mut rng)?;

            let loss_train = self.evaluate_dataset(train_data, true)?;
            let loss_valid = match valid_data {
                Some(valid) => self.evaluate_dataset(valid, false)?,
                None => loss_train,
            };
            self.loss_train.push(loss_train);
            self.loss_valid.push(loss_valid);

            let early_stop = if self.early_stopping.is_some() {
                let params = self.parameters();
                self.early_stopping
                    .as_mut()
                    .is_some_and(|es| es.step(loss_valid, &params))
            } else {
                false
            };

            if (ep + 1) % options.log_every == 0 || early_stop {
                let lines = self.logger.format_log(
                    &[
                        ("Epoch", LogValue::Int(ep + 1)),
                        ("Train Loss", LogValue::Float(loss_train)),
                        ("Valid Loss", LogValue::Float(loss_valid)),
                    ],
                    Some(&LOG_SPACING),
                    LOG_DECIMALS,
                );
                progress_bar.suspend(|| {
                    for line in &lines {
                        println!("{}", line);
                    }
                });
            }

            progress_bar.set_message(format!("{:.4}", loss_train));
            progress_bar.inc(1);

            if early_stop {
                let best = self
                    .early_stopping
                    .as_ref()
                    .and_then(|es| es.best_model())
                    .cloned();
                if let Some(best) = best {
                    self.set_parameters(&best)?;
                }
                progress_bar.finish_with_message(format!("early stop at epoch {}", ep + 1));
                return Ok(TrainingOutcome::Converged { epoch: ep + 1 });
            }
        }

        progress_bar.finish_with_message(format!(
            "{:.4}",
            self.loss_train.last().copied().unwrap_or(f64::NAN)
        ));
        Ok(TrainingOutcome::MaxEpochsReached)
    }

    /// Snapshot of the network weights and the stored LDA solution.
    pub fn parameters(&self) -> ModelParameters {
        ModelParameters {
            network: self.network.parameters(),
            discriminant: self.lda.get_solution().cloned(),
        }
    }

    /// Restores a snapshot taken with `parameters`
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Network and LDA solution restored
    /// - `Err(ModelError::InputValidationError)` - If the snapshot does not fit; nothing is changed
    pub fn set_parameters(&mut self, params: &ModelParameters) -> Result<(), ModelError> {
        let mut lda = self.lda.clone();
        if let Some(solution) = &params.discriminant {
            if solution.n_features() != self.network.n_outputs() {
                return Err(ModelError::InputValidationError(format!(
                    "Stored solution has {} features, network has {} outputs",
                    solution.n_features(),
                    self.network.n_outputs()
                )));
            }
            lda.load_solution(solution.clone())?;
        }
        self.network.set_parameters(&params.network)?;
        self.lda = lda;
        Ok(())
    }

    /// Prints the network summary and the training configuration.
    pub fn print_info(&self) {
        println!("{}", self.name);
        self.network.summary();
        println!(
            "Optimizer: {}",
            self.optimizer
                .as_ref()
                .map_or("not set", |optimizer| optimizer.name())
        );
        println!(
            "Regularization: sw_reg = {}, lorentzian_reg = {}",
            self.lda.get_sw_reg(),
            self.loss.get_lorentzian_reg()
        );
        match &self.early_stopping {
            Some(es) => println!(
                "Early stopping: patience = {}, min_delta = {}, consecutive = {}",
                es.get_patience(),
                es.get_min_delta(),
                es.is_consecutive()
            ),
            None => println!("Early stopping: disabled"),
        }
        if let Some(standardization) = &self.standardization {
            println!("Input standardization: {:?}", standardization.get_mode());
        }
    }
}

fn validate_data(data: LabelledData, what: &str) -> Result<(), ModelError> {
    let (x, y) = data;
    if x.nrows() != y.len() {
        return Err(ModelError::InputValidationError(format!(
            "{} inputs have {} rows but {} labels were given",
            what,
            x.nrows(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(ModelError::InputValidationError(format!(
            "{} set is empty",
            what
        )));
    }
    Ok(())
}
