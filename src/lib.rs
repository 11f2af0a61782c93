/// Error type shared by every model in the crate.
pub mod error;

pub use error::ModelError;

/// A macro that generates a getter method for any field.
///
/// This macro creates a public getter method that returns the value of the
/// specified field. Intended for `Copy` fields.
///
/// # Parameters
///
/// - `$method_name` - The name of the getter method (e.g., get_sw_reg)
/// - `$field_name` - The name of the field to access (e.g., sw_reg)
/// - `$return_type` - The return type of the getter method
macro_rules! get_field {
    ($method_name:ident, $field_name:ident, $return_type:ty) => {
        #[doc = concat!("Gets the `", stringify!($field_name), "` field.\n\n")]
        #[doc = "# Returns\n\n"]
        #[doc = concat!("* `", stringify!($return_type), "` - The value of the `", stringify!($field_name), "` field")]
        pub fn $method_name(&self) -> $return_type {
            self.$field_name
        }
    };
}

/// A macro that generates a public getter method returning a reference to a field.
///
/// This macro creates a method that provides immutable reference access to a private
/// `Option` field, following the Rust convention of getter methods.
///
/// # Parameters
///
/// - `$method_name` - The identifier for the generated getter method name
/// - `$field_name` - The identifier of the struct field to access
/// - `$return_type` - The type expression for the return value (typically `Option<&Type>`)
macro_rules! get_field_as_ref {
    ($method_name:ident, $field_name:ident, $return_type:ty) => {
        #[doc = concat!("Gets the `", stringify!($field_name), "` field.\n\n")]
        #[doc = "# Returns\n\n"]
        #[doc = concat!("* `", stringify!($return_type), "` - The value of the `", stringify!($field_name), "` field as a reference")]
        pub fn $method_name(&self) -> $return_type {
            self.$field_name.as_ref()
        }
    };
}

/// Linear discriminant analysis building blocks and data preprocessing.
///
/// # Components
///
/// - `scatter_matrix` - total / within-class / between-class scatter estimation, with an
///   optional harmonic (HLDA) combination of the per-class covariances, and its adjoint
/// - `generalized_eigen` - Cholesky-whitened solver for `S_b v = λ S_w v` with canonical
///   eigenvector signs, plus the eigenvalue adjoint used for gradient-based training
/// - `linear_discriminant_analysis` - the `LDA` projector: `fit`, `transform`,
///   `fit_transform`, parameter export and PLUMED `COMBINE` formula export
/// - `standardize` - input standardization fitted once and reapplied
///
/// # Example
/// ```rust
/// use lda_colvar::utility::LDA;
/// use ndarray::array;
///
/// let x = array![[0.0, 0.1], [0.2, -0.1], [-0.1, 0.0], [3.0, 0.1], [3.2, -0.2], [2.9, 0.0]];
/// let y = array![0, 0, 0, 1, 1, 1];
///
/// let mut lda = LDA::new(false);
/// let projected = lda.fit_transform(x.view(), y.view()).unwrap();
/// assert_eq!(projected.ncols(), 1);
/// println!("{}", lda.export_linear_formula(None).unwrap());
/// ```
#[cfg(feature = "utility")]
pub mod utility;

/// Components for building and training the feature network of Deep-LDA.
///
/// # Core Components
///
/// - **Dense**: fully connected layer with its activation, trained by manual backpropagation
/// - **Activation**: ReLU, ELU, Tanh, Sigmoid, Softplus and Linear
/// - **Optimizers**: SGD and Adam behind the `Optimizer` trait
/// - **FeatureNetwork**: a linear stack of dense layers with parameter snapshots
/// - **EarlyStopping**: patience-based stopping that keeps the best checkpoint
///
/// # Example
/// ```rust
/// use lda_colvar::neural_network::*;
/// use ndarray::Array2;
///
/// let mut network = FeatureNetwork::new(&[4, 8, 2], Activation::Tanh, Some(7)).unwrap();
/// let x = Array2::<f32>::ones((3, 4));
/// let h = network.forward(&x).unwrap();
/// assert_eq!(h.dim(), (3, 2));
/// network.summary();
/// ```
#[cfg(feature = "neural_network")]
pub mod neural_network;

/// Collective variables built on linear discriminant analysis.
///
/// - **LdaCv**: linear LDA or harmonic LDA collective variable
/// - **DeepLdaCv**: neural-network features optimized to maximize the Fisher discriminant
/// - **DiscriminantLoss**: the eigenvalue loss with its Lorentzian output regularizer
/// - **TrainingLogger**: fixed-width epoch log
///
/// # Example
/// ```rust
/// use lda_colvar::collective_variable::*;
/// use lda_colvar::neural_network::Activation;
/// use ndarray::array;
///
/// let x = array![[0.0, 0.1], [0.2, -0.1], [-0.1, 0.0], [3.0, 0.1], [3.2, -0.2], [2.9, 0.0]];
/// let y = array![0, 0, 0, 1, 1, 1];
///
/// let mut cv = DeepLdaCv::new(&[2, 4, 2], Activation::Tanh, Some(0)).unwrap();
/// cv.set_regularization(0.05, None).unwrap();
/// let options = TrainingOptions { nepochs: 5, log_every: 5, ..TrainingOptions::default() };
/// cv.train((x.view(), y.view()), None, &options).unwrap();
/// let s = cv.transform(x.view()).unwrap();
/// assert_eq!(s.ncols(), 1);
/// ```
#[cfg(feature = "collective_variable")]
pub mod collective_variable;

/// A convenience module that re-exports the most commonly used types of this crate.
pub mod prelude;
