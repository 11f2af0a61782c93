pub use crate::collective_variable::deep_lda_cv::{
    BatchSize, DEEP_LDA_SW_REG, DeepLdaCv, LabelledData, ModelParameters, TrainingOptions,
    TrainingOutcome,
};
pub use crate::collective_variable::discriminant_loss::DiscriminantLoss;
pub use crate::collective_variable::lda_cv::LdaCv;
pub use crate::collective_variable::training_log::{LogValue, TrainingLogger};
