//! Dense experiment tensors: building, seed folding, access.

pub mod builder;
pub mod reduce;
pub mod tensor;

pub use tensor::{Dataset, ExperimentTensor, MeanDataset};
