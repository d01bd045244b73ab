//! Error type shared by distributions, samplers and the driver loop.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("covariance is not positive-definite: pivot {pivot} is {value}")]
    NotPositiveDefinite { pivot: usize, value: f64 },

    #[error("covariance is not symmetric: upper {upper} != lower {lower}")]
    AsymmetricCovariance { upper: f64, lower: f64 },

    #[error("invalid bounds on axis {axis}: [{min}, {max}]")]
    InvalidBounds { axis: usize, min: f64, max: f64 },

    #[error("mixture has {components} components but {weights} weights")]
    WeightCountMismatch { components: usize, weights: usize },

    #[error("mixture weights must be finite, non-negative and sum to a positive value")]
    InvalidWeights,

    #[error("mixture needs at least one component")]
    EmptyMixture,

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("no in-bounds draw after {attempts} attempts")]
    DomainStall { attempts: usize },

    #[error("empty input: {0}")]
    EmptyInput(#[from] ndarray_stats::errors::EmptyInput),

    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("progress bar template error: {0}")]
    ProgressTemplate(#[from] indicatif::style::TemplateError),
}

pub type Result<T> = std::result::Result<T, SamplingError>;

impl SamplingError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SamplingError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
