use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VolError {
    #[error("insufficient history: need at least {required} observations, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("invalid option parameters: {0}")]
    InvalidParameters(String),

    #[error("insufficient data: need at least {required} rows, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("incomplete features: missing or non-finite values for {}", missing.join(", "))]
    IncompleteFeatures { missing: Vec<String> },

    #[error("invalid price series: {0}")]
    InvalidSeries(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("model error: {0}")]
    Model(String),
}

pub type VolResult<T> = Result<T, VolError>;

impl VolError {
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    pub fn invalid_series(msg: impl Into<String>) -> Self {
        Self::InvalidSeries(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }
}
