use thiserror::Error;

pub type Result<T> = std::result::Result<T, NcLassoError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NcLassoError {
    #[error("adjacency matrix must be square, got {0} rows and {1} columns")]
    AdjacencyNotSquare(usize, usize),
    #[error("adjacency matrix must be symmetric, largest asymmetry is {0}")]
    AsymmetricAdjacency(f32),
    #[error("edge weights must be non-negative, found {weight} at ({row}, {col})")]
    NegativeWeight {
        weight: f32,
        row: usize,
        col: usize,
    },
    #[error("penalty factor covers {factor} features but the records have {records}")]
    PenaltyDimMismatch { factor: usize, records: usize },
    #[error("records have {records} rows but there are {targets} targets")]
    SampleMismatch { records: usize, targets: usize },
    /// The input has not enough samples
    #[error("at least one sample is needed to fit a model")]
    NotEnoughSamples,
    #[error("the lasso penalty must be non-negative, got {0}")]
    InvalidL1Penalty(f32),
    #[error("the graph penalty must be non-negative, got {0}")]
    InvalidL2Penalty(f32),
    #[error("tolerance must be non-negative, got {0}")]
    InvalidTolerance(f32),
    #[error("penalty factor residual {residual} exceeds tolerance {tolerance}")]
    FactorCheckFailed { residual: f32, tolerance: f32 },
    #[error(transparent)]
    LinalgError(#[from] linfa_linalg::LinalgError),
    #[error(transparent)]
    InnerSolver(#[from] linfa_elasticnet::ElasticNetError),
    #[error(transparent)]
    BaseCrate(#[from] linfa::Error),
}
