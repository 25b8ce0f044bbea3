//! # Network-constrained Lasso
//!
//! This library contains a network-constrained lasso (ncLasso) implementation
//! for linear regression models. On top of the usual L1 penalty it places a
//! quadratic smoothness penalty on the Laplacian of a feature graph, so that
//! coefficients of connected features are pulled towards each other. This is
//! a natural fit for genomic data, where pathway or linkage information
//! relates predictors to each other and the sample count is far smaller than
//! the feature count.
//!
//! See also:
//! * [Li & Li, "Network-constrained regularization and variable selection for
//! analysis of genomic data"](https://doi.org/10.1093/bioinformatics/btn081)
//!
//! ## Example
//!
//! ```
//! use linfa::prelude::*;
//! use linfa_nclasso::{LaplacianSqrt, NcLasso};
//! use ndarray::array;
//!
//! # fn main() -> Result<(), linfa_nclasso::NcLassoError> {
//! // two features linked by an edge, a third one unrelated
//! let adjacency = array![
//!     [0.0, 1.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [0.0, 0.0, 0.0],
//! ];
//! let penalty_sqrt = LaplacianSqrt::from_adjacency(&adjacency)?;
//!
//! let dataset = Dataset::new(
//!     array![[1.0, 0.8, 0.1], [0.2, 0.3, 0.9], [0.5, 0.4, 0.3], [0.9, 1.1, 0.2]],
//!     array![1.8, 0.6, 0.9, 2.0],
//! );
//!
//! let model = NcLasso::params(&penalty_sqrt)
//!     .penalty(0.1)
//!     .graph_penalty(1.0)
//!     .fit(&dataset)?;
//!
//! let prediction = model.predict(dataset.records());
//! # assert_eq!(prediction.len(), 4);
//! # Ok(())
//! # }
//! ```
//!
//! ## Implementation
//!
//! The estimator does not solve the penalized problem directly. With a factor
//! `S` satisfying `SᵀS = L` the graph penalty becomes `‖Sβ‖²`, and stacking
//! `√λ2·S` below the records while shrinking the design by `1/√(1 + λ2)`
//! reduces the whole objective to a plain lasso on the augmented system. The
//! transformed problem is delegated to the coordinate descent solver of
//! [`linfa-elasticnet`](https://docs.rs/linfa-elasticnet), and the recovered
//! coefficients are scaled back afterwards.
//!
//! [`LaplacianSqrt`] offers two factorizations: an exact signed incidence
//! matrix with one row per graph edge, and a spectral factor from the
//! symmetric eigendecomposition of the Laplacian. Building the factor is the
//! expensive part, a hyper-parameter search should build it once and reuse it
//! for every fit.

use linfa::Float;
use ndarray::Array1;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

mod algorithm;
mod error;
mod hyperparams;
mod laplacian;

pub use error::{NcLassoError, Result};
pub use hyperparams::{NcLassoParams, NcLassoValidParams};
pub use laplacian::{laplacian, LaplacianSqrt};

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
/// Network-constrained lasso model
///
/// This struct contains the parameters of a fitted network-constrained lasso
/// model: the hyperplane, (optionally) an intercept, the two penalties the
/// fit was configured with, and the duality gap and step count reported by
/// the inner solver.
#[derive(Debug, Clone, PartialEq)]
pub struct NcLasso<F> {
    hyperplane: Array1<F>,
    intercept: F,
    penalty: F,
    graph_penalty: F,
    duality_gap: F,
    n_steps: u32,
}

impl<F: Float> NcLasso<F> {
    /// Create a default parameter set borrowing the given Laplacian square
    /// root factor
    ///
    /// By default, an intercept will be fitted. To disable fitting an
    /// intercept, call `.with_intercept(false)` before calling `.fit()`.
    ///
    /// The factor is only borrowed: sweeping a grid of `penalty` and
    /// `graph_penalty` values reuses the same factor for every fit.
    pub fn params(laplacian_sqrt: &LaplacianSqrt<F>) -> NcLassoParams<'_, F> {
        NcLassoParams::new(laplacian_sqrt)
    }
}
