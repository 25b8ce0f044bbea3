use linfa::{Float, ParamGuard};

use crate::error::NcLassoError;
use crate::laplacian::LaplacianSqrt;

use super::Result;

/// A verified hyper-parameter set ready for the estimation of a
/// network-constrained lasso model
///
/// See [`NcLassoParams`](crate::NcLassoParams) for more information.
#[derive(Clone, Debug, PartialEq)]
pub struct NcLassoValidParams<'a, F> {
    laplacian_sqrt: &'a LaplacianSqrt<F>,
    penalty: F,
    graph_penalty: F,
    with_intercept: bool,
    max_iterations: u32,
    tolerance: F,
}

impl<F: Float> NcLassoValidParams<'_, F> {
    pub fn laplacian_sqrt(&self) -> &LaplacianSqrt<F> {
        self.laplacian_sqrt
    }

    pub fn penalty(&self) -> F {
        self.penalty
    }

    pub fn graph_penalty(&self) -> F {
        self.graph_penalty
    }

    pub fn with_intercept(&self) -> bool {
        self.with_intercept
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn tolerance(&self) -> F {
        self.tolerance
    }
}

/// A hyper-parameter set for the network-constrained lasso
///
/// Configures and minimizes the following objective function:
/// ```ignore
/// 1 / (2 * n_samples) * ||y - Xw||^2_2
///     + penalty * ||w||_1
///     + graph_penalty * wᵀ L w
/// ```
/// where `L` is the Laplacian of the feature graph represented by the
/// borrowed [`LaplacianSqrt`]. The square root factor is built once by the
/// caller and shared across every parameter combination of a grid search.
///
/// The parameter set can be verified into a
/// [`NcLassoValidParams`](crate::hyperparams::NcLassoValidParams) by calling
/// [ParamGuard::check](Self::check). It is also possible to directly fit a
/// model with [Fit::fit](linfa::traits::Fit::fit) which implicitely verifies
/// the parameter set prior to the model estimation and forwards any error.
///
/// # Parameters
/// | Name | Default | Purpose | Range |
/// | :--- | :--- | :---| :--- |
/// | [penalty](Self::penalty) | `1.0` | Lasso penalty | `[0, inf)` |
/// | [graph_penalty](Self::graph_penalty) | `1.0` | Smoothness penalty over the feature graph | `[0, inf)` |
/// | [with_intercept](Self::with_intercept) | `true` | Enable intercept | `false`, `true` |
/// | [tolerance](Self::tolerance) | `1e-4` | Stopping tolerance of the inner solver | `(0, inf)` |
/// | [max_iterations](Self::max_iterations) | `1000` | Maximum number of inner solver iterations | `[1, inf)` |
///
/// # Errors
///
/// Returns [`InvalidL1Penalty`](NcLassoError::InvalidL1Penalty) if the lasso
/// penalty is negative, [`InvalidL2Penalty`](NcLassoError::InvalidL2Penalty)
/// if the graph penalty is negative and
/// [`InvalidTolerance`](NcLassoError::InvalidTolerance) if the tolerance is
/// negative.
#[derive(Clone, Debug, PartialEq)]
pub struct NcLassoParams<'a, F>(NcLassoValidParams<'a, F>);

impl<'a, F: Float> NcLassoParams<'a, F> {
    /// Create default network-constrained lasso hyper parameters borrowing
    /// the given square root factor
    ///
    /// By default, an intercept will be fitted. To disable fitting an
    /// intercept, call `.with_intercept(false)` before calling `.fit()`.
    pub fn new(laplacian_sqrt: &'a LaplacianSqrt<F>) -> Self {
        Self(NcLassoValidParams {
            laplacian_sqrt,
            penalty: F::one(),
            graph_penalty: F::one(),
            with_intercept: true,
            max_iterations: 1000,
            tolerance: F::cast(1e-4),
        })
    }

    /// Set the lasso penalty controlling the sparsity of the coefficients
    pub fn penalty(mut self, penalty: F) -> Self {
        self.0.penalty = penalty;
        self
    }

    /// Set the smoothness penalty applied along the edges of the feature
    /// graph. Setting it to `0.0` recovers a plain lasso.
    pub fn graph_penalty(mut self, graph_penalty: F) -> Self {
        self.0.graph_penalty = graph_penalty;
        self
    }

    /// Configure the model to fit an intercept.
    /// Defaults to `true` if not set.
    pub fn with_intercept(mut self, with_intercept: bool) -> Self {
        self.0.with_intercept = with_intercept;
        self
    }

    /// Set the stopping tolerance forwarded to the inner lasso solver.
    ///
    /// Defaults to `1e-4` if not set
    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.0.tolerance = tolerance;
        self
    }

    /// Set the maximum number of iterations forwarded to the inner lasso
    /// solver.
    ///
    /// Defaults to `1000` if not set
    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.0.max_iterations = max_iterations;
        self
    }
}

impl<'a, F: Float> ParamGuard for NcLassoParams<'a, F> {
    type Checked = NcLassoValidParams<'a, F>;
    type Error = NcLassoError;

    /// Validate the hyper parameters
    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.penalty.is_negative() {
            Err(NcLassoError::InvalidL1Penalty(
                self.0.penalty.to_f32().unwrap(),
            ))
        } else if self.0.graph_penalty.is_negative() {
            Err(NcLassoError::InvalidL2Penalty(
                self.0.graph_penalty.to_f32().unwrap(),
            ))
        } else if self.0.tolerance.is_negative() {
            Err(NcLassoError::InvalidTolerance(
                self.0.tolerance.to_f32().unwrap(),
            ))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
