//! Operands of arithmetic operator nodes.
//!
//! An operand is either a shared reference to a distribution node or a
//! numeric constant owned by the operator. Every transform pattern-matches on
//! the variant explicitly; there is no dynamic type inspection anywhere else.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use pc_core::{Error, Result};

use crate::baseclass::{DepId, DistRef, Distribution};
use crate::cache::EvalCache;

/// A distribution or a per-axis constant.
///
/// Constants of length 1 broadcast to the dimensionality of the operator
/// they belong to.
#[derive(Clone)]
pub enum Operand {
    /// A distribution node, owned elsewhere.
    Dist(DistRef),
    /// A constant, one entry per axis (or a single broadcast entry).
    Const(DVector<f64>),
}

impl Operand {
    /// Wrap a concrete distribution.
    pub fn dist(d: impl Distribution + 'static) -> Self {
        Operand::Dist(Arc::new(d))
    }

    /// Dimensionality this operand contributes.
    pub fn dim(&self) -> usize {
        match self {
            Operand::Dist(d) => d.dim(),
            Operand::Const(c) => c.len(),
        }
    }

    /// The distribution behind this operand, if any.
    pub fn as_dist(&self) -> Option<&DistRef> {
        match self {
            Operand::Dist(d) => Some(d),
            Operand::Const(_) => None,
        }
    }

    /// Whether this operand is a distribution.
    pub fn is_dist(&self) -> bool {
        matches!(self, Operand::Dist(_))
    }

    /// Sources of randomness behind this operand; empty for constants.
    pub fn dependencies(&self) -> BTreeSet<DepId> {
        match self {
            Operand::Dist(d) => d.dependencies(),
            Operand::Const(_) => BTreeSet::new(),
        }
    }

    /// The constant value broadcast to `dim` axes; `None` for distributions.
    pub(crate) fn constant(&self, dim: usize) -> Option<DVector<f64>> {
        match self {
            Operand::Dist(_) => None,
            Operand::Const(c) => Some(broadcast(c, dim)),
        }
    }

    /// Resolve this operand to a per-axis lower bound.
    pub(crate) fn lower(&self, dim: usize, cache: &mut EvalCache) -> Result<DVector<f64>> {
        match self {
            Operand::Dist(d) => d.get_lower(cache),
            Operand::Const(c) => Ok(broadcast(c, dim)),
        }
    }

    /// Resolve this operand to a per-axis upper bound.
    pub(crate) fn upper(&self, dim: usize, cache: &mut EvalCache) -> Result<DVector<f64>> {
        match self {
            Operand::Dist(d) => d.get_upper(cache),
            Operand::Const(c) => Ok(broadcast(c, dim)),
        }
    }

    /// Resolve this operand to an additive shift of shape `dim x ncols`.
    ///
    /// A constant broadcasts across columns. A distribution resolves to the
    /// x-space value it took earlier in this pass; treating it as a
    /// deterministic shift is only sound once such a value exists, so an
    /// unresolved distribution is an error rather than a silent wrong answer.
    pub(crate) fn shift_matrix(
        &self,
        dim: usize,
        ncols: usize,
        cache: &EvalCache,
    ) -> Result<DMatrix<f64>> {
        match self {
            Operand::Const(c) => {
                let c = broadcast(c, dim);
                Ok(DMatrix::from_fn(dim, ncols, |r, _| c[r]))
            }
            Operand::Dist(d) => match cache.x_value(d.id()) {
                Some(v) if v.nrows() == dim && v.ncols() == ncols => {
                    log::debug!("treating '{d}' as a deterministic shift via its cached value");
                    Ok(v.clone())
                }
                Some(v) => Err(Error::Computation(format!(
                    "cached value for '{d}' has shape {}x{}, expected {dim}x{ncols}",
                    v.nrows(),
                    v.ncols()
                ))),
                None => Err(Error::StochasticallyDependent(format!(
                    "'{d}' must be evaluated earlier in the pass before it can act as an additive shift"
                ))),
            },
        }
    }

    /// Raw moment of this operand at a multi-index: `E[X^key]` for a
    /// distribution, the elementwise power collapsed across axes for a
    /// constant.
    pub(crate) fn moment(&self, key: &[u32]) -> Result<f64> {
        match self {
            Operand::Dist(d) => d.get_mom(key),
            Operand::Const(c) => {
                let c = broadcast(c, key.len());
                Ok(key.iter().zip(c.iter()).map(|(&k, x)| x.powi(k as i32)).product())
            }
        }
    }
}

fn broadcast(c: &DVector<f64>, dim: usize) -> DVector<f64> {
    if c.len() == dim {
        c.clone()
    } else {
        DVector::from_element(dim, c[0])
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Const(DVector::from_element(1, value))
    }
}

impl From<Vec<f64>> for Operand {
    fn from(value: Vec<f64>) -> Self {
        Operand::Const(DVector::from_vec(value))
    }
}

impl From<DVector<f64>> for Operand {
    fn from(value: DVector<f64>) -> Self {
        Operand::Const(value)
    }
}

impl From<DistRef> for Operand {
    fn from(value: DistRef) -> Self {
        Operand::Dist(value)
    }
}

impl<D: Distribution + 'static> From<Arc<D>> for Operand {
    fn from(value: Arc<D>) -> Self {
        Operand::Dist(value)
    }
}

impl fmt::Debug for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Dist(d) => write!(f, "Dist({d})"),
            Operand::Const(c) => write!(f, "Const({})", fmt_const(c)),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Dist(d) => write!(f, "{d}"),
            Operand::Const(c) => write!(f, "{}", fmt_const(c)),
        }
    }
}

fn fmt_const(c: &DVector<f64>) -> String {
    if c.len() == 1 {
        format!("{}", c[0])
    } else {
        let parts: Vec<String> = c.iter().map(|x| format!("{x}")).collect();
        format!("[{}]", parts.join(", "))
    }
}
