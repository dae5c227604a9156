//! The distribution abstraction shared by leaves and operator nodes.
//!
//! The trait splits every transform into a required `eval_*` hook holding the
//! distribution-specific mathematics and a provided `get_*` wrapper that
//! memoizes through the per-pass [`EvalCache`]. Callers that do not need to
//! share a cache use the bare convenience methods (`lower`, `fwd`, ...),
//! which open a fresh cache for a single pass.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use pc_core::{Recurrence, Result};

use crate::cache::{EvalCache, EvalKind};

static NEXT_DIST_ID: AtomicUsize = AtomicUsize::new(0);
static NEXT_DEP_ID: AtomicUsize = AtomicUsize::new(0);

/// Stable identity of a distribution node, used as the memoization key.
///
/// Identity is assigned at construction and never reused, so two nodes with
/// equal parameters are still distinct cache entries while one node reachable
/// through several paths of a DAG is a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DistId(usize);

impl DistId {
    /// Allocate a fresh node identity.
    pub fn fresh() -> Self {
        DistId(NEXT_DIST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity of an underlying source of randomness.
///
/// Leaf distributions allocate one; composite nodes carry the union of their
/// operands' sets. Two nodes are stochastically dependent exactly when their
/// sets intersect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DepId(usize);

impl DepId {
    /// Allocate a fresh randomness source.
    pub fn fresh() -> Self {
        DepId(NEXT_DEP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Shared handle to a distribution node.
pub type DistRef = Arc<dyn Distribution>;

/// A probability distribution node.
///
/// Locations and results are matrices with one row per axis and one column
/// per evaluation point; bounds and recurrence coefficients are vectors with
/// one entry per axis.
pub trait Distribution: fmt::Debug + fmt::Display + Send + Sync {
    /// Node identity (memoization key).
    fn id(&self) -> DistId;

    /// Number of axes.
    fn dim(&self) -> usize;

    /// The sources of randomness this node depends on.
    fn dependencies(&self) -> BTreeSet<DepId>;

    /// Lower bound of the (practical) support, per axis.
    fn eval_lower(&self, cache: &mut EvalCache) -> Result<DVector<f64>>;

    /// Upper bound of the (practical) support, per axis.
    fn eval_upper(&self, cache: &mut EvalCache) -> Result<DVector<f64>>;

    /// Cumulative distribution function at `xloc`.
    fn eval_fwd(&self, xloc: &DMatrix<f64>, cache: &mut EvalCache) -> Result<DMatrix<f64>>;

    /// Probability density function at `xloc`.
    fn eval_pdf(&self, xloc: &DMatrix<f64>, cache: &mut EvalCache) -> Result<DMatrix<f64>>;

    /// Inverse CDF (quantile function) at probability levels `uloc`.
    fn eval_inv(&self, uloc: &DMatrix<f64>, cache: &mut EvalCache) -> Result<DMatrix<f64>>;

    /// Raw moment `E[X^key]` for one multi-index (one exponent per axis).
    fn eval_mom(&self, key: &[u32]) -> Result<f64>;

    /// Three-term-recurrence coefficients at order `key` (one order per axis).
    fn eval_ttr(&self, key: &[u32]) -> Result<Recurrence>;

    /// Memoized lower bound.
    fn get_lower(&self, cache: &mut EvalCache) -> Result<DVector<f64>> {
        if let Some(v) = cache.lower(self.id()) {
            return Ok(v.clone());
        }
        let v = self.eval_lower(cache)?;
        cache.store_lower(self.id(), v.clone());
        Ok(v)
    }

    /// Memoized upper bound.
    fn get_upper(&self, cache: &mut EvalCache) -> Result<DVector<f64>> {
        if let Some(v) = cache.upper(self.id()) {
            return Ok(v.clone());
        }
        let v = self.eval_upper(cache)?;
        cache.store_upper(self.id(), v.clone());
        Ok(v)
    }

    /// Memoized CDF evaluation.
    fn get_fwd(&self, xloc: &DMatrix<f64>, cache: &mut EvalCache) -> Result<DMatrix<f64>> {
        if let Some(out) = cache.eval_result(self.id(), EvalKind::Forward) {
            return Ok(out.clone());
        }
        let out = self.eval_fwd(xloc, cache)?;
        cache.record_eval(self.id(), EvalKind::Forward, xloc, &out);
        Ok(out)
    }

    /// Memoized PDF evaluation.
    fn get_pdf(&self, xloc: &DMatrix<f64>, cache: &mut EvalCache) -> Result<DMatrix<f64>> {
        if let Some(out) = cache.eval_result(self.id(), EvalKind::Density) {
            return Ok(out.clone());
        }
        let out = self.eval_pdf(xloc, cache)?;
        cache.record_eval(self.id(), EvalKind::Density, xloc, &out);
        Ok(out)
    }

    /// Memoized inverse-CDF evaluation.
    fn get_inv(&self, uloc: &DMatrix<f64>, cache: &mut EvalCache) -> Result<DMatrix<f64>> {
        if let Some(out) = cache.eval_result(self.id(), EvalKind::Inverse) {
            return Ok(out.clone());
        }
        let out = self.eval_inv(uloc, cache)?;
        cache.record_eval(self.id(), EvalKind::Inverse, uloc, &out);
        Ok(out)
    }

    /// Raw moment for one multi-index. Pure in the key; not cached per pass.
    fn get_mom(&self, key: &[u32]) -> Result<f64> {
        self.eval_mom(key)
    }

    /// Recurrence coefficients for one order vector. Pure in the key.
    fn get_ttr(&self, key: &[u32]) -> Result<Recurrence> {
        self.eval_ttr(key)
    }

    /// Lower bound with a fresh cache.
    fn lower(&self) -> Result<DVector<f64>> {
        self.get_lower(&mut EvalCache::new())
    }

    /// Upper bound with a fresh cache.
    fn upper(&self) -> Result<DVector<f64>> {
        self.get_upper(&mut EvalCache::new())
    }

    /// CDF with a fresh cache.
    fn fwd(&self, xloc: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.get_fwd(xloc, &mut EvalCache::new())
    }

    /// PDF with a fresh cache.
    fn pdf(&self, xloc: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.get_pdf(xloc, &mut EvalCache::new())
    }

    /// Inverse CDF with a fresh cache.
    fn inv(&self, uloc: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        self.get_inv(uloc, &mut EvalCache::new())
    }

    /// Raw moments for a batch of multi-indices.
    fn mom(&self, keys: &[Vec<u32>]) -> Result<Vec<f64>> {
        keys.iter().map(|key| self.get_mom(key)).collect()
    }

    /// Recurrence coefficients for a batch of order vectors.
    fn ttr(&self, keys: &[Vec<u32>]) -> Result<Vec<Recurrence>> {
        keys.iter().map(|key| self.get_ttr(key)).collect()
    }

    /// Whether `self` and `other` depend on a common source of randomness.
    fn shares_dependencies(&self, other: &dyn Distribution) -> bool {
        !self.dependencies().is_disjoint(&other.dependencies())
    }
}
