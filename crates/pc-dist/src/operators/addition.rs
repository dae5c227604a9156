//! Addition operator.
//!
//! `Add` wraps two operands and represents the distribution of their sum.
//! Against a constant shift `c` the transforms reduce to algebraic
//! identities: `cdf(x) = base.cdf(x - c)`, `inv(u) = base.inv(u) + c`, and
//! the raw moments follow the binomial expansion of `E[(X + Y)^k]`. No
//! numerical integration is involved anywhere.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use pc_core::{Error, Recurrence, Result};

use crate::baseclass::{DepId, DistId, DistRef, Distribution};
use crate::cache::EvalCache;
use crate::math::multi_choose;
use crate::operand::Operand;
use crate::operators::operator::{moment_grid, OperandPair, Value};

/// Distribution of the sum of two operands.
///
/// Addition is commutative; the stored order matters only for display.
#[derive(Debug)]
pub struct Add {
    id: DistId,
    ops: OperandPair,
}

impl Add {
    /// Wire an addition node from two operands.
    pub fn new(left: impl Into<Operand>, right: impl Into<Operand>) -> Result<Self> {
        Ok(Self { id: DistId::fresh(), ops: OperandPair::new(left.into(), right.into())? })
    }

    /// Left operand, in display order.
    pub fn left(&self) -> &Operand {
        self.ops.left()
    }

    /// Right operand, in display order.
    pub fn right(&self) -> &Operand {
        self.ops.right()
    }

    /// Fold the node to plain arithmetic when no randomness remains.
    pub fn value(self: &Arc<Self>) -> Value {
        let dim = self.ops.dim();
        match (self.ops.left().constant(dim), self.ops.right().constant(dim)) {
            (Some(left), Some(right)) => Value::Constant(left + right),
            _ => {
                let node: DistRef = self.clone();
                Value::Distribution(node)
            }
        }
    }

    /// The base distribution of a shift-style transform, or an error when
    /// the node holds two constants.
    fn base(&self) -> Result<(&DistRef, &Operand)> {
        let (base, shift) = self.ops.base_and_shift();
        let base = base.as_dist().ok_or_else(|| {
            Error::Validation(format!("{self}: a sum of two constants has no distribution"))
        })?;
        Ok((base, shift))
    }

    fn check_axes(&self, nrows: usize) -> Result<()> {
        if nrows != self.ops.dim() {
            return Err(Error::Validation(format!(
                "{self}: location must have {} rows, got {nrows}",
                self.ops.dim()
            )));
        }
        Ok(())
    }
}

/// Convenience constructor returning a shareable node.
pub fn add(left: impl Into<Operand>, right: impl Into<Operand>) -> Result<Arc<Add>> {
    Ok(Arc::new(Add::new(left, right)?))
}

impl fmt::Display for Add {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Add({}, {})", self.ops.left(), self.ops.right())
    }
}

impl Distribution for Add {
    fn id(&self) -> DistId {
        self.id
    }

    fn dim(&self) -> usize {
        self.ops.dim()
    }

    fn dependencies(&self) -> BTreeSet<DepId> {
        let mut deps = self.ops.left().dependencies();
        deps.extend(self.ops.right().dependencies());
        deps
    }

    fn eval_lower(&self, cache: &mut EvalCache) -> Result<DVector<f64>> {
        let dim = self.ops.dim();
        let left = self.ops.left().lower(dim, cache)?;
        let right = self.ops.right().lower(dim, cache)?;
        Ok(left + right)
    }

    fn eval_upper(&self, cache: &mut EvalCache) -> Result<DVector<f64>> {
        let dim = self.ops.dim();
        let left = self.ops.left().upper(dim, cache)?;
        let right = self.ops.right().upper(dim, cache)?;
        Ok(left + right)
    }

    fn eval_fwd(&self, xloc: &DMatrix<f64>, cache: &mut EvalCache) -> Result<DMatrix<f64>> {
        self.check_axes(xloc.nrows())?;
        let (base, shift) = self.base()?;
        let shift = shift.shift_matrix(self.ops.dim(), xloc.ncols(), cache)?;
        base.get_fwd(&(xloc - shift), cache)
    }

    fn eval_pdf(&self, xloc: &DMatrix<f64>, cache: &mut EvalCache) -> Result<DMatrix<f64>> {
        self.check_axes(xloc.nrows())?;
        let (base, shift) = self.base()?;
        let shift = shift.shift_matrix(self.ops.dim(), xloc.ncols(), cache)?;
        base.get_pdf(&(xloc - shift), cache)
    }

    fn eval_inv(&self, uloc: &DMatrix<f64>, cache: &mut EvalCache) -> Result<DMatrix<f64>> {
        self.check_axes(uloc.nrows())?;
        let (base, shift) = self.base()?;
        let xloc = base.get_inv(uloc, cache)?;
        let shift = shift.shift_matrix(self.ops.dim(), uloc.ncols(), cache)?;
        Ok(xloc + shift)
    }

    /// Binomial-convolution moments:
    /// `E[(X+Y)^k] = sum_{j<=k} C(k,j) E[X^j] E[Y^(k-j)]`,
    /// with the multi-index coefficient `C(k,j) = prod_i C(k_i, j_i)`.
    ///
    /// Valid only for stochastically independent operands; a shared
    /// dependency is rejected instead of silently producing a wrong number.
    fn eval_mom(&self, key: &[u32]) -> Result<f64> {
        let dim = self.ops.dim();
        if key.len() != dim {
            return Err(Error::Validation(format!(
                "{self}: moment key has {} axes, expected {dim}",
                key.len()
            )));
        }
        if let (Some(left), Some(right)) = (self.ops.left().as_dist(), self.ops.right().as_dist())
        {
            if left.shares_dependencies(right.as_ref()) {
                return Err(Error::StochasticallyDependent(format!(
                    "{self}: left and right side of sum stochastically dependent"
                )));
            }
        }

        let grid = moment_grid(key);
        let mut left_moms = Vec::with_capacity(grid.len());
        let mut right_moms = Vec::with_capacity(grid.len());
        for sub in &grid {
            left_moms.push(self.ops.left().moment(sub)?);
            let complement: Vec<u32> = key.iter().zip(sub).map(|(&k, &j)| k - j).collect();
            right_moms.push(self.ops.right().moment(&complement)?);
        }

        let mut out = 0.0;
        for (idx, sub) in grid.iter().enumerate() {
            out += multi_choose(key, sub) * left_moms[idx] * right_moms[idx];
        }
        Ok(out)
    }

    /// A pure shift moves the first recurrence coefficient and leaves the
    /// second alone; only a constant shift is expressible this way.
    fn eval_ttr(&self, key: &[u32]) -> Result<Recurrence> {
        let dim = self.ops.dim();
        if key.len() != dim {
            return Err(Error::Validation(format!(
                "{self}: recurrence key has {} axes, expected {dim}",
                key.len()
            )));
        }
        let (base, shift) = self.base()?;
        let shift = match shift.constant(dim) {
            Some(c) => c,
            None => {
                return Err(Error::NotImplemented(format!(
                    "{self}: recurrence coefficients for a sum of two random operands"
                )));
            }
        };
        let rec = base.get_ttr(key)?;
        Ok(Recurrence::new(rec.alpha + shift, rec.beta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Uniform;
    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, dvector};

    #[test]
    fn test_bounds_shift_both_orders() {
        let ab = add(Operand::dist(Uniform::new(0.0, 1.0).unwrap()), 2.0).unwrap();
        assert_eq!(ab.lower().unwrap(), dvector![2.0]);
        assert_eq!(ab.upper().unwrap(), dvector![3.0]);

        let ba = add(2.0, Operand::dist(Uniform::new(0.0, 1.0).unwrap())).unwrap();
        assert_eq!(ba.lower().unwrap(), dvector![2.0]);
        assert_eq!(ba.upper().unwrap(), dvector![3.0]);
    }

    #[test]
    fn test_pdf_shift() {
        let dist = add(Operand::dist(Uniform::new(0.0, 1.0).unwrap()), 2.0).unwrap();
        let out = dist.pdf(&dmatrix![-2.0, 0.0, 2.5, 4.0]).unwrap();
        assert_eq!(out, dmatrix![0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_value_folds_constants() {
        let dist = add(3.0, 4.0).unwrap();
        match dist.value() {
            Value::Constant(c) => assert_eq!(c, dvector![7.0]),
            Value::Distribution(_) => panic!("two constants must fold"),
        }
    }

    #[test]
    fn test_value_stays_symbolic_with_distribution() {
        let dist = add(Operand::dist(Uniform::new(0.0, 1.0).unwrap()), 4.0).unwrap();
        match dist.value() {
            Value::Constant(_) => panic!("a random operand must stay symbolic"),
            Value::Distribution(node) => assert_eq!(node.id(), dist.id()),
        }
    }

    #[test]
    fn test_two_constant_transforms_fail() {
        let dist = add(3.0, 4.0).unwrap();
        assert!(dist.fwd(&dmatrix![7.0]).is_err());
        assert!(dist.get_ttr(&[1]).is_err());
        // The moment degenerates to plain arithmetic: (3+4)^2.
        assert_relative_eq!(dist.get_mom(&[2]).unwrap(), 49.0);
    }

    #[test]
    fn test_moment_key_dimension_checked() {
        let dist = add(Operand::dist(Uniform::new(0.0, 1.0).unwrap()), 2.0).unwrap();
        assert!(dist.get_mom(&[1, 1]).is_err());
    }

    #[test]
    fn test_display() {
        let dist = add(Operand::dist(Uniform::new(2.0, 3.0).unwrap()), 10.0).unwrap();
        assert_eq!(format!("{dist}"), "Add(Uniform(lower=2, upper=3), 10)");
    }
}
