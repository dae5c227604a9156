//! Shared wiring for binary operator nodes.

use nalgebra::DVector;
use pc_core::{Error, Result};

use crate::baseclass::{DistRef, Distribution};
use crate::operand::Operand;

/// The operand pair of a binary operator, with dimensionality bookkeeping.
///
/// The dimensionality is inherited from the operand with the larger one.
/// Distribution operands must match it exactly; constants must have length 1
/// (broadcast) or the full dimensionality.
#[derive(Debug, Clone)]
pub struct OperandPair {
    left: Operand,
    right: Operand,
    dim: usize,
}

impl OperandPair {
    /// Validate and wire an operand pair.
    pub fn new(left: Operand, right: Operand) -> Result<Self> {
        let dim = left.dim().max(right.dim());
        for (side, op) in [("left", &left), ("right", &right)] {
            match op {
                Operand::Dist(d) if d.dim() != dim => {
                    return Err(Error::Validation(format!(
                        "{side} operand '{d}' has {} axes, expected {dim}",
                        d.dim()
                    )));
                }
                Operand::Const(c) if c.len() != 1 && c.len() != dim => {
                    return Err(Error::Validation(format!(
                        "{side} constant has {} axes, expected 1 or {dim}",
                        c.len()
                    )));
                }
                _ => {}
            }
        }
        Ok(Self { left, right, dim })
    }

    /// Left operand, in display order.
    pub fn left(&self) -> &Operand {
        &self.left
    }

    /// Right operand, in display order.
    pub fn right(&self) -> &Operand {
        &self.right
    }

    /// Dimensionality of the operator node.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The swap convention shared by the shift-style transforms: whenever the
    /// right operand is a distribution it becomes the base and the left
    /// operand becomes the shift; otherwise the pair is used as stored.
    ///
    /// When both operands are distributions the shift side must resolve
    /// through the evaluation cache; see `Operand::shift_matrix`.
    pub fn base_and_shift(&self) -> (&Operand, &Operand) {
        if self.right.is_dist() {
            (&self.right, &self.left)
        } else {
            (&self.left, &self.right)
        }
    }
}

/// Result of value folding an operator node.
#[derive(Debug, Clone)]
pub enum Value {
    /// Both operands were constants; the node collapses to plain arithmetic.
    Constant(DVector<f64>),
    /// At least one operand is random; the node stays symbolic.
    Distribution(DistRef),
}

/// All multi-indices `j` with `0 <= j_i <= key_i`, as a dense grid.
///
/// The grid has `prod(key_i + 1)` entries, exponential in the number of axes
/// for high-order requests; this mirrors the mathematical definition of the
/// multi-index binomial expansion and is not optimized further.
pub(crate) fn moment_grid(key: &[u32]) -> Vec<Vec<u32>> {
    let mut grid: Vec<Vec<u32>> = vec![Vec::with_capacity(key.len())];
    for &k in key {
        grid = grid
            .into_iter()
            .flat_map(|prefix| {
                (0..=k).map(move |j| {
                    let mut next = prefix.clone();
                    next.push(j);
                    next
                })
            })
            .collect();
    }
    grid
}
