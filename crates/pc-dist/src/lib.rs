//! Symbolic probability distributions for uncertainty quantification.
//!
//! A distribution here is a node in an expression tree: leaves are concrete
//! distributions (`Normal`, `Uniform`, independent `Joint`s), inner nodes are
//! arithmetic operators over a distribution and a constant or another
//! distribution. Every node exposes the same transforms (bounds, CDF, PDF,
//! inverse CDF, raw moments, three-term-recurrence coefficients), so operator
//! nodes compose freely as operands of further operators.
//!
//! Evaluation threads an explicit [`EvalCache`] through the recursion so that
//! a node referenced from several places in one pass is computed exactly once.

pub mod baseclass;
pub mod cache;
pub mod collection;
pub mod math;
pub mod operand;
pub mod operators;

pub use baseclass::{DepId, DistId, DistRef, Distribution};
pub use cache::{EvalCache, EvalKind};
pub use collection::{Joint, Normal, Uniform};
pub use operand::Operand;
pub use operators::{add, Add, Value};
pub use pc_core::{Error, Recurrence, Result};
