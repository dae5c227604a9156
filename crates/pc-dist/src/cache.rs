//! Per-pass evaluation cache.
//!
//! One cache instance lives for exactly one call into an operator tree: the
//! caller creates it, every recursive `get_*` threads it by reference, and it
//! is discarded when the call returns. Within one instance a given
//! (node, evaluation-kind) pair is computed at most once, which is what makes
//! DAG-shaped trees (the same node reachable from both operands) evaluate
//! each node a single time.

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};

use crate::baseclass::DistId;

/// Which transform an evaluation record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvalKind {
    /// CDF evaluation; input and x-space value coincide.
    Forward,
    /// PDF evaluation; input and x-space value coincide.
    Density,
    /// Inverse-CDF evaluation; the output is the x-space value.
    Inverse,
}

/// Memoization context for a single evaluation pass.
#[derive(Debug, Default)]
pub struct EvalCache {
    lower: HashMap<DistId, DVector<f64>>,
    upper: HashMap<DistId, DVector<f64>>,
    results: HashMap<(DistId, EvalKind), DMatrix<f64>>,
    x_values: HashMap<DistId, DMatrix<f64>>,
}

impl EvalCache {
    /// Create an empty cache for one evaluation pass.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lower(&self, id: DistId) -> Option<&DVector<f64>> {
        self.lower.get(&id)
    }

    pub(crate) fn store_lower(&mut self, id: DistId, value: DVector<f64>) {
        self.lower.insert(id, value);
    }

    pub(crate) fn upper(&self, id: DistId) -> Option<&DVector<f64>> {
        self.upper.get(&id)
    }

    pub(crate) fn store_upper(&mut self, id: DistId, value: DVector<f64>) {
        self.upper.insert(id, value);
    }

    /// Previously computed result for `(id, kind)`, if any.
    pub(crate) fn eval_result(&self, id: DistId, kind: EvalKind) -> Option<&DMatrix<f64>> {
        self.results.get(&(id, kind))
    }

    /// Record an evaluation result and, for the first record of a node, bind
    /// its x-space value for the rest of the pass.
    pub(crate) fn record_eval(
        &mut self,
        id: DistId,
        kind: EvalKind,
        input: &DMatrix<f64>,
        output: &DMatrix<f64>,
    ) {
        let x_value = match kind {
            EvalKind::Forward | EvalKind::Density => input,
            EvalKind::Inverse => output,
        };
        self.x_values.entry(id).or_insert_with(|| x_value.clone());
        self.results.insert((id, kind), output.clone());
    }

    /// The x-space value a node resolved to earlier in this pass, if any.
    ///
    /// Operator nodes use this to treat an already-evaluated distribution
    /// operand as a deterministic quantity.
    pub fn x_value(&self, id: DistId) -> Option<&DMatrix<f64>> {
        self.x_values.get(&id)
    }

    /// Number of evaluation results recorded in this pass.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether this pass has recorded no evaluations yet.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
