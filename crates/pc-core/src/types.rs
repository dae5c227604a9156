//! Common value types for polychaos

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Three-term-recurrence coefficients of an orthogonal polynomial family,
/// one entry per axis of the distribution.
///
/// For a distribution with weight function `w`, the monic orthogonal
/// polynomials satisfy `P_{k+1}(x) = (x - alpha_k) P_k(x) - beta_k P_{k-1}(x)`.
/// `alpha` tracks location (a pure shift of the distribution moves it by the
/// same amount), `beta` tracks spread and is shift-invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recurrence {
    /// First recurrence coefficient per axis (location-like).
    pub alpha: DVector<f64>,
    /// Second recurrence coefficient per axis (spread-like).
    pub beta: DVector<f64>,
}

impl Recurrence {
    /// Create a coefficient pair. The two vectors must have equal length.
    pub fn new(alpha: DVector<f64>, beta: DVector<f64>) -> Self {
        debug_assert_eq!(alpha.len(), beta.len());
        Self { alpha, beta }
    }

    /// Number of axes covered by these coefficients.
    pub fn dim(&self) -> usize {
        self.alpha.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    #[test]
    fn test_recurrence_dim() {
        let rec = Recurrence::new(dvector![0.5, 2.5], dvector![0.0, 1.0]);
        assert_eq!(rec.dim(), 2);
    }

    #[test]
    fn test_recurrence_serde_roundtrip() {
        let rec = Recurrence::new(dvector![10.0], dvector![3.0]);
        let json = serde_json::to_string(&rec).unwrap();
        let back: Recurrence = serde_json::from_str(&json).unwrap();
        assert_eq!(rec, back);
    }
}
