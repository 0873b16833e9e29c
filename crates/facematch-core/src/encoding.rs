//! # Face Encodings
//!
//! Fixed-length numeric vectors describing one detected face. The encoding
//! algorithm is external; this crate only defines the vector and the
//! Euclidean distance used by the match rule.

use serde::{Deserialize, Serialize};

/// Numeric vector derived from one detected face in one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceEncoding(Vec<f64>);

impl FaceEncoding {
    /// Wrap a raw vector.
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector has no dimensions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the raw values.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Euclidean (L2) distance to another encoding, or `None` when the two
    /// vectors have different dimensions.
    pub fn euclidean_distance(&self, other: &FaceEncoding) -> Option<f64> {
        if self.0.len() != other.0.len() {
            return None;
        }
        let sum = self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>();
        Some(sum.sqrt())
    }
}

impl From<Vec<f64>> for FaceEncoding {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl AsRef<[f64]> for FaceEncoding {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let e = FaceEncoding::new(vec![0.1, -0.4, 0.25]);
        assert_eq!(e.euclidean_distance(&e), Some(0.0));
    }

    #[test]
    fn distance_is_l2() {
        let a = FaceEncoding::new(vec![0.0, 0.0]);
        let b = FaceEncoding::new(vec![3.0, 4.0]);
        assert!((a.euclidean_distance(&b).unwrap() - 5.0).abs() < 1e-12);
        assert!((b.euclidean_distance(&a).unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_dimensions_have_no_distance() {
        let short = FaceEncoding::new(vec![0.0, 0.0]);
        let long = FaceEncoding::new(vec![0.0, 0.0, 9.0, 9.0]);
        assert_eq!(short.euclidean_distance(&long), None);
        assert_eq!(long.euclidean_distance(&short), None);
    }

    #[test]
    fn serializes_as_plain_array() {
        let e = FaceEncoding::from(vec![1.0, 2.5]);
        assert_eq!(serde_json::to_string(&e).unwrap(), "[1.0,2.5]");
        assert_eq!(e.len(), 2);
        assert!(!e.is_empty());
    }
}
