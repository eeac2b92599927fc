//! Built-in models.

use std::sync::Arc;

use crate::item::Item;
use crate::matrix::DistanceMatrix;
use crate::model::{DistanceModel, ModelError};

/// Distance = 100 − percent identity over aligned columns.
///
/// Columns where either residue is a gap (`-`, `.` or space) are skipped;
/// residues compare case-insensitively. Pairs sharing no scored column are
/// placed at distance 100.
#[derive(Debug, Default, Clone, Copy)]
pub struct PercentIdentity;

impl PercentIdentity {
    /// Percent identity of two aligned residue strings.
    pub fn identity(a: &[u8], b: &[u8]) -> Option<f64> {
        let mut compared = 0usize;
        let mut identical = 0usize;
        for (&x, &y) in a.iter().zip(b) {
            if is_gap(x) || is_gap(y) {
                continue;
            }
            compared += 1;
            if x.eq_ignore_ascii_case(&y) {
                identical += 1;
            }
        }
        (compared > 0).then(|| 100.0 * identical as f64 / compared as f64)
    }
}

impl DistanceModel for PercentIdentity {
    fn name(&self) -> &'static str {
        "percent_identity"
    }

    fn description(&self) -> &'static str {
        "100 minus percent identity over aligned, ungapped columns."
    }

    fn compute_distances(&self, items: &[Arc<Item>]) -> Result<DistanceMatrix, ModelError> {
        if let Some(item) = items.iter().find(|item| item.has_placeholder_content()) {
            return Err(ModelError::Rejected {
                model: self.name().to_string(),
                reason: format!("item '{}' is a placeholder", item.name()),
            });
        }
        let matrix = DistanceMatrix::from_fn(items.len(), |i, j| {
            Self::identity(items[i].residues(), items[j].residues())
                .map_or(100.0, |pid| 100.0 - pid)
        })?;
        Ok(matrix)
    }
}

fn is_gap(residue: u8) -> bool {
    matches!(residue, b'-' | b'.' | b' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, residues: &str) -> Arc<Item> {
        Arc::new(Item::new(name, residues.as_bytes().to_vec()))
    }

    #[test]
    fn identity_skips_gaps() {
        assert_eq!(PercentIdentity::identity(b"ACGT", b"ACGA"), Some(75.0));
        assert_eq!(PercentIdentity::identity(b"AC-T", b"acGT"), Some(100.0));
        assert_eq!(PercentIdentity::identity(b"----", b"ACGT"), None);
    }

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal() {
        let items = vec![item("a", "ACGT"), item("b", "ACGA"), item("c", "----")];
        let matrix = PercentIdentity.compute_distances(&items).unwrap();
        assert_eq!(matrix.get(0, 1), 25.0);
        assert_eq!(matrix.get(1, 0), 25.0);
        assert_eq!(matrix.get(0, 2), 100.0);
        assert_eq!(matrix.get(2, 2), 0.0);
    }

    #[test]
    fn rejects_placeholders() {
        let items = vec![item("a", "ACGT"), Arc::new(Item::placeholder("ghost"))];
        assert!(matches!(
            PercentIdentity.compute_distances(&items),
            Err(ModelError::Rejected { .. })
        ));
    }
}
