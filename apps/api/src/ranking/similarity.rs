//! Cosine similarity of each resume row against the job description row.

use crate::ranking::vectorizer::{SparseRow, TermVectorSpace};

/// One similarity per candidate row, in row order. The reference row is never
/// scored against itself.
pub fn score(space: &TermVectorSpace) -> Vec<f64> {
    let reference = space.reference();
    space
        .candidates()
        .iter()
        .map(|row| cosine(row, reference))
        .collect()
}

/// Cosine of two sparse rows, clamped to `[0, 1]`. A zero vector on either
/// side yields 0.
pub fn cosine(a: &SparseRow, b: &SparseRow) -> f64 {
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot(a, b) / (norm_a * norm_b)).clamp(0.0, 1.0)
}

fn norm(row: &SparseRow) -> f64 {
    row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
}

/// Merge-join over column-sorted rows.
fn dot(a: &SparseRow, b: &SparseRow) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        let (col_a, w_a) = a[i];
        let (col_b, w_b) = b[j];
        match col_a.cmp(&col_b) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += w_a * w_b;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}
