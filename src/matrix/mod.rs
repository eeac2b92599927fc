//! Symmetric pairwise distance matrix
//!
//! Dense N×N storage in row-major order. The clustering engine takes the
//! matrix by value and rewrites rows in place as clusters merge; the matrix
//! never shrinks, merged slots are simply no longer consulted.
//!
//! Row-based constructors ignore the diagonal and store it as zero; a
//! matrix edited through [`DistanceMatrix::set`] must keep it at zero.

use thiserror::Error;

/// Default relative tolerance used when checking `d[i][j] == d[j][i]`.
pub const DEFAULT_SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Reasons an input matrix (or algorithm selector) is rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    /// At least one item is required to build a tree.
    #[error("at least one item is required")]
    NoItems,

    /// Matrix dimension does not match the number of items.
    #[error("matrix is {size}x{size} but {items} items were supplied")]
    DimensionMismatch {
        /// Matrix dimension.
        size: usize,
        /// Number of items.
        items: usize,
    },

    /// A row has the wrong number of columns.
    #[error("row {row} has {len} columns, expected {expected}")]
    RaggedRow {
        /// Offending row.
        row: usize,
        /// Columns found.
        len: usize,
        /// Columns expected.
        expected: usize,
    },

    /// `d[i][j]` and `d[j][i]` disagree.
    #[error("matrix is not symmetric at ({i}, {j}): {forward} vs {backward}")]
    Asymmetric {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
        /// Value of `d[i][j]`.
        forward: f64,
        /// Value of `d[j][i]`.
        backward: f64,
    },

    /// A negative distance was supplied.
    #[error("negative distance {value} at ({i}, {j})")]
    NegativeDistance {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
        /// Offending value.
        value: f64,
    },

    /// A NaN or infinite distance was supplied.
    #[error("non-finite distance at ({i}, {j})")]
    NonFiniteDistance {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
    },

    /// A diagonal entry is not zero.
    #[error("diagonal entry {index} is {value}, expected 0")]
    NonZeroDiagonal {
        /// Row (and column) index.
        index: usize,
        /// Offending value.
        value: f64,
    },

    /// Algorithm selector not recognised.
    #[error("unknown clustering algorithm '{0}'")]
    UnknownAlgorithm(String),
}

/// Square, symmetric matrix of non-negative distances.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// All-zero matrix over `size` items.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size],
        }
    }

    /// Build from nested rows, validating shape, sign and symmetry.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, InputError> {
        Self::from_rows_with_tolerance(rows, DEFAULT_SYMMETRY_TOLERANCE)
    }

    /// Build from nested rows with an explicit relative symmetry tolerance.
    pub fn from_rows_with_tolerance(
        rows: Vec<Vec<f64>>,
        tolerance: f64,
    ) -> Result<Self, InputError> {
        let size = rows.len();
        let mut values = Vec::with_capacity(size * size);
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != size {
                return Err(InputError::RaggedRow {
                    row,
                    len: cells.len(),
                    expected: size,
                });
            }
            values.extend(cells);
        }

        let mut matrix = Self { size, values };
        matrix.zero_diagonal();
        matrix.validate(tolerance)?;
        Ok(matrix)
    }

    /// Build from a pairwise function evaluated on the upper triangle and
    /// mirrored into the lower one.
    pub fn from_fn<F>(size: usize, mut distance: F) -> Result<Self, InputError>
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut matrix = Self::zeros(size);
        for i in 0..size {
            for j in (i + 1)..size {
                let value = distance(i, j);
                check_entry(i, j, value)?;
                matrix.set(i, j, value);
            }
        }
        Ok(matrix)
    }

    /// Number of items (rows).
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the matrix covers no items.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Distance between `i` and `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    /// Set `d[i][j]` and `d[j][i]`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.size + j] = value;
        self.values[j * self.size + i] = value;
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    /// Reject matrices whose dimension differs from the item count.
    pub fn ensure_size(&self, items: usize) -> Result<(), InputError> {
        if items == 0 {
            return Err(InputError::NoItems);
        }
        if self.size != items {
            return Err(InputError::DimensionMismatch {
                size: self.size,
                items,
            });
        }
        Ok(())
    }

    /// Check the diagonal is exactly zero and off-diagonal entries are
    /// finite, non-negative and symmetric within `tolerance` (relative to
    /// the larger magnitude, floored at 1).
    pub fn validate(&self, tolerance: f64) -> Result<(), InputError> {
        for i in 0..self.size {
            let value = self.get(i, i);
            if !value.is_finite() {
                return Err(InputError::NonFiniteDistance { i, j: i });
            }
            if value != 0.0 {
                return Err(InputError::NonZeroDiagonal { index: i, value });
            }
        }
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                let forward = self.get(i, j);
                let backward = self.get(j, i);
                check_entry(i, j, forward)?;
                check_entry(j, i, backward)?;

                let scale = forward.abs().max(backward.abs()).max(1.0);
                if (forward - backward).abs() > tolerance * scale {
                    return Err(InputError::Asymmetric {
                        i,
                        j,
                        forward,
                        backward,
                    });
                }
            }
        }
        Ok(())
    }

    fn zero_diagonal(&mut self) {
        for i in 0..self.size {
            self.values[i * self.size + i] = 0.0;
        }
    }
}

fn check_entry(i: usize, j: usize, value: f64) -> Result<(), InputError> {
    if !value.is_finite() {
        return Err(InputError::NonFiniteDistance { i, j });
    }
    if value < 0.0 {
        return Err(InputError::NegativeDistance { i, j, value });
    }
    Ok(())
}
