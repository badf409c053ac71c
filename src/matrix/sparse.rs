use std::collections::BTreeSet;

use crate::errors::MatrixError;

/// Immutable boolean sparse matrix in compressed sparse-row form.
///
/// Only the positions of nonzero cells are stored: `indptr[r]..indptr[r+1]`
/// delimits the column indices of row `r` inside `indices`, and the column
/// indices of every row are sorted and duplicate-free. Two matrices are equal
/// exactly when they have the same shape and the same nonzero cells, so the
/// derived `PartialEq` is the set equality the algorithms rely on.
///
/// CSR is the arithmetic form (multiply, add, Kronecker, nonzero scans).
/// Incremental builds go through [`RowMatrix`] and convert; the conversion
/// preserves the set of nonzero cells in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrMatrix {
    rows: usize,
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
}

impl CsrMatrix {
    /// The zero matrix of the given shape.
    #[must_use]
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            indptr: vec![0; rows + 1],
            indices: Vec::new(),
        }
    }

    /// The identity matrix of order `n`.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        Self {
            rows: n,
            cols: n,
            indptr: (0..=n).collect(),
            indices: (0..n).collect(),
        }
    }

    /// Builds a matrix from `(row, col)` entries. Duplicates collapse to a
    /// single nonzero cell. Entries must lie inside the shape.
    #[must_use]
    pub fn from_entries<I>(rows: usize, cols: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut cells: Vec<(usize, usize)> = entries.into_iter().collect();
        cells.sort_unstable();
        cells.dedup();

        let mut indptr = vec![0; rows + 1];
        let mut indices = Vec::with_capacity(cells.len());
        for (r, c) in cells {
            debug_assert!(r < rows && c < cols, "entry ({r}, {c}) outside {rows}x{cols}");
            indptr[r + 1] += 1;
            indices.push(c);
        }
        for r in 0..rows {
            indptr[r + 1] += indptr[r];
        }
        Self {
            rows,
            cols,
            indptr,
            indices,
        }
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of nonzero cells.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Sorted column indices of row `r`.
    #[must_use]
    pub fn row(&self, r: usize) -> &[usize] {
        &self.indices[self.indptr[r]..self.indptr[r + 1]]
    }

    /// Whether cell `(r, c)` is nonzero.
    #[must_use]
    pub fn get(&self, r: usize, c: usize) -> bool {
        self.row(r).binary_search(&c).is_ok()
    }

    /// Lazy scan over nonzero `(row, col)` cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows).flat_map(move |r| self.row(r).iter().map(move |&c| (r, c)))
    }

    /// Boolean sum: the union of nonzero cells. Shapes must match.
    pub fn add(&self, other: &Self) -> Result<Self, MatrixError> {
        if self.shape() != other.shape() {
            return Err(MatrixError::ShapeMismatch {
                op: "add",
                lhs: self.shape(),
                rhs: other.shape(),
            });
        }

        let mut indptr = Vec::with_capacity(self.rows + 1);
        indptr.push(0);
        let mut indices = Vec::with_capacity(self.nnz() + other.nnz());
        for r in 0..self.rows {
            merge_union(self.row(r), other.row(r), &mut indices);
            indptr.push(indices.len());
        }
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            indptr,
            indices,
        })
    }

    /// Cell-wise difference: nonzero cells of `self` that are zero in
    /// `other`. Shapes must match.
    pub fn difference(&self, other: &Self) -> Result<Self, MatrixError> {
        if self.shape() != other.shape() {
            return Err(MatrixError::ShapeMismatch {
                op: "difference",
                lhs: self.shape(),
                rhs: other.shape(),
            });
        }

        let mut indptr = Vec::with_capacity(self.rows + 1);
        indptr.push(0);
        let mut indices = Vec::with_capacity(self.nnz());
        for r in 0..self.rows {
            let mask: &[usize] = other.row(r);
            indices.extend(
                self.row(r)
                    .iter()
                    .copied()
                    .filter(|c| mask.binary_search(c).is_err()),
            );
            indptr.push(indices.len());
        }
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            indptr,
            indices,
        })
    }

    /// Matrix product over the boolean semiring. The inner dimensions must
    /// agree; the result has shape `(self.rows, other.cols)`.
    pub fn mul(&self, other: &Self) -> Result<Self, MatrixError> {
        if self.cols != other.rows {
            return Err(MatrixError::ShapeMismatch {
                op: "mul",
                lhs: self.shape(),
                rhs: other.shape(),
            });
        }

        let mut indptr = Vec::with_capacity(self.rows + 1);
        indptr.push(0);
        let mut indices = Vec::new();
        // One dense marker row is reused across all output rows.
        let mut marker = vec![false; other.cols];
        let mut touched = Vec::new();
        for r in 0..self.rows {
            for &k in self.row(r) {
                for &c in other.row(k) {
                    if !marker[c] {
                        marker[c] = true;
                        touched.push(c);
                    }
                }
            }
            touched.sort_unstable();
            indices.extend_from_slice(&touched);
            indptr.push(indices.len());
            for &c in &touched {
                marker[c] = false;
            }
            touched.clear();
        }
        Ok(Self {
            rows: self.rows,
            cols: other.cols,
            indptr,
            indices,
        })
    }

    /// Kronecker product. Cell `(i·r_N + p, j·c_N + q)` of the result is
    /// nonzero iff `self[i, j]` and `other[p, q]` both are; the result has
    /// shape `(r_M·r_N, c_M·c_N)`.
    #[must_use]
    pub fn kron(&self, other: &Self) -> Self {
        let rows = self.rows * other.rows;
        let cols = self.cols * other.cols;
        let mut indptr = Vec::with_capacity(rows + 1);
        indptr.push(0);
        let mut indices = Vec::with_capacity(self.nnz() * other.nnz());
        for i in 0..self.rows {
            let outer = self.row(i);
            for p in 0..other.rows {
                // Outer columns ascend and inner columns ascend, so the
                // combined row stays sorted without an extra pass.
                for &j in outer {
                    for &q in other.row(p) {
                        indices.push(j * other.cols + q);
                    }
                }
                indptr.push(indices.len());
            }
        }
        Self {
            rows,
            cols,
            indptr,
            indices,
        }
    }

    /// Horizontal concatenation `[self | other]`. Row counts must match.
    pub fn hstack(&self, other: &Self) -> Result<Self, MatrixError> {
        if self.rows != other.rows {
            return Err(MatrixError::ShapeMismatch {
                op: "hstack",
                lhs: self.shape(),
                rhs: other.shape(),
            });
        }

        let mut indptr = Vec::with_capacity(self.rows + 1);
        indptr.push(0);
        let mut indices = Vec::with_capacity(self.nnz() + other.nnz());
        for r in 0..self.rows {
            indices.extend_from_slice(self.row(r));
            indices.extend(other.row(r).iter().map(|&c| c + self.cols));
            indptr.push(indices.len());
        }
        Ok(Self {
            rows: self.rows,
            cols: self.cols + other.cols,
            indptr,
            indices,
        })
    }

    /// Splits the matrix into columns `0..at` and `at..cols`.
    #[must_use]
    pub fn split_cols(&self, at: usize) -> (Self, Self) {
        debug_assert!(at <= self.cols);
        let mut left = RowMatrix::new(self.rows, at);
        let mut right = RowMatrix::new(self.rows, self.cols - at);
        for (r, c) in self.iter() {
            if c < at {
                left.insert(r, c);
            } else {
                right.insert(r, c - at);
            }
        }
        (left.to_csr(), right.to_csr())
    }

    /// Converts into the row-mutable form, preserving all nonzero cells.
    #[must_use]
    pub fn to_rows(&self) -> RowMatrix {
        let mut out = RowMatrix::new(self.rows, self.cols);
        for (r, c) in self.iter() {
            out.insert(r, c);
        }
        out
    }
}

fn merge_union(a: &[usize], b: &[usize], out: &mut Vec<usize>) {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
}

/// Row-mutable boolean sparse matrix for incremental builds.
///
/// Each row is an ordered set of column indices, so single-cell inserts and
/// whole-row unions are cheap while arithmetic stays with [`CsrMatrix`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMatrix {
    cols: usize,
    rows: Vec<BTreeSet<usize>>,
}

impl RowMatrix {
    /// The zero matrix of the given shape.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            rows: vec![BTreeSet::new(); rows],
        }
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.cols)
    }

    /// Sets cell `(r, c)`; returns whether the cell was previously zero.
    pub fn insert(&mut self, r: usize, c: usize) -> bool {
        debug_assert!(c < self.cols, "column {c} outside width {}", self.cols);
        self.rows[r].insert(c)
    }

    #[must_use]
    pub fn contains(&self, r: usize, c: usize) -> bool {
        self.rows[r].contains(&c)
    }

    /// ORs the given column indices into row `r`.
    pub fn union_row<I>(&mut self, r: usize, cols: I)
    where
        I: IntoIterator<Item = usize>,
    {
        self.rows[r].extend(cols);
    }

    /// ORs every nonzero cell of `other` into `self`. Shapes must match.
    pub fn union(&mut self, other: &Self) -> Result<(), MatrixError> {
        if self.shape() != other.shape() {
            return Err(MatrixError::ShapeMismatch {
                op: "union",
                lhs: self.shape(),
                rhs: other.shape(),
            });
        }
        for (dst, src) in self.rows.iter_mut().zip(&other.rows) {
            dst.extend(src.iter().copied());
        }
        Ok(())
    }

    /// Removes from `self` every cell that is nonzero in `other`.
    pub fn subtract(&mut self, other: &Self) -> Result<(), MatrixError> {
        if self.shape() != other.shape() {
            return Err(MatrixError::ShapeMismatch {
                op: "subtract",
                lhs: self.shape(),
                rhs: other.shape(),
            });
        }
        for (dst, src) in self.rows.iter_mut().zip(&other.rows) {
            for c in src {
                dst.remove(c);
            }
        }
        Ok(())
    }

    /// Number of nonzero cells.
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(BTreeSet::len).sum()
    }

    /// Sorted column indices of row `r`.
    pub fn row(&self, r: usize) -> impl Iterator<Item = usize> + '_ {
        self.rows[r].iter().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, cols)| cols.iter().map(move |&c| (r, c)))
    }

    /// Converts into CSR, preserving all nonzero cells.
    #[must_use]
    pub fn to_csr(&self) -> CsrMatrix {
        let mut indptr = Vec::with_capacity(self.rows.len() + 1);
        indptr.push(0);
        let mut indices = Vec::with_capacity(self.nnz());
        for cols in &self.rows {
            indices.extend(cols.iter().copied());
            indptr.push(indices.len());
        }
        CsrMatrix {
            rows: self.rows.len(),
            cols: self.cols,
            indptr,
            indices,
        }
    }
}
