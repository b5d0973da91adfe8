//! Helpers over rectangular row-major matrices.
//!
//! Every function validates its input, never mutates it, and returns a freshly
//! allocated result. A matrix is a slice of equally long rows; an empty slice is
//! a valid `0 x 0` matrix.
use std::ops::Range;

use crate::error::{PlotError, Result};

/// Row-major matrix of samples.
pub type Matrix = Vec<Vec<f64>>;

/// Return `(rows, columns)` or fail if the rows are jagged.
pub fn shape(m: &[Vec<f64>]) -> Result<(usize, usize)> {
    let cols = m.first().map_or(0, Vec::len);
    if let Some((i, row)) = m.iter().enumerate().find(|(_, row)| row.len() != cols) {
        return Err(PlotError::dimension(format!(
            "row {i} has {} columns, expected {cols}",
            row.len()
        )));
    }
    Ok((m.len(), cols))
}

/// Validated deep copy.
pub fn copy(m: &[Vec<f64>]) -> Result<Matrix> {
    shape(m)?;
    Ok(m.to_vec())
}

pub fn column(m: &[Vec<f64>], j: usize) -> Result<Vec<f64>> {
    let (_, cols) = shape(m)?;
    check_index(j, cols, "column")?;
    Ok(m.iter().map(|row| row[j]).collect())
}

pub fn transpose(m: &[Vec<f64>]) -> Result<Matrix> {
    let (rows, cols) = shape(m)?;
    Ok((0..cols)
        .map(|j| (0..rows).map(|i| m[i][j]).collect())
        .collect())
}

// ---- copies ----

/// Rows `range.start..range.end`.
pub fn row_range(m: &[Vec<f64>], range: Range<usize>) -> Result<Matrix> {
    let (rows, _) = shape(m)?;
    check_range(&range, rows, "row")?;
    Ok(m[range].to_vec())
}

/// Columns `range.start..range.end` of every row.
pub fn column_range(m: &[Vec<f64>], range: Range<usize>) -> Result<Matrix> {
    let (_, cols) = shape(m)?;
    check_range(&range, cols, "column")?;
    Ok(m.iter().map(|row| row[range.clone()].to_vec()).collect())
}

/// Rows at the given indices, in the given order. Indices may repeat.
pub fn select_rows(m: &[Vec<f64>], indices: &[usize]) -> Result<Matrix> {
    let (rows, _) = shape(m)?;
    for &i in indices {
        check_index(i, rows, "row")?;
    }
    Ok(indices.iter().map(|&i| m[i].clone()).collect())
}

/// Columns at the given indices, in the given order. Indices may repeat.
pub fn select_columns(m: &[Vec<f64>], indices: &[usize]) -> Result<Matrix> {
    let (_, cols) = shape(m)?;
    for &j in indices {
        check_index(j, cols, "column")?;
    }
    Ok(m.iter()
        .map(|row| indices.iter().map(|&j| row[j]).collect())
        .collect())
}

// ---- insertion ----

/// Insert `block` so that its first row ends up at index `at`.
pub fn insert_rows(m: &[Vec<f64>], at: usize, block: &[Vec<f64>]) -> Result<Matrix> {
    let (rows, cols) = shape(m)?;
    let (_, block_cols) = shape(block)?;
    if at > rows {
        return Err(PlotError::index(format!(
            "row insertion index {at} out of range 0..={rows}"
        )));
    }
    if rows > 0 && !block.is_empty() && block_cols != cols {
        return Err(PlotError::dimension(format!(
            "inserted rows have {block_cols} columns, matrix has {cols}"
        )));
    }
    let mut out = Vec::with_capacity(rows + block.len());
    out.extend_from_slice(&m[..at]);
    out.extend_from_slice(block);
    out.extend_from_slice(&m[at..]);
    Ok(out)
}

pub fn insert_row(m: &[Vec<f64>], at: usize, row: &[f64]) -> Result<Matrix> {
    insert_rows(m, at, &[row.to_vec()])
}

/// Insert the columns of `block` so that its first column ends up at index `at`.
pub fn insert_columns(m: &[Vec<f64>], at: usize, block: &[Vec<f64>]) -> Result<Matrix> {
    let (rows, cols) = shape(m)?;
    let (block_rows, _) = shape(block)?;
    if at > cols {
        return Err(PlotError::index(format!(
            "column insertion index {at} out of range 0..={cols}"
        )));
    }
    if block_rows != rows {
        return Err(PlotError::dimension(format!(
            "inserted columns have {block_rows} rows, matrix has {rows}"
        )));
    }
    Ok(m.iter()
        .zip(block)
        .map(|(row, ins)| {
            let mut r = Vec::with_capacity(row.len() + ins.len());
            r.extend_from_slice(&row[..at]);
            r.extend_from_slice(ins);
            r.extend_from_slice(&row[at..]);
            r
        })
        .collect())
}

pub fn insert_column(m: &[Vec<f64>], at: usize, values: &[f64]) -> Result<Matrix> {
    let block: Matrix = values.iter().map(|&v| vec![v]).collect();
    insert_columns(m, at, &block)
}

// ---- deletion ----

pub fn delete_row_range(m: &[Vec<f64>], range: Range<usize>) -> Result<Matrix> {
    let (rows, _) = shape(m)?;
    check_range(&range, rows, "row")?;
    let mut out = m[..range.start].to_vec();
    out.extend_from_slice(&m[range.end..]);
    Ok(out)
}

pub fn delete_column_range(m: &[Vec<f64>], range: Range<usize>) -> Result<Matrix> {
    let (_, cols) = shape(m)?;
    check_range(&range, cols, "column")?;
    Ok(m.iter()
        .map(|row| {
            let mut r = row[..range.start].to_vec();
            r.extend_from_slice(&row[range.end..]);
            r
        })
        .collect())
}

pub fn delete_row(m: &[Vec<f64>], i: usize) -> Result<Matrix> {
    delete_rows(m, &[i])
}

pub fn delete_column(m: &[Vec<f64>], j: usize) -> Result<Matrix> {
    delete_columns(m, &[j])
}

/// Remove the rows at `indices`, which must be strictly ascending.
pub fn delete_rows(m: &[Vec<f64>], indices: &[usize]) -> Result<Matrix> {
    let (rows, _) = shape(m)?;
    check_ascending(indices, rows, "row")?;
    Ok(m.iter()
        .enumerate()
        .filter(|(i, _)| indices.binary_search(i).is_err())
        .map(|(_, row)| row.clone())
        .collect())
}

/// Remove the columns at `indices`, which must be strictly ascending.
pub fn delete_columns(m: &[Vec<f64>], indices: &[usize]) -> Result<Matrix> {
    let (_, cols) = shape(m)?;
    check_ascending(indices, cols, "column")?;
    Ok(m.iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|(j, _)| indices.binary_search(j).is_err())
                .map(|(_, &v)| v)
                .collect()
        })
        .collect())
}

// ---- concatenation ----

/// Stack matrices vertically. Empty matrices are skipped.
pub fn concat_rows(parts: &[&[Vec<f64>]]) -> Result<Matrix> {
    let mut cols = None;
    for part in parts {
        let (rows, c) = shape(part)?;
        if rows == 0 {
            continue;
        }
        match cols {
            None => cols = Some(c),
            Some(expected) if expected != c => {
                return Err(PlotError::dimension(format!(
                    "cannot stack a {c}-column matrix under a {expected}-column matrix"
                )));
            }
            Some(_) => {}
        }
    }
    Ok(parts.iter().flat_map(|p| p.iter().cloned()).collect())
}

/// Place matrices side by side. All parts must have the same row count.
pub fn concat_columns(parts: &[&[Vec<f64>]]) -> Result<Matrix> {
    let Some(first) = parts.first() else {
        return Ok(Vec::new());
    };
    let (rows, _) = shape(first)?;
    for part in &parts[1..] {
        let (r, _) = shape(part)?;
        if r != rows {
            return Err(PlotError::dimension(format!(
                "cannot join a {r}-row matrix beside a {rows}-row matrix"
            )));
        }
    }
    Ok((0..rows)
        .map(|i| parts.iter().flat_map(|p| p[i].iter().copied()).collect())
        .collect())
}

/// Append `values[i] / total` as a new last column.
///
/// Used to attach normalised weights (densities, frequencies) to a set of
/// coordinate vectors.
pub fn append_normalized(m: &[Vec<f64>], values: &[f64], total: f64) -> Result<Matrix> {
    if total == 0.0 || !total.is_finite() {
        return Err(PlotError::dimension(format!(
            "cannot normalise by a total of {total}"
        )));
    }
    let scaled: Vec<f64> = values.iter().map(|v| v / total).collect();
    let (_, cols) = shape(m)?;
    insert_column(m, cols, &scaled)
}

// ---- reductions ----

/// Smallest non-NaN value of a vector and its index.
pub fn vector_argmin(v: &[f64]) -> Option<(usize, f64)> {
    v.iter()
        .copied()
        .enumerate()
        .filter(|(_, x)| !x.is_nan())
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Largest non-NaN value of a vector and its index.
pub fn vector_argmax(v: &[f64]) -> Option<(usize, f64)> {
    v.iter()
        .copied()
        .enumerate()
        .filter(|(_, x)| !x.is_nan())
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

/// Per-column minimum.
pub fn column_min(m: &[Vec<f64>]) -> Result<Vec<f64>> {
    Ok(column_argmin(m)?.into_iter().map(|(_, v)| v).collect())
}

/// Per-column maximum.
pub fn column_max(m: &[Vec<f64>]) -> Result<Vec<f64>> {
    Ok(column_argmax(m)?.into_iter().map(|(_, v)| v).collect())
}

/// Per-column `(row, value)` of the minimum.
pub fn column_argmin(m: &[Vec<f64>]) -> Result<Vec<(usize, f64)>> {
    reduce_columns(m, vector_argmin)
}

/// Per-column `(row, value)` of the maximum.
pub fn column_argmax(m: &[Vec<f64>]) -> Result<Vec<(usize, f64)>> {
    reduce_columns(m, vector_argmax)
}

/// Smallest value over the whole matrix.
pub fn min(m: &[Vec<f64>]) -> Result<f64> {
    argmin(m).map(|(_, v)| v)
}

/// Largest value over the whole matrix.
pub fn max(m: &[Vec<f64>]) -> Result<f64> {
    argmax(m).map(|(_, v)| v)
}

/// `((row, column), value)` of the smallest value.
pub fn argmin(m: &[Vec<f64>]) -> Result<((usize, usize), f64)> {
    let best = column_argmin(m)?
        .into_iter()
        .enumerate()
        .filter(|(_, (_, v))| !v.is_nan())
        .min_by(|a, b| a.1.1.total_cmp(&b.1.1));
    best.map(|(j, (i, v))| ((i, j), v))
        .ok_or_else(|| PlotError::dimension("matrix has no comparable values"))
}

/// `((row, column), value)` of the largest value.
pub fn argmax(m: &[Vec<f64>]) -> Result<((usize, usize), f64)> {
    let best = column_argmax(m)?
        .into_iter()
        .enumerate()
        .filter(|(_, (_, v))| !v.is_nan())
        .max_by(|a, b| a.1.1.total_cmp(&b.1.1));
    best.map(|(j, (i, v))| ((i, j), v))
        .ok_or_else(|| PlotError::dimension("matrix has no comparable values"))
}

fn reduce_columns(
    m: &[Vec<f64>],
    f: impl Fn(&[f64]) -> Option<(usize, f64)>,
) -> Result<Vec<(usize, f64)>> {
    let (rows, cols) = shape(m)?;
    if rows == 0 || cols == 0 {
        return Err(PlotError::dimension("cannot reduce an empty matrix"));
    }
    let mut col = vec![0.0; rows];
    (0..cols)
        .map(|j| {
            for (slot, row) in col.iter_mut().zip(m) {
                *slot = row[j];
            }
            // An all-NaN column keeps NaN at row 0.
            Ok(f(&col).unwrap_or((0, f64::NAN)))
        })
        .collect()
}

// ---- validation ----

fn check_index(i: usize, len: usize, what: &str) -> Result<()> {
    if i >= len {
        return Err(PlotError::index(format!(
            "{what} index {i} out of range 0..{len}"
        )));
    }
    Ok(())
}

fn check_range(range: &Range<usize>, len: usize, what: &str) -> Result<()> {
    if range.start > range.end || range.end > len {
        return Err(PlotError::index(format!(
            "{what} range {}..{} out of range 0..{len}",
            range.start, range.end
        )));
    }
    Ok(())
}

fn check_ascending(indices: &[usize], len: usize, what: &str) -> Result<()> {
    if indices.windows(2).any(|w| w[0] >= w[1]) {
        return Err(PlotError::index(format!(
            "{what} indices must be strictly ascending: {indices:?}"
        )));
    }
    if let Some(&last) = indices.last() {
        check_index(last, len, what)?;
    }
    Ok(())
}
