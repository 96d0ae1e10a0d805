//! Penalized least squares
//!
//! Solves `(X'X + diag(penalties)) β = X'y` with a Cholesky decomposition.
//! With `penalties[j] = σ² / s_j²` this is the MAP estimate of a linear model
//! under independent Gaussian priors `β_j ~ N(0, s_j²)`.

use crate::{MathError, Result};

/// Jitter added to the diagonal so a zero-penalty column never makes the
/// system singular on its own.
const DIAGONAL_JITTER: f64 = 1e-10;

fn check_columns(columns: &[Vec<f64>], rows: usize) -> Result<()> {
    if columns.is_empty() {
        return Err(MathError::InvalidInput(
            "Design matrix needs at least one column".to_string(),
        ));
    }
    for (j, col) in columns.iter().enumerate() {
        if col.len() != rows {
            return Err(MathError::InvalidInput(format!(
                "Column {} has {} rows, expected {}",
                j,
                col.len(),
                rows
            )));
        }
    }
    Ok(())
}

/// Fit coefficients for column-major design matrix `columns`
pub fn ridge_fit(columns: &[Vec<f64>], y: &[f64], penalties: &[f64]) -> Result<Vec<f64>> {
    let n = y.len();
    if n == 0 {
        return Err(MathError::InsufficientData(
            "Cannot fit a regression without observations".to_string(),
        ));
    }
    check_columns(columns, n)?;
    if penalties.len() != columns.len() {
        return Err(MathError::InvalidInput(format!(
            "Got {} penalties for {} columns",
            penalties.len(),
            columns.len()
        )));
    }
    if penalties.iter().any(|p| *p < 0.0 || !p.is_finite()) {
        return Err(MathError::InvalidInput(
            "Penalties must be finite and non-negative".to_string(),
        ));
    }

    let k = columns.len();
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];

    for i in 0..k {
        for j in 0..=i {
            let dot: f64 = columns[i]
                .iter()
                .zip(columns[j].iter())
                .map(|(a, b)| a * b)
                .sum();
            xtx[i][j] = dot;
            xtx[j][i] = dot;
        }
        xty[i] = columns[i].iter().zip(y.iter()).map(|(a, b)| a * b).sum();
    }

    for (i, penalty) in penalties.iter().enumerate() {
        xtx[i][i] += penalty + DIAGONAL_JITTER;
    }

    let beta = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        MathError::CalculationError(
            "Regression failed: normal equations are not positive definite".to_string(),
        )
    })?;

    if beta.iter().any(|b| !b.is_finite()) {
        return Err(MathError::CalculationError(
            "Regression produced non-finite coefficients".to_string(),
        ));
    }

    Ok(beta)
}

/// Evaluate `X β` for a column-major design matrix
pub fn predict(columns: &[Vec<f64>], coefficients: &[f64]) -> Result<Vec<f64>> {
    let rows = columns.first().map(Vec::len).unwrap_or(0);
    check_columns(columns, rows)?;
    if coefficients.len() != columns.len() {
        return Err(MathError::InvalidInput(format!(
            "Got {} coefficients for {} columns",
            coefficients.len(),
            columns.len()
        )));
    }

    let mut out = vec![0.0; rows];
    for (col, &beta) in columns.iter().zip(coefficients.iter()) {
        for (o, &x) in out.iter_mut().zip(col.iter()) {
            *o += beta * x;
        }
    }
    Ok(out)
}

/// Solve a symmetric positive definite system `A x = b`
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // A = L L'
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // L' x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}
