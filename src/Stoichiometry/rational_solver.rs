//! # Rational Solver Module
//!
//! Gauss-Jordan elimination over exact rationals. Because the arithmetic is
//! exact there is no numerical-stability pivoting: any nonzero entry is a
//! valid pivot. Elimination produces reduced row-echelon form with unit
//! pivots; columns that own no pivot are the free variables of `M·x = 0`.
//!
//! A chemically well-posed equation leaves exactly one free column. Setting
//! that variable to 1 and back-substituting yields the spanning null-space
//! vector, which must come out strictly positive; zero or negative entries
//! mean no orientation of the equation satisfies conservation.

use crate::Stoichiometry::equation_balancer::BalanceError;
use crate::Stoichiometry::stoich_matrix::StoichMatrix;
use log::debug;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// Reduces `rows` in place to reduced row-echelon form with unit pivots.
/// Returns the pivot column of every row, `None` for the zero rows at the
/// bottom.
pub fn gauss_jordan_elimination(
    rows: &mut [Vec<BigRational>],
    n_cols: usize,
) -> Vec<Option<usize>> {
    let n_rows = rows.len();
    let mut pivot_cols: Vec<Option<usize>> = vec![None; n_rows];
    let mut pivot_row = 0usize;
    for col in 0..n_cols {
        if pivot_row >= n_rows {
            break;
        }
        let Some(src) = (pivot_row..n_rows).find(|&r| !rows[r][col].is_zero()) else {
            continue;
        };
        rows.swap(pivot_row, src);

        let pivot = rows[pivot_row][col].clone();
        for c in 0..n_cols {
            let scaled = &rows[pivot_row][c] / &pivot;
            rows[pivot_row][c] = scaled;
        }

        let pivot_row_copy = rows[pivot_row].clone();
        for r in 0..n_rows {
            if r == pivot_row || rows[r][col].is_zero() {
                continue;
            }
            let factor = rows[r][col].clone();
            for c in 0..n_cols {
                let updated = rows[r][c].clone() - &factor * &pivot_row_copy[c];
                rows[r][c] = updated;
            }
        }

        pivot_cols[pivot_row] = Some(col);
        pivot_row += 1;
    }
    pivot_cols
}

/// Extracts the spanning null-space vector of the conservation matrix.
///
/// Fails with `UnbalanceableError` when the null space is trivial or the
/// vector has a zero/negative entry, and with `AmbiguousEquationError` when
/// the null space has dimension two or more.
pub fn solve_nullspace(matrix: &StoichMatrix) -> Result<Vec<BigRational>, BalanceError> {
    let n = matrix.n_cols();
    let mut rows = matrix.rows.clone();
    let pivot_cols = gauss_jordan_elimination(&mut rows, n);

    let mut is_pivot = vec![false; n];
    for col in pivot_cols.iter().flatten() {
        is_pivot[*col] = true;
    }
    let free_cols: Vec<usize> = (0..n).filter(|&c| !is_pivot[c]).collect();
    debug!(
        "elimination done: {} pivots, free columns {:?}",
        pivot_cols.iter().flatten().count(),
        free_cols
    );

    let free = match free_cols.len() {
        0 => {
            return Err(BalanceError::Unbalanceable(
                "only the trivial solution exists".to_string(),
            ));
        }
        1 => free_cols[0],
        dimension => {
            return Err(BalanceError::AmbiguousEquation(format!(
                "the null space has dimension {}",
                dimension
            )));
        }
    };

    // RREF with a single free column: every pivot row reads
    // x[pivot] + row[free]·x[free] = 0
    let mut solution = vec![BigRational::zero(); n];
    solution[free] = BigRational::one();
    for (r, pivot_col) in pivot_cols.iter().enumerate() {
        if let Some(p) = pivot_col {
            solution[*p] = -rows[r][free].clone();
        }
    }

    for (i, value) in solution.iter().enumerate() {
        if !value.is_positive() {
            return Err(BalanceError::Unbalanceable(format!(
                "the coefficient of '{}' comes out as {}, not a positive value",
                matrix.compounds[i], value
            )));
        }
    }
    Ok(solution)
}
