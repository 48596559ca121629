use crate::common::*;

/// The solution of an assignment problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// The total cost of the assigned pairs.
    pub opt: f64,
    /// The column assigned to each row.
    pub x: Vec<Option<usize>>,
    /// The row assigned to each column.
    pub y: Vec<Option<usize>>,
}

impl Assignment {
    fn unassigned(num_rows: usize, num_cols: usize) -> Self {
        Self {
            opt: 0.0,
            x: vec![None; num_rows],
            y: vec![None; num_cols],
        }
    }

    /// Iterates over assigned `(row, col)` pairs in row order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.x
            .iter()
            .enumerate()
            .filter_map(|(row, col)| Some((row, (*col)?)))
    }

    pub fn unassigned_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.x
            .iter()
            .enumerate()
            .filter_map(|(row, col)| col.is_none().then(|| row))
    }

    pub fn unassigned_cols(&self) -> impl Iterator<Item = usize> + '_ {
        self.y
            .iter()
            .enumerate()
            .filter_map(|(col, row)| row.is_none().then(|| col))
    }
}

/// Solves the minimum cost assignment for a dense cost matrix.
///
/// A non-square matrix is accepted only when `extend_cost` is set or
/// `cost_limit` is finite. With `extend_cost`, the matrix is padded to a
/// square with zero cost entries. With a finite `cost_limit`, it is extended
/// to `rows + cols` with dummy entries of cost `cost_limit / 2`, so that a
/// pair costing more than `cost_limit` is never assigned. Pass
/// `f32::INFINITY` to disable the limit.
pub fn solve(cost: &Array2<f32>, extend_cost: bool, cost_limit: f32) -> Result<Assignment> {
    let (num_rows, num_cols) = cost.dim();
    ensure!(!cost_limit.is_nan(), "cost_limit must not be NaN");
    ensure!(
        cost_limit >= 0.0,
        "cost_limit must be non-negative, but get {}",
        cost_limit
    );
    ensure!(
        cost.iter().all(|value| !value.is_nan()),
        "cost matrix contains NaN entries"
    );

    let limited = cost_limit.is_finite();
    ensure!(
        limited || cost.iter().all(|value| value.is_finite()),
        "cost matrix contains infinite entries while cost_limit is not set"
    );
    ensure!(
        num_rows == num_cols || extend_cost || limited,
        "a {}x{} cost matrix is not square, set extend_cost or cost_limit",
        num_rows,
        num_cols
    );

    if num_rows == 0 || num_cols == 0 {
        return Ok(Assignment::unassigned(num_rows, num_cols));
    }

    let square = if limited {
        limited_square(cost.view(), cost_limit as f64)
    } else {
        padded_square(cost.view())
    };
    debug!(
        "solve {}x{} assignment on a {}x{} matrix",
        num_rows,
        num_cols,
        square.nrows(),
        square.ncols()
    );

    let row_to_col = solve_square(&square);

    let mut assignment = Assignment::unassigned(num_rows, num_cols);
    row_to_col
        .into_iter()
        .take(num_rows)
        .enumerate()
        .filter(|&(_, col)| col < num_cols)
        .filter(|&(row, col)| !limited || cost[[row, col]] <= cost_limit)
        .for_each(|(row, col)| {
            assignment.x[row] = Some(col);
            assignment.y[col] = Some(row);
            assignment.opt += cost[[row, col]] as f64;
        });

    Ok(assignment)
}

/// Pads the matrix to a square with zero cost entries.
fn padded_square(cost: ArrayView2<'_, f32>) -> Array2<f64> {
    let (num_rows, num_cols) = cost.dim();
    let size = num_rows.max(num_cols);
    let mut square = Array2::zeros((size, size));
    square
        .slice_mut(ndarray::s![..num_rows, ..num_cols])
        .assign(&cost.mapv(f64::from));
    square
}

/// Extends the matrix with dummy rows and columns costing half of the limit.
fn limited_square(cost: ArrayView2<'_, f32>, cost_limit: f64) -> Array2<f64> {
    let (num_rows, num_cols) = cost.dim();
    let size = num_rows + num_cols;

    // entries above the limit lose against any dummy pairing
    let above_limit = cost_limit + 1.0;

    let mut square = Array2::from_elem((size, size), cost_limit / 2.0);
    square
        .slice_mut(ndarray::s![num_rows.., num_cols..])
        .fill(0.0);
    square
        .slice_mut(ndarray::s![..num_rows, ..num_cols])
        .assign(&cost.mapv(|value| {
            let value = f64::from(value);
            if value > cost_limit {
                above_limit
            } else {
                value
            }
        }));
    square
}

/// Runs the shortest augmenting path method on a square matrix of finite
/// costs and returns the column of each row.
fn solve_square(cost: &Array2<f64>) -> Vec<usize> {
    let size = cost.nrows();
    let inf = f64::MAX / 2.0;

    // potentials and the matching are indexed from 1, slot 0 is the source
    let mut u = vec![0.0; size + 1];
    let mut v = vec![0.0; size + 1];
    let mut col_owner = vec![0usize; size + 1];
    let mut way = vec![0usize; size + 1];

    for row in 1..=size {
        col_owner[0] = row;
        let mut j0 = 0;
        let mut min_slack = vec![inf; size + 1];
        let mut used = vec![false; size + 1];

        loop {
            used[j0] = true;
            let i0 = col_owner[j0];
            let mut delta = inf;
            let mut j1 = 0;

            for j in 1..=size {
                if used[j] {
                    continue;
                }
                let slack = cost[[i0 - 1, j - 1]] - u[i0] - v[j];
                if slack < min_slack[j] {
                    min_slack[j] = slack;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }

            for j in 0..=size {
                if used[j] {
                    u[col_owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }

            j0 = j1;
            if col_owner[j0] == 0 {
                break;
            }
        }

        loop {
            let prev = way[j0];
            col_owner[j0] = col_owner[prev];
            j0 = prev;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![0; size];
    (1..=size).for_each(|col| {
        row_to_col[col_owner[col] - 1] = col - 1;
    });
    row_to_col
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn square_assignment() -> Result<()> {
        let cost = array![[4.0, 1.0, 3.0], [2.0, 0.0, 5.0], [3.0, 2.0, 2.0]];
        let assignment = solve(&cost, false, f32::INFINITY)?;

        assert_eq!(assignment.x, [Some(1), Some(0), Some(2)]);
        assert_eq!(assignment.y, [Some(1), Some(0), Some(2)]);
        assert_abs_diff_eq!(assignment.opt, 5.0);
        Ok(())
    }

    #[test]
    fn reject_non_square_without_extension() {
        let cost = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        assert!(solve(&cost, false, f32::INFINITY).is_err());
    }

    #[test]
    fn extended_assignment() -> Result<()> {
        let cost = array![[1.0, 9.0, 3.0], [9.0, 2.0, 1.0]];
        let assignment = solve(&cost, true, f32::INFINITY)?;

        assert_eq!(assignment.x, [Some(0), Some(2)]);
        assert_eq!(assignment.y, [Some(0), None, Some(1)]);
        assert_abs_diff_eq!(assignment.opt, 2.0);
        assert_eq!(assignment.unassigned_cols().collect::<Vec<_>>(), [1]);

        let tall = cost.t().to_owned();
        let assignment = solve(&tall, true, f32::INFINITY)?;
        assert_eq!(assignment.x, [Some(0), None, Some(1)]);
        assert_eq!(assignment.y, [Some(0), Some(2)]);
        Ok(())
    }

    #[test]
    fn cost_limit_leaves_expensive_pairs() -> Result<()> {
        let cost = array![[0.1, 0.9], [0.8, 0.95]];
        let assignment = solve(&cost, true, 0.5)?;

        assert_eq!(assignment.x, [Some(0), None]);
        assert_eq!(assignment.y, [Some(0), None]);
        assert_abs_diff_eq!(assignment.opt, 0.1, epsilon = 1e-6);
        assert_eq!(assignment.pairs().collect::<Vec<_>>(), [(0, 0)]);
        assert_eq!(assignment.unassigned_rows().collect::<Vec<_>>(), [1]);
        Ok(())
    }

    #[test]
    fn cost_limit_accepts_infinite_entries() -> Result<()> {
        let cost = array![[f32::INFINITY, 0.2], [0.3, f32::INFINITY], [0.1, 0.4]];
        let assignment = solve(&cost, false, 1.0)?;

        assert_eq!(assignment.x, [Some(1), None, Some(0)]);
        assert_abs_diff_eq!(assignment.opt, 0.3, epsilon = 1e-6);

        assert!(solve(&cost, true, f32::INFINITY).is_err());
        Ok(())
    }

    #[test]
    fn empty_assignment() -> Result<()> {
        let assignment = solve(&Array2::zeros((0, 0)), false, f32::INFINITY)?;
        assert!(assignment.x.is_empty());
        assert!(assignment.y.is_empty());
        assert_eq!(assignment.opt, 0.0);

        let assignment = solve(&Array2::zeros((3, 0)), true, f32::INFINITY)?;
        assert_eq!(assignment.x, [None, None, None]);
        assert!(assignment.y.is_empty());
        assert_eq!(assignment.opt, 0.0);
        Ok(())
    }

    #[test]
    fn reject_nan_entries() {
        let cost = array![[f32::NAN, 1.0], [1.0, 0.0]];
        assert!(solve(&cost, false, f32::INFINITY).is_err());
        assert!(solve(&array![[1.0]], false, f32::NAN).is_err());
    }
}
