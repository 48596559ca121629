use crate::common::*;

/// Loads a cost matrix stored as a JSON list of rows.
pub fn open_cost_matrix<P>(path: P) -> Result<Array2<f32>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("unable to read file '{}'", path.display()))?;
    let rows: Vec<Vec<f32>> = serde_json::from_str(&text)
        .with_context(|| format!("unable to parse cost file '{}'", path.display()))?;
    cost_matrix_from_rows(rows)
}

/// Builds a cost matrix from equally sized rows.
pub fn cost_matrix_from_rows(rows: Vec<Vec<f32>>) -> Result<Array2<f32>> {
    let num_rows = rows.len();
    let num_cols = rows.first().map(|row| row.len()).unwrap_or(0);

    if let Some((index, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != num_cols)
    {
        bail!(
            "row {} has {} entries, but the first row has {}",
            index,
            row.len(),
            num_cols
        );
    }

    let values: Vec<f32> = rows.into_iter().flatten().collect();
    let matrix = Array2::from_shape_vec((num_rows, num_cols), values)?;
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_to_matrix() -> Result<()> {
        let matrix = cost_matrix_from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])?;
        assert_eq!(matrix.dim(), (2, 3));
        assert_eq!(matrix[[1, 0]], 4.0);

        let empty = cost_matrix_from_rows(vec![])?;
        assert_eq!(empty.dim(), (0, 0));
        Ok(())
    }

    #[test]
    fn reject_ragged_rows() {
        assert!(cost_matrix_from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
    }
}
