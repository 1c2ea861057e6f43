use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Dimension};
use rand::distributions::OpenClosed01;
use rand::Rng;

use crate::error::{PlsaError, Result};

/// How many times a column is redrawn when its corner cell comes out negative.
pub const MAX_COLUMN_DRAWS: usize = 16;

/// Draws a `rows x cols` matrix whose columns each sum to 1.
///
/// Every cell but the last row holds a value from (0, 1] scaled by `1 / rows`;
/// the last row takes whatever is left so the column sum is exact.
pub fn random_column_stochastic<R: Rng>(rows: usize, cols: usize, name: &'static str, rng: &mut R)
    -> Result<Array2<f64>>
{
    column_stochastic_from(rows, cols, name, || rng.sample(OpenClosed01))
}

/// Builds a column-stochastic matrix from raw draws in (0, 1].
///
/// A column whose corner comes out negative or non-finite is redrawn, at most
/// `MAX_COLUMN_DRAWS` times. Draws within (0, 1] always leave a positive
/// corner; only a `draw` returning values above 1 can exhaust the redraws.
pub fn column_stochastic_from<F>(rows: usize, cols: usize, name: &'static str, mut draw: F)
    -> Result<Array2<f64>>
    where F: FnMut() -> f64
{
    let mut m = Array2::zeros((rows, cols));
    if rows == 0 {
        return Ok(m);
    }
    let scale = 1.0 / rows as f64;
    for (c, mut column) in m.axis_iter_mut(Axis(1)).enumerate() {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let mut sum = 0.0;
            for r in 0..rows - 1 {
                column[r] = draw() * scale;
                sum += column[r];
            }
            let corner = 1.0 - sum;
            if corner >= 0.0 && corner.is_finite() {
                column[rows - 1] = corner;
                break;
            }
            if attempts == MAX_COLUMN_DRAWS {
                return Err(PlsaError::DegenerateInitialization {
                    matrix: name,
                    column: c,
                    attempts: attempts,
                });
            }
        }
    }
    Ok(m)
}

pub fn column_sums(m: &Array2<f64>) -> Array1<f64> {
    m.sum_axis(Axis(0))
}

/// Divides every column by its sum.
pub fn normalize_columns(mut m: Array2<f64>) -> Array2<f64> {
    let sums = column_sums(&m);
    for (mut column, &sum) in m.axis_iter_mut(Axis(1)).zip(sums.iter()) {
        column /= sum;
    }
    m
}

pub fn all_finite<S, D>(m: &ArrayBase<S, D>) -> bool
    where S: Data<Elem = f64>, D: Dimension
{
    m.iter().all(|x| x.is_finite())
}

pub fn is_column_stochastic(m: &Array2<f64>, tolerance: f64) -> bool {
    m.iter().all(|&x| x >= 0.0)
        && column_sums(m).iter().all(|&s| (s - 1.0).abs() <= tolerance)
}
