//! Distance matrices between a feature bank and a batch of queries.

use auglabel_core::prelude::*;
use ndarray::{Array1, Array2, ArrayView2, Axis};

fn check_dims(bank: &ArrayView2<'_, f32>, queries: &ArrayView2<'_, f32>) -> Result<()> {
    if bank.ncols() != queries.ncols() {
        return Err(ConsistencyError::ShapeMismatch {
            expected: vec![queries.nrows(), bank.ncols()],
            actual: queries.shape().to_vec(),
        }
        .into());
    }
    Ok(())
}

fn squared_norms(rows: &ArrayView2<'_, f32>) -> Array1<f32> {
    rows.map_axis(Axis(1), |r| r.dot(&r))
}

/// Index of the first row holding NaN or infinity.
pub fn first_non_finite_row(rows: ArrayView2<'_, f32>) -> Option<usize> {
    rows.axis_iter(Axis(0))
        .position(|r| r.iter().any(|v| !v.is_finite()))
}

/// Squared Euclidean distances, (N × M) for N bank rows and M queries.
///
/// Uses ‖a‖² + ‖b‖² − 2·a·b. Cancellation can leave tiny negatives; those
/// are clamped to zero. NaN passes through unchanged.
pub fn squared_distances(
    bank: ArrayView2<'_, f32>,
    queries: ArrayView2<'_, f32>,
) -> Result<Array2<f32>> {
    check_dims(&bank, &queries)?;

    let bank_sq = squared_norms(&bank);
    let query_sq = squared_norms(&queries);

    let mut d = bank.dot(&queries.t());
    for ((i, j), v) in d.indexed_iter_mut() {
        let d2 = bank_sq[i] + query_sq[j] - 2.0 * *v;
        *v = if d2 < 0.0 { 0.0 } else { d2 };
    }
    Ok(d)
}

/// Euclidean distances, (N × M).
pub fn pairwise_distances(
    bank: ArrayView2<'_, f32>,
    queries: ArrayView2<'_, f32>,
) -> Result<Array2<f32>> {
    let mut d = squared_distances(bank, queries)?;
    d.mapv_inplace(f32::sqrt);
    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn direct(a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt()
    }

    #[test]
    fn test_matches_direct_distance() {
        let bank = array![[1.0f32, 2.0, 3.0], [-4.0, 0.5, 2.0], [0.0, 0.0, 0.0]];
        let query = array![[0.5f32, -1.0, 2.5]];
        let d = pairwise_distances(bank.view(), query.view()).unwrap();
        assert_eq!(d.shape(), &[3, 1]);
        for i in 0..3 {
            let expected = direct(bank.row(i).as_slice().unwrap(), query.row(0).as_slice().unwrap());
            assert!((d[[i, 0]] - expected).abs() < 1e-5, "row {}", i);
        }
    }

    #[test]
    fn test_identical_vectors_clamp_to_zero() {
        let v = array![[0.1f32, 0.7, 1e3, -3.3]];
        let d = squared_distances(v.view(), v.view()).unwrap();
        assert!(d[[0, 0]] >= 0.0);
        assert!(!pairwise_distances(v.view(), v.view()).unwrap()[[0, 0]].is_nan());
    }

    #[test]
    fn test_nan_row_is_not_clamped() {
        let bank = array![[f32::NAN, 0.0], [0.0, 0.0], [0.1, 0.0]];
        let query = array![[0.0f32, 0.0]];
        let d = squared_distances(bank.view(), query.view()).unwrap();
        assert!(d[[0, 0]].is_nan());
        assert_eq!(d[[1, 0]], 0.0);
    }

    #[test]
    fn test_first_non_finite_row() {
        let rows = array![[0.0f32, 1.0], [2.0, f32::INFINITY], [f32::NAN, 0.0]];
        assert_eq!(first_non_finite_row(rows.view()), Some(1));
        assert_eq!(first_non_finite_row(rows.slice(ndarray::s![..1, ..])), None);
    }

    #[test]
    fn test_dimension_mismatch() {
        let bank = Array2::<f32>::zeros((2, 3));
        let query = Array2::<f32>::zeros((1, 4));
        assert!(squared_distances(bank.view(), query.view())
            .unwrap_err()
            .is_consistency());
    }
}
