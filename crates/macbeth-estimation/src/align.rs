//! Time-series alignment.
//!
//! The risk factor usually carries leading periods the asset table does not
//! (the first year has no growth rate, the unfiltering recurrence consumes
//! further lags), so both series are trimmed from the front by their own
//! offset before being compared period for period.

use crate::error::{EstimationError, Result};

/// Drop the first `factor_start` factor values and the first `asset_start`
/// asset values, then require equal lengths.
///
/// An offset past the end of a series leaves that side empty. The returned
/// slices borrow from the inputs.
///
/// # Errors
///
/// [`EstimationError::Alignment`] if the trimmed series differ in length.
/// Nothing is truncated to make them fit.
///
/// # Examples
///
/// ```
/// use macbeth_estimation::align;
///
/// let factor = [None, Some(0.01), Some(0.02), Some(-0.01)];
/// let asset = [Some(5.0), Some(1.0), Some(2.0), Some(3.0)];
/// let (x, y) = align(&factor, &asset, 1, 1).unwrap();
/// assert_eq!(x, &[Some(0.01), Some(0.02), Some(-0.01)]);
/// assert_eq!(y, &[Some(1.0), Some(2.0), Some(3.0)]);
/// ```
pub fn align<'a, T>(
    risk_factor: &'a [T],
    asset_returns: &'a [T],
    risk_factor_start: usize,
    asset_start: usize,
) -> Result<(&'a [T], &'a [T])> {
    let x = risk_factor.get(risk_factor_start..).unwrap_or_default();
    let y = asset_returns.get(asset_start..).unwrap_or_default();
    if x.len() != y.len() {
        return Err(EstimationError::Alignment {
            factor_len: x.len(),
            asset_len: y.len(),
        });
    }
    Ok((x, y))
}

/// Unwrap an aligned window, `None` if any value is missing.
pub(crate) fn complete(values: &[Option<f64>]) -> Option<Vec<f64>> {
    values.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(5, 3, 2, 0)]
    #[case(6, 4, 2, 0)]
    #[case(4, 4, 0, 0)]
    #[case(3, 5, 3, 5)]
    fn test_equal_lengths(
        #[case] factor_len: usize,
        #[case] asset_len: usize,
        #[case] factor_start: usize,
        #[case] asset_start: usize,
    ) {
        let factor: Vec<usize> = (0..factor_len).collect();
        let asset: Vec<usize> = (0..asset_len).collect();
        let (x, y) = align(&factor, &asset, factor_start, asset_start).unwrap();
        assert_eq!(x.len(), y.len());
        assert_eq!(x.first().copied(), factor.get(factor_start).copied());
    }

    #[test]
    fn test_mismatch_is_error() {
        let factor = [1.0, 2.0, 3.0];
        let asset = [1.0, 2.0];
        let err = align(&factor, &asset, 0, 0).unwrap_err();
        assert!(matches!(
            err,
            EstimationError::Alignment {
                factor_len: 3,
                asset_len: 2
            }
        ));
    }

    #[test]
    fn test_complete() {
        assert_eq!(complete(&[Some(1.0), Some(2.0)]), Some(vec![1.0, 2.0]));
        assert_eq!(complete(&[Some(1.0), None]), None);
        assert_eq!(complete(&[]), Some(vec![]));
    }
}
