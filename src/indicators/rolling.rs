//! Window arithmetic over price series.
//!
//! Inputs and outputs are `Option<f64>` per row; `None` marks a missing or
//! undefined value.

use statrs::statistics::Statistics;

/// Values of the full window ending at `end`, or `None` if any is missing.
fn full_window(values: &[Option<f64>], end: usize, window: usize) -> Option<Vec<f64>> {
    if window == 0 || end + 1 < window {
        return None;
    }
    values[end + 1 - window..=end].iter().copied().collect()
}

/// Rolling arithmetic mean. The first `window - 1` outputs are undefined.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| full_window(values, i, window).map(|w| w.iter().mean()))
        .collect()
}

/// Rolling sample standard deviation (n - 1 denominator); undefined for a
/// one-element window.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            full_window(values, i, window)
                .map(|w| w.iter().std_dev())
                .filter(|s| s.is_finite())
        })
        .collect()
}

/// Row-over-row difference; the first row, and any row touching a missing
/// value, is undefined.
pub fn diff(values: &[Option<f64>]) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| match i {
            0 => None,
            _ => Some(values[i]? - values[i - 1]?),
        })
        .collect()
}

/// Relative strength index from simple rolling averages of gains and losses.
///
/// Undefined deltas count as zero gain and zero loss. A zero loss average
/// with a positive gain average saturates to exactly 100; when both averages
/// are zero the value is undefined.
pub fn rsi(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let deltas = diff(values);
    let gains: Vec<Option<f64>> = deltas
        .iter()
        .map(|d| Some(d.filter(|d| *d > 0.0).unwrap_or(0.0)))
        .collect();
    let losses: Vec<Option<f64>> = deltas
        .iter()
        .map(|d| Some(d.filter(|d| *d < 0.0).map(|d| -d).unwrap_or(0.0)))
        .collect();

    rolling_mean(&gains, window)
        .into_iter()
        .zip(rolling_mean(&losses, window))
        .map(|(gain, loss)| {
            let (gain, loss) = (gain?, loss?);
            if loss == 0.0 {
                // Infinite RS.
                (gain > 0.0).then_some(100.0)
            } else {
                let rs = gain / loss;
                Some(100.0 - 100.0 / (1.0 + rs))
            }
        })
        .collect()
}

/// Exponentially weighted mean with `alpha = 2 / (span + 1)` and
/// bias-adjusted weights. Defined from the first observed value; missing
/// values still age the weights of earlier observations.
pub fn ewm_mean(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    values
        .iter()
        .map(|v| {
            weighted_sum *= decay;
            weight_total *= decay;
            if let Some(x) = v {
                weighted_sum += x;
                weight_total += 1.0;
            }
            (weight_total > 0.0).then(|| weighted_sum / weight_total)
        })
        .collect()
}

/// Element-wise `a - b`.
pub fn subtract(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .map(|(x, y)| Some((*x)? - (*y)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn rolling_mean_leading_values_undefined() {
        let values = some(&(1..=30).map(f64::from).collect::<Vec<_>>());
        let sma = rolling_mean(&values, 20);
        assert_eq!(sma.iter().take_while(|v| v.is_none()).count(), 19);
        for (i, v) in sma.iter().enumerate().skip(19) {
            let expected = (i + 1 - 19..=i + 1).map(|k| k as f64).sum::<f64>() / 20.0;
            assert!(close(v.unwrap(), expected));
        }
    }

    #[test]
    fn rolling_mean_gap_poisons_window() {
        let values = vec![Some(1.0), None, Some(3.0), Some(5.0)];
        assert_eq!(rolling_mean(&values, 2), vec![None, None, None, Some(4.0)]);
    }

    #[test]
    fn rolling_std_is_sample_std() {
        let values = some(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let std = rolling_std(&values, 8);
        // Sample variance of this set is 32 / 7.
        assert!(close(std[7].unwrap(), (32.0f64 / 7.0).sqrt()));
        assert_eq!(rolling_std(&values, 1)[0], None);
    }

    #[test]
    fn rsi_saturates_on_rising_prices() {
        let values = some(&(1..=20).map(f64::from).collect::<Vec<_>>());
        let out = rsi(&values, 14);
        assert!(out[..13].iter().all(Option::is_none));
        assert!(out[13..].iter().all(|v| *v == Some(100.0)));
    }

    #[test]
    fn rsi_flat_prices_undefined() {
        let values = some(&[5.0; 20]);
        assert!(rsi(&values, 14).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_bounded() {
        let values = some(&[
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]);
        let out = rsi(&values, 14);
        for v in out.into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn rsi_matches_hand_computation() {
        // Deltas: [_, +1, -1, +2]; window 3 at the last row -> gains 1,0,2 / losses 0,1,0.
        let values = some(&[10.0, 11.0, 10.0, 12.0]);
        let out = rsi(&values, 3);
        let rs = (3.0 / 3.0) / (1.0 / 3.0);
        assert!(close(out[3].unwrap(), 100.0 - 100.0 / (1.0 + rs)));
        // The undefined first delta counts as zero: gains 0,1,0 / losses 0,0,1.
        assert!(close(out[2].unwrap(), 50.0));
    }

    #[test]
    fn ewm_matches_adjusted_weights() {
        let values = some(&[1.0, 2.0, 3.0]);
        let out = ewm_mean(&values, 3);
        // alpha = 0.5: weights 1, 0.5, 0.25 from newest to oldest.
        assert!(close(out[0].unwrap(), 1.0));
        assert!(close(out[1].unwrap(), (2.0 + 0.5) / 1.5));
        assert!(close(out[2].unwrap(), (3.0 + 1.0 + 0.25) / 1.75));
    }

    #[test]
    fn ewm_leading_gap_is_undefined() {
        let out = ewm_mean(&[None, Some(4.0), None], 5);
        assert_eq!(out[0], None);
        assert!(close(out[1].unwrap(), 4.0));
        assert!(close(out[2].unwrap(), 4.0));
    }

    #[test]
    fn subtract_propagates_gaps() {
        let a = vec![Some(3.0), None];
        let b = vec![Some(1.0), Some(1.0)];
        assert_eq!(subtract(&a, &b), vec![Some(2.0), None]);
    }
}
