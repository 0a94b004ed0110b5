//! Learning-curve cost adjustment from cumulative installed capacity.

use crate::error::AnalysisError;

/// Default learning-curve exponent.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Exponential cost decline as a function of cumulative capacity:
///
/// `adjusted[i] = cost[i] * (base_capacity / capacity[i]) ^ learning_rate`
///
/// where `base_capacity` is the first (gap-filled) capacity of the series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningCurve {
    /// Exponent applied to the capacity ratio. Conventionally in `[0, 1)`.
    pub learning_rate: f64,
}

impl Default for LearningCurve {
    fn default() -> Self {
        Self::new(DEFAULT_LEARNING_RATE)
    }
}

impl LearningCurve {
    /// Creates a curve with the given exponent.
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }

    /// Adjusts `costs` by the matching cumulative capacities.
    ///
    /// Capacities that are `None`, zero, or NaN are gaps. Each gap takes the
    /// next valid value later in the sequence; gaps with no valid value after
    /// them become `1.0`. A non-positive base capacity is treated as `1.0`.
    ///
    /// # Errors
    ///
    /// * [`AnalysisError::EmptyInput`] if `costs` is empty.
    /// * [`AnalysisError::LengthMismatch`] if the slices differ in length.
    ///
    /// # Examples
    ///
    /// ```
    /// use energy_scenarios::analysis::learning_curve::LearningCurve;
    ///
    /// let curve = LearningCurve::new(0.5);
    /// let adjusted = curve.adjust(&[100.0, 100.0], &[Some(1.0), Some(4.0)]).unwrap();
    /// assert!((adjusted[1] - 50.0).abs() < 1e-9);
    /// ```
    pub fn adjust(
        &self,
        costs: &[f64],
        cumulative_capacities: &[Option<f64>],
    ) -> Result<Vec<f64>, AnalysisError> {
        if costs.len() != cumulative_capacities.len() {
            return Err(AnalysisError::LengthMismatch {
                costs: costs.len(),
                capacities: cumulative_capacities.len(),
            });
        }
        if costs.is_empty() {
            return Err(AnalysisError::EmptyInput("learning curve needs at least one cost"));
        }

        let capacities = backfill(cumulative_capacities);
        let base = if capacities[0] > 0.0 { capacities[0] } else { 1.0 };

        Ok(costs
            .iter()
            .zip(&capacities)
            .map(|(cost, cap)| cost * (base / cap).powf(self.learning_rate))
            .collect())
    }
}

/// Convenience wrapper for [`LearningCurve::adjust`] with an explicit rate.
///
/// # Errors
///
/// Same as [`LearningCurve::adjust`].
pub fn adjust(
    costs: &[f64],
    cumulative_capacities: &[Option<f64>],
    learning_rate: f64,
) -> Result<Vec<f64>, AnalysisError> {
    LearningCurve::new(learning_rate).adjust(costs, cumulative_capacities)
}

/// Fills gaps from the next valid value, defaulting trailing gaps to 1.0.
fn backfill(values: &[Option<f64>]) -> Vec<f64> {
    let mut filled = vec![1.0; values.len()];
    let mut next_valid: Option<f64> = None;
    for (i, value) in values.iter().enumerate().rev() {
        match value {
            Some(v) if *v != 0.0 && !v.is_nan() => {
                next_valid = Some(*v);
                filled[i] = *v;
            }
            _ => filled[i] = next_valid.unwrap_or(1.0),
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn constant_capacity_leaves_costs_unchanged() {
        let costs = [1200.0, 1100.0, 950.0, 900.0];
        let caps = [Some(42.0); 4];
        for rate in [0.0, 0.1, 0.5, 0.9] {
            let adjusted = adjust(&costs, &caps, rate).expect("adjust should succeed");
            assert!(approx_eq(&adjusted, &costs), "rate {rate}: {adjusted:?}");
        }
    }

    #[test]
    fn uniform_scaling_of_capacity_has_no_effect() {
        let costs = [100.0, 90.0, 80.0];
        let caps = [Some(10.0), Some(20.0), Some(40.0)];
        let scaled: Vec<_> = caps.iter().map(|c| c.map(|v| v * 7.5)).collect();
        let curve = LearningCurve::default();
        let a = curve.adjust(&costs, &caps).expect("adjust should succeed");
        let b = curve.adjust(&costs, &scaled).expect("adjust should succeed");
        assert!(approx_eq(&a, &b));
    }

    #[test]
    fn doubling_capacity_applies_rate() {
        let curve = LearningCurve::new(0.1);
        let adjusted = curve
            .adjust(&[100.0, 100.0], &[Some(1.0), Some(2.0)])
            .expect("adjust should succeed");
        assert!((adjusted[0] - 100.0).abs() < 1e-9);
        assert!((adjusted[1] - 100.0 * 0.5_f64.powf(0.1)).abs() < 1e-9);
    }

    #[test]
    fn leading_gap_takes_later_value_as_base() {
        let curve = LearningCurve::new(0.5);
        let adjusted = curve
            .adjust(&[10.0, 10.0, 10.0], &[None, Some(0.0), Some(4.0)])
            .expect("adjust should succeed");
        // base = 4.0, so every ratio is 1
        assert!(approx_eq(&adjusted, &[10.0, 10.0, 10.0]));
    }

    #[test]
    fn gaps_fill_backward_not_forward() {
        assert_eq!(
            backfill(&[Some(2.0), None, Some(8.0), None]),
            vec![2.0, 8.0, 8.0, 1.0]
        );
    }

    #[test]
    fn all_missing_defaults_to_one() {
        let adjusted = adjust(&[5.0, 6.0], &[None, Some(f64::NAN)], 0.3).expect("adjust should succeed");
        assert!(approx_eq(&adjusted, &[5.0, 6.0]));
    }

    #[test]
    fn negative_base_is_treated_as_one() {
        let curve = LearningCurve::new(1.0);
        let adjusted = curve
            .adjust(&[10.0, 10.0], &[Some(-3.0), Some(2.0)])
            .expect("adjust should succeed");
        assert!((adjusted[1] - 5.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = adjust(&[], &[], 0.1);
        assert!(matches!(err, Err(AnalysisError::EmptyInput(_))));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = adjust(&[1.0, 2.0], &[Some(1.0)], 0.1);
        assert_eq!(
            err,
            Err(AnalysisError::LengthMismatch {
                costs: 2,
                capacities: 1
            })
        );
    }
}
