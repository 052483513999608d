/// Predict a single ruble salary from an optional lower/upper fork.
///
/// Midpoint when both bounds are known, `* 1.2` on a lone lower bound,
/// `* 0.8` on a lone upper bound, `None` when the posting has neither.
pub fn estimate(lower: Option<u32>, upper: Option<u32>) -> Option<f64> {
    match (lower, upper) {
        (Some(lower), Some(upper)) => Some((f64::from(lower) + f64::from(upper)) / 2.0),
        (Some(lower), None) => Some(f64::from(lower) * 1.2),
        (None, Some(upper)) => Some(f64::from(upper) * 0.8),
        (None, None) => None,
    }
}
