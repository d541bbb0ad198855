use super::Point2d;
use crate::util::Interval;

/// A parametric curve in 2D space.
pub trait ParametricCurve2d {
    /// Samples the parametric curve.
    fn sample(&self, t: f64) -> Point2d;

    /// Returns the minimum and maximum t-values that define the bounds of the curve.
    fn bounds(&self) -> Interval<f64>;
}

/// Samples a curve at `count` evenly spaced parameter values,
/// including both ends of its bounds.
pub fn sample_uniform(curve: &impl ParametricCurve2d, count: usize) -> Vec<Point2d> {
    let bounds = curve.bounds();
    match count {
        0 => vec![],
        1 => vec![curve.sample(bounds.min)],
        _ => {
            let last = (count - 1) as f64;
            (0..count)
                .map(|i| curve.sample(bounds.lerp(i as f64 / last)))
                .collect()
        }
    }
}
