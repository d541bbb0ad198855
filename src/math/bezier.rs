use super::curve::ParametricCurve2d;
use super::{Point2d, Vector2d};
use crate::util::Interval;
use cgmath::prelude::*;

/// A bezier curve of arbitrary degree, evaluated with the generalised
/// Bernstein form rather than by repeated subdivision.
#[derive(Clone, Debug)]
pub struct BezierCurve2d {
    points: Vec<Point2d>,
    /// Binomial coefficients for the curve's degree.
    coeffs: Vec<f64>,
}

impl BezierCurve2d {
    /// Creates a bezier curve from its control points.
    /// The degree of the curve is one less than the number of points.
    pub fn new(points: &[Point2d]) -> Self {
        let degree = points.len().saturating_sub(1);
        Self {
            points: points.to_vec(),
            coeffs: pascal_row(degree),
        }
    }

    /// The degree of the curve.
    pub fn degree(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}

impl ParametricCurve2d for BezierCurve2d {
    fn sample(&self, t: f64) -> Point2d {
        let n = self.degree() as i32;
        let t1 = 1.0 - t;
        let sum = self
            .points
            .iter()
            .zip(&self.coeffs)
            .enumerate()
            .fold(Vector2d::new(0.0, 0.0), |acc, (i, (p, c))| {
                let i = i as i32;
                acc + (c * t.powi(i) * t1.powi(n - i)) * p.to_vec()
            });
        Point2d::from_vec(sum)
    }

    fn bounds(&self) -> Interval<f64> {
        Interval::new(0.0, 1.0)
    }
}

/// Returns the `n`th row of Pascal's triangle.
pub fn pascal_row(n: usize) -> Vec<f64> {
    let mut row = Vec::with_capacity(n + 1);
    let mut value = 1.0;
    row.push(value);
    for k in 1..=n {
        value = value * (n + 1 - k) as f64 / k as f64;
        row.push(value);
    }
    row
}
