//! Mathematical structs and functions.

use cgmath::{Point2, Vector2};
pub use bezier::BezierCurve2d;
pub use buffer::{buffer_pieces, buffer_polyline};
pub use curve::{sample_uniform, ParametricCurve2d};
pub use polygon::*;
pub use util::*;

mod bezier;
mod buffer;
mod curve;
mod polygon;
mod util;

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;
