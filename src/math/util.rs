use super::Vector2d;
use cgmath::prelude::*;

/// Rotates a vector 90 degrees clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// The z-component of the cross product of two vectors.
pub fn cross(a: Vector2d, b: Vector2d) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Rotates a vector by the given angle in degrees.
///
/// On a canvas whose y-axis points downwards a positive angle appears clockwise.
pub fn rotate_deg(vec: Vector2d, degrees: f64) -> Vector2d {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vector2d::new(vec.x * cos - vec.y * sin, vec.x * sin + vec.y * cos)
}

/// Normalises a vector, returning `None` for vectors too short to have a direction.
pub fn try_normalize(vec: Vector2d) -> Option<Vector2d> {
    let mag = vec.magnitude();
    (mag > 1e-12).then(|| vec / mag)
}
