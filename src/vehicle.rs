use crate::math::{rotate_deg, Point2d, Vector2d};
use cgmath::prelude::*;
use log::debug;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub mod geometry;

use geometry::LocalRing;

/// A footprint transformed into world space.
pub type WorldRing = SmallVec<[Point2d; 12]>;

/// The position, heading and draw scale of the car.
///
/// World space is the canvas: origin at the top left, x to the right and y downwards.
/// A heading of 0 points right and positive headings turn clockwise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// The position of the centre of the car.
    position: Point2d,
    /// The heading in degrees. Not normalised, so it can grow without bound.
    heading: f64,
    /// The number of canvas units per car unit.
    scale: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Point2d::new(0.0, 0.0), 0.0)
    }
}

impl Pose {
    /// Creates a pose at unit scale.
    pub fn new(position: Point2d, heading: f64) -> Self {
        Self {
            position,
            heading,
            scale: 1.0,
        }
    }

    /// Returns a copy of this pose with the given draw scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// The position of the centre of the car.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// The heading in degrees.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// The draw scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Rotates a local point about the origin by the current heading.
    pub fn rotate_point(&self, p: Point2d) -> Point2d {
        Point2d::from_vec(rotate_deg(p.to_vec(), self.heading))
    }

    /// Offsets a point by the current position.
    pub fn translate_point(&self, p: Point2d) -> Point2d {
        p + self.position.to_vec()
    }

    /// Multiplies both coordinates of a point by the draw scale.
    pub fn scale_point(&self, p: Point2d) -> Point2d {
        p * self.scale
    }

    /// Transforms a local footprint into world space, without scaling.
    pub fn to_world(&self, ring: LocalRing) -> WorldRing {
        ring.iter()
            .map(|&(x, y)| self.translate_point(self.rotate_point(Point2d::new(x, y))))
            .collect()
    }

    /// Transforms a local footprint into world space and applies the draw scale.
    pub fn to_world_scaled(&self, ring: LocalRing) -> WorldRing {
        ring.iter()
            .map(|&(x, y)| {
                self.scale_point(self.translate_point(self.rotate_point(Point2d::new(x, y))))
            })
            .collect()
    }

    /// The centre of the car in scaled world space.
    pub fn centre(&self) -> Point2d {
        self.scale_point(self.position)
    }

    /// Moves the car along its heading. Negative distances move it backwards.
    pub fn move_forward(&mut self, distance: f64) {
        let delta: Vector2d = rotate_deg(Vector2d::new(distance, 0.0), self.heading);
        self.position += delta;
        debug!(
            "move_forward {:.2}: position {:?}, heading {:.2}",
            distance, self.position, self.heading
        );
    }

    /// Turns the car by `delta` degrees; positive is clockwise.
    pub fn rotate(&mut self, delta: f64) {
        self.heading += delta;
        debug!(
            "rotate {:.2}: position {:?}, heading {:.2}",
            delta, self.position, self.heading
        );
    }

    /// The car body in scaled world space.
    pub fn body(&self) -> WorldRing {
        self.to_world_scaled(geometry::BODY)
    }

    /// The wheels in scaled world space.
    pub fn wheels(&self) -> [WorldRing; 4] {
        geometry::WHEELS.map(|wheel| self.to_world_scaled(wheel))
    }

    /// The sensors in scaled world space, left to right.
    pub fn sensors(&self) -> [WorldRing; 3] {
        geometry::SENSORS.map(|sensor| self.to_world_scaled(sensor))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn assert_point(p: Point2d, x: f64, y: f64) {
        assert_approx_eq!(p.x, x);
        assert_approx_eq!(p.y, y);
    }

    #[test]
    fn default_pose() {
        let pose = Pose::default();
        assert_eq!(pose.position(), Point2d::new(0.0, 0.0));
        assert_eq!(pose.heading(), 0.0);
        assert_eq!(pose.scale(), 1.0);
    }

    #[test]
    fn rotate_accumulates() {
        let mut pose = Pose::default();
        pose.rotate(45.0);
        assert_eq!(pose.heading(), 45.0);
        pose.rotate(-15.0);
        assert_eq!(pose.heading(), 30.0);
        assert_eq!(pose.position(), Point2d::new(0.0, 0.0));
        pose.rotate(400.0);
        assert_eq!(pose.heading(), 430.0);
    }

    #[test]
    fn zero_heading_is_identity() {
        let pose = Pose::default();
        for (x, y) in [(10.0, 0.0), (10.0, 20.0), (0.0, 20.0), (-10.0, 20.0), (-10.0, -20.0)] {
            assert_eq!(pose.rotate_point(Point2d::new(x, y)), Point2d::new(x, y));
        }
    }

    #[test]
    fn quarter_turn_is_clockwise() {
        let mut pose = Pose::default();
        pose.rotate(90.0);
        assert_point(pose.rotate_point(Point2d::new(1.0, 0.0)), 0.0, 1.0);
        assert_point(pose.rotate_point(Point2d::new(10.0, 0.0)), 0.0, 10.0);
        assert_point(pose.rotate_point(Point2d::new(10.0, 20.0)), -20.0, 10.0);
        assert_point(pose.rotate_point(Point2d::new(0.0, 20.0)), -20.0, 0.0);
        assert_point(pose.rotate_point(Point2d::new(-10.0, 20.0)), -20.0, -10.0);
        assert_point(pose.rotate_point(Point2d::new(-10.0, 0.0)), 0.0, -10.0);
        assert_point(pose.rotate_point(Point2d::new(-10.0, -20.0)), 20.0, -10.0);
    }

    #[test]
    fn move_forward_follows_heading() {
        let mut pose = Pose::default();
        pose.move_forward(10.0);
        assert_eq!(pose.position(), Point2d::new(10.0, 0.0));
        pose.rotate(90.0);
        pose.move_forward(20.0);
        assert_approx_eq!(pose.heading(), 90.0);
        assert_point(pose.position(), 10.0, 20.0);
        pose.move_forward(-5.0);
        assert_point(pose.position(), 10.0, 15.0);
    }

    #[test]
    fn world_transforms() {
        let pose = Pose::new(Point2d::new(100.0, 50.0), 90.0).with_scale(0.5);
        let ring: LocalRing = &[(10.0, 0.0)];
        assert_point(pose.to_world(ring)[0], 100.0, 60.0);
        assert_point(pose.to_world_scaled(ring)[0], 50.0, 30.0);
        assert_point(pose.centre(), 50.0, 25.0);
    }

    #[test]
    fn sensors_are_ordered_left_to_right() {
        // Driving right, the car's left is towards negative y
        let pose = Pose::new(Point2d::new(0.0, 0.0), 0.0);
        let sensors = pose.sensors();
        assert!(sensors[0][0].y < sensors[1][0].y);
        assert!(sensors[1][0].y < sensors[2][0].y);
        assert_eq!(pose.wheels().len(), 4);
        assert_eq!(pose.body().len(), geometry::BODY.len());
    }
}
