//! Snapshots of the car for rendering an episode.

use crate::math::Point2d;
use crate::track::CanvasBounds;
use crate::vehicle::Pose;
use serde::{Deserialize, Serialize};

/// The world-space geometry of the car at the end of a step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub pose: Pose,
    pub body: Vec<Point2d>,
    pub wheels: Vec<Vec<Point2d>>,
    pub sensors: Vec<Vec<Point2d>>,
}

impl Frame {
    /// Captures the car geometry at the given pose.
    pub fn capture(pose: &Pose) -> Self {
        Self {
            pose: *pose,
            body: pose.body().to_vec(),
            wheels: pose.wheels().iter().map(|w| w.to_vec()).collect(),
            sensors: pose.sensors().iter().map(|s| s.to_vec()).collect(),
        }
    }
}

/// Everything a renderer needs to draw one frame.
pub struct Scene<'a> {
    pub canvas: &'a CanvasBounds,
    pub track: &'a [Point2d],
    pub frame: &'a Frame,
}

/// Turns scenes into images, e.g. for assembling an animation of an episode.
pub trait Renderer {
    type Image;

    fn render(&mut self, scene: &Scene<'_>) -> Self::Image;
}
