//! Simulated infrared line tracking sensors.

use crate::error::{Result, SimError};
use crate::math::{contains_point, intersection_area, Point2d};
use crate::vehicle::{geometry, Pose};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The reading of a sensor over a light surface.
pub const MIN_READING: f64 = 30.0;

/// The reading of a sensor entirely over the line.
pub const MAX_READING: f64 = 900.0;

/// The readings of the three line tracking sensors, left to right in the driving direction.
///
/// Higher readings mean darker ground, i.e. more of the sensor is over the line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading(pub [f64; 3]);

impl SensorReading {
    pub fn left(&self) -> f64 {
        self.0[0]
    }

    pub fn middle(&self) -> f64 {
        self.0[1]
    }

    pub fn right(&self) -> f64 {
        self.0[2]
    }

    /// Returns true if any sensor reads above `threshold`.
    pub fn any_above(&self, threshold: f64) -> bool {
        self.0.iter().any(|v| *v > threshold)
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.1}, {:.1}, {:.1}]", self.0[0], self.0[1], self.0[2])
    }
}

/// Maps the overlap of the sensor footprints with the track to sensor readings.
#[derive(Clone, Copy, Debug)]
pub struct SensorModel {
    /// The area of one sensor footprint in world space.
    footprint_area: f64,
}

impl SensorModel {
    /// Creates a sensor model for a car drawn at the given scale.
    ///
    /// The footprint area grows with the square of the scale, so readings
    /// stay within [MIN_READING, MAX_READING] at any scale.
    pub fn new(scale: f64) -> Result<Self> {
        let footprint_area = geometry::SENSOR_AREA * scale * scale;
        if !(footprint_area > 0.0 && footprint_area.is_finite()) {
            return Err(SimError::InvalidConfig(format!(
                "sensor footprint area must be positive, got {} at scale {}",
                footprint_area, scale
            )));
        }
        Ok(Self { footprint_area })
    }

    /// The area of one sensor footprint in world space.
    pub fn footprint_area(&self) -> f64 {
        self.footprint_area
    }

    /// Converts an overlap area into a sensor reading.
    pub fn reading_for_area(&self, area: f64) -> f64 {
        let reading = MIN_READING + (MAX_READING - MIN_READING) * area / self.footprint_area;
        reading.clamp(MIN_READING, MAX_READING)
    }

    /// Computes the sensor readings for a car pose over a track.
    pub fn read(&self, track: &[Point2d], pose: &Pose) -> Result<SensorReading> {
        let mut values = [MIN_READING; 3];
        for (value, sensor) in values.iter_mut().zip(pose.sensors()) {
            let area = intersection_area(track, &sensor);
            if area.is_nan() {
                return Err(SimError::DegenerateGeometry(format!(
                    "sensor overlap is NaN at {:?}",
                    pose
                )));
            }
            *value = self.reading_for_area(area);
        }
        Ok(SensorReading(values))
    }

    /// Returns true if at least one sensor overlaps the canvas.
    pub fn any_sensor_within_bounds(&self, canvas: &[Point2d], pose: &Pose) -> bool {
        pose.sensors()
            .iter()
            .any(|sensor| intersection_area(sensor, canvas) > 0.0)
    }

    /// Returns true if the centre of the car lies on the track.
    pub fn follows_line(&self, track: &[Point2d], pose: &Pose) -> bool {
        contains_point(track, pose.centre())
    }
}
