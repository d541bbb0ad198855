//! Random track generation.

use crate::error::{Result, SimError};
use crate::math::{
    buffer_pieces, clip_to_convex, polygon_area, sample_uniform, union_outline, BezierCurve2d,
    Point2d,
};
use log::{debug, info};
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// The maximum number of control points between the two end points of a track.
const MAX_INTERIOR_POINTS: usize = 6;

/// The playable area of the canvas, inset from the image edges by a border.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasBounds {
    /// The width of the playable area.
    pub width: u32,
    /// The height of the playable area.
    pub height: u32,
    /// The padding between the image edge and the playable area.
    pub border: u32,
}

impl CanvasBounds {
    /// The top left corner of the playable area.
    pub fn min(&self) -> Point2d {
        Point2d::new(self.border as f64, self.border as f64)
    }

    /// The bottom right corner of the playable area.
    pub fn max(&self) -> Point2d {
        Point2d::new(
            self.width as f64 + self.border as f64,
            self.height as f64 + self.border as f64,
        )
    }

    /// The size of the whole image, including the border on every side.
    pub fn image_size(&self) -> (u64, u64) {
        let border = 2 * self.border as u64;
        (self.width as u64 + border, self.height as u64 + border)
    }

    /// The playable area as a closed 5-point ring.
    pub fn polygon(&self) -> Vec<Point2d> {
        let (min, max) = (self.min(), self.max());
        vec![
            min,
            Point2d::new(max.x, min.y),
            max,
            Point2d::new(min.x, max.y),
            min,
        ]
    }

    /// Returns true if the point lies within the playable area.
    pub fn contains(&self, point: Point2d) -> bool {
        let (min, max) = (self.min(), self.max());
        (min.x..=max.x).contains(&point.x) && (min.y..=max.y).contains(&point.y)
    }
}

/// The attributes of generated tracks.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TrackAttributes {
    /// The playable area the track is drawn in.
    pub canvas: CanvasBounds,
    /// Half the width of the track.
    pub half_width: f64,
    /// The number of points the bezier curve is sampled at.
    pub samples: usize,
}

impl Default for TrackAttributes {
    fn default() -> Self {
        Self {
            canvas: CanvasBounds {
                width: 1500,
                height: 1200,
                border: 100,
            },
            half_width: 7.5,
            samples: 21,
        }
    }
}

impl TrackAttributes {
    /// Checks that tracks can be generated with these attributes.
    pub fn validate(&self) -> Result<()> {
        let canvas = &self.canvas;
        if (canvas.width as usize) < MAX_INTERIOR_POINTS {
            return Err(SimError::InvalidConfig(format!(
                "canvas width {} must be at least {}",
                canvas.width, MAX_INTERIOR_POINTS
            )));
        }
        if (canvas.height as usize) < MAX_INTERIOR_POINTS + 2 {
            return Err(SimError::InvalidConfig(format!(
                "canvas height {} must be at least {}",
                canvas.height,
                MAX_INTERIOR_POINTS + 2
            )));
        }
        let far_edge = canvas.width.max(canvas.height) as u64 + 2 * canvas.border as u64;
        if far_edge > u32::MAX as u64 {
            return Err(SimError::InvalidConfig(format!(
                "canvas of {}x{} with border {} is too large",
                canvas.width, canvas.height, canvas.border
            )));
        }
        if !(self.half_width > 0.0 && self.half_width.is_finite()) {
            return Err(SimError::InvalidConfig(format!(
                "track half width {} must be positive",
                self.half_width
            )));
        }
        if self.samples < 2 {
            return Err(SimError::InvalidConfig(format!(
                "at least 2 curve samples are required, got {}",
                self.samples
            )));
        }
        Ok(())
    }
}

/// The seed of a generated track.
///
/// Floating point seeds are accepted and use their bit pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackSeed(pub u64);

impl From<u64> for TrackSeed {
    fn from(seed: u64) -> Self {
        Self(seed)
    }
}

impl From<u32> for TrackSeed {
    fn from(seed: u32) -> Self {
        Self(seed as u64)
    }
}

impl From<i32> for TrackSeed {
    fn from(seed: i32) -> Self {
        Self(seed as u64)
    }
}

impl From<f64> for TrackSeed {
    fn from(seed: f64) -> Self {
        Self(seed.to_bits())
    }
}

/// A track for the car to follow.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Track {
    /// The bezier control points, ordered left to right.
    control_points: Vec<Point2d>,
    /// Points sampled along the centre line.
    curve: Vec<Point2d>,
    /// The widened curve as a closed ring.
    polygon: Vec<Point2d>,
    /// The heading of the first leg of the control polygon, in degrees.
    start_heading: f64,
    /// The playable area.
    canvas: CanvasBounds,
}

impl Track {
    /// The bezier control points.
    pub fn control_points(&self) -> &[Point2d] {
        &self.control_points
    }

    /// Points sampled evenly in parameter space along the centre line.
    pub fn curve(&self) -> &[Point2d] {
        &self.curve
    }

    /// The closed boundary of the solid track.
    pub fn polygon(&self) -> &[Point2d] {
        &self.polygon
    }

    /// The point where the car starts, which is the first control point.
    pub fn start(&self) -> Point2d {
        self.control_points[0]
    }

    /// The starting heading of the car in degrees.
    pub fn start_heading(&self) -> f64 {
        self.start_heading
    }

    /// The playable area.
    pub fn canvas(&self) -> &CanvasBounds {
        &self.canvas
    }

    /// The playable area as a closed ring.
    pub fn canvas_polygon(&self) -> Vec<Point2d> {
        self.canvas.polygon()
    }
}

/// Generates random tracks.
#[derive(Clone, Debug)]
pub struct TrackGenerator {
    attributes: TrackAttributes,
}

impl TrackGenerator {
    /// Creates a track generator.
    pub fn new(attributes: &TrackAttributes) -> Result<Self> {
        attributes.validate()?;
        Ok(Self {
            attributes: *attributes,
        })
    }

    /// The attributes of the generated tracks.
    pub fn attributes(&self) -> &TrackAttributes {
        &self.attributes
    }

    /// Generates a track from a seed.
    ///
    /// A fresh random source is created from the seed on every call,
    /// so the same seed always produces the same track.
    pub fn generate(&self, seed: impl Into<TrackSeed>) -> Result<Track> {
        let seed = seed.into();
        let mut rng = ChaCha8Rng::seed_from_u64(seed.0);
        let canvas = self.attributes.canvas;
        let border = canvas.border as usize;

        let interior = rng.gen_range(1..=MAX_INTERIOR_POINTS);

        let mut xs = vec![border];
        let mut inner = sample(&mut rng, canvas.width as usize, interior).into_vec();
        inner.sort_unstable();
        xs.extend(inner.into_iter().map(|x| x + border));
        xs.push(border + canvas.width as usize);

        // Not sorted, so the track wanders up and down
        let ys = sample(&mut rng, canvas.height as usize, interior + 2)
            .into_iter()
            .map(|y| y + border);

        let control_points = xs
            .into_iter()
            .zip(ys)
            .map(|(x, y)| Point2d::new(x as f64, y as f64))
            .collect::<Vec<_>>();

        debug!("Track seed {:?}: control points {:?}", seed, control_points);
        let track = self.build(control_points)?;
        info!(
            "Generated track with {} control points, start {:?}, heading {:.2}",
            track.control_points.len(),
            track.start(),
            track.start_heading
        );
        Ok(track)
    }

    /// Builds a track through the given bezier control points.
    pub fn build(&self, control_points: Vec<Point2d>) -> Result<Track> {
        let (first, second) = match control_points.as_slice() {
            [first, second, ..] => (*first, *second),
            _ => {
                return Err(SimError::InvalidConfig(
                    "a track needs at least 2 control points".into(),
                ))
            }
        };

        let canvas = self.attributes.canvas;
        if let Some(p) = control_points.iter().find(|p| !canvas.contains(**p)) {
            return Err(SimError::InvalidConfig(format!(
                "control point {:?} lies outside the canvas",
                p
            )));
        }

        let dx = second.x - first.x;
        if dx == 0.0 {
            return Err(SimError::DegenerateGeometry(format!(
                "vertical first track segment at x = {}",
                first.x
            )));
        }
        let start_heading = ((second.y - first.y) / dx).atan().to_degrees();
        if !start_heading.is_finite() {
            return Err(SimError::DegenerateGeometry(
                "start heading is not finite".into(),
            ));
        }

        let bezier = BezierCurve2d::new(&control_points);
        let curve = sample_uniform(&bezier, self.attributes.samples);
        if curve.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(SimError::DegenerateGeometry(
                "track curve contains non-finite points".into(),
            ));
        }

        // Clipping the convex pieces before joining them keeps the outline free of
        // zero-width slivers along the canvas edge
        let canvas_ring = canvas.polygon();
        let polygon = buffer_pieces(&curve, self.attributes.half_width)
            .map(|pieces| {
                pieces
                    .iter()
                    .map(|piece| clip_to_convex(piece, &canvas_ring))
                    .collect::<Vec<_>>()
            })
            .and_then(|pieces| union_outline(&pieces))
            .filter(|ring| polygon_area(ring) > 0.0)
            .ok_or_else(|| {
                SimError::DegenerateGeometry("track polygon has no area".into())
            })?;

        Ok(Track {
            control_points,
            curve,
            polygon,
            start_heading,
            canvas,
        })
    }
}
