//! A kinematic simulator of a robot car following a line on a randomly generated track.
//!
//! A [TrackGenerator] draws a random bezier curve across the canvas and widens it into
//! a solid track. A [Simulation] then places the car at the start of the track and
//! accepts the same drive and turn commands as the real car, reporting the readings of
//! its three infrared line tracking sensors and a reward after every command.

pub use cgmath;
pub use error::{Result, SimError};
pub use frame::{Frame, Renderer, Scene};
pub use record::{Action, EpisodeLog, LogRecord};
pub use reward::{DefaultReward, RewardContext, RewardParams, RewardStrategy};
pub use sensor::{SensorModel, SensorReading, MAX_READING, MIN_READING};
pub use simulation::{drive_distance, turn_angle, EpisodeState, Simulation, SimulationAttributes};
pub use track::{CanvasBounds, Track, TrackAttributes, TrackGenerator, TrackSeed};
pub use util::{Interval, RingBuffer};
pub use vehicle::{geometry, Pose, WorldRing};

mod error;
mod frame;
pub mod math;
mod record;
mod reward;
mod sensor;
mod simulation;
mod track;
mod util;
mod vehicle;
