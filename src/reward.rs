//! Reward functions for training a line following controller.

use crate::error::{Result, SimError};
use crate::math::Point2d;
use crate::sensor::SensorReading;
use serde::{Deserialize, Serialize};

/// The state of the simulation after a step, as seen by a reward function.
#[derive(Clone, Copy, Debug)]
pub struct RewardContext {
    /// Simulated seconds elapsed since the start of the episode.
    pub elapsed: f64,
    /// The latest sensor readings.
    pub sensors: SensorReading,
    /// The position of the car.
    pub position: Point2d,
    /// The heading of the car in degrees.
    pub heading: f64,
    /// Whether the centre of the car is on the track.
    pub follows_line: bool,
    /// Whether the episode has terminated.
    pub is_terminated: bool,
    /// Whether this exact state was already reached earlier in the episode.
    pub revisited: bool,
    /// Whether the car moved further right than ever before in the episode.
    pub advanced: bool,
}

/// Maps simulation state to a scalar training signal.
pub trait RewardStrategy {
    fn reward(&self, ctx: &RewardContext) -> f64;
}

impl<F: Fn(&RewardContext) -> f64> RewardStrategy for F {
    fn reward(&self, ctx: &RewardContext) -> f64 {
        self(ctx)
    }
}

/// The parameters of [DefaultReward].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RewardParams {
    /// A sensor reading above this value means the sensor is over the line.
    pub line_threshold: f64,
    /// Reward while the middle sensor is over the line.
    pub middle_reward: f64,
    /// Reward while only a side sensor is over the line.
    pub side_reward: f64,
    /// Reward while the car is on the line but no sensor sees it.
    pub on_line_no_sensor: f64,
    /// Penalty while neither the car nor any sensor is on the line.
    pub lost_line: f64,
    /// Terminal rewards are this many multiples of `middle_reward`.
    pub max_steps: f64,
    /// The time budget of an episode in seconds.
    pub max_episode_secs: f64,
    /// Leaving the canvas left of this x-coordinate is penalised even on the line.
    /// `None` disables the check.
    pub min_exit_x: Option<f64>,
}

impl Default for RewardParams {
    fn default() -> Self {
        Self {
            line_threshold: 656.0,
            middle_reward: 100.0,
            side_reward: 20.0,
            on_line_no_sensor: 10.0,
            lost_line: -300.0,
            max_steps: 150.0,
            max_episode_secs: 60.0,
            min_exit_x: Some(500.0),
        }
    }
}

impl RewardParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.max_episode_secs > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "episode time budget {} must be positive",
                self.max_episode_secs
            )));
        }
        Ok(())
    }
}

/// The default reward policy.
///
/// Rewards keeping the sensors over the line, decaying as the time budget runs out,
/// with a large bonus for leaving the canvas on the line and a large penalty for
/// leaving it anywhere else, or too far to the left. Revisited states and steps that do not advance the
/// car to the right earn nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultReward {
    pub params: RewardParams,
}

impl DefaultReward {
    pub fn new(params: RewardParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// The fraction of the time budget that remains, between 0 and 1.
    fn remaining(&self, elapsed: f64) -> f64 {
        (1.0 - elapsed / self.params.max_episode_secs).clamp(0.0, 1.0)
    }
}

impl RewardStrategy for DefaultReward {
    fn reward(&self, ctx: &RewardContext) -> f64 {
        let p = &self.params;
        if ctx.revisited || !ctx.advanced {
            return 0.0;
        }

        let remaining = self.remaining(ctx.elapsed);
        let terminal = p.max_steps * p.middle_reward;
        if ctx.is_terminated {
            let early_exit = p.min_exit_x.map_or(false, |x| ctx.position.x < x);
            return match ctx.follows_line && !early_exit {
                true => terminal * remaining,
                false => -terminal,
            };
        }

        let middle = ctx.sensors.middle() > p.line_threshold;
        let side = ctx.sensors.left() > p.line_threshold || ctx.sensors.right() > p.line_threshold;
        match (ctx.follows_line, middle, side) {
            (true, true, _) => p.middle_reward * remaining,
            (true, false, true) => p.side_reward * remaining,
            (true, false, false) => p.on_line_no_sensor * remaining,
            (false, true, _) => 0.5 * p.middle_reward * remaining,
            (false, false, true) => 0.5 * p.side_reward * remaining,
            (false, false, false) => p.lost_line,
        }
    }
}
