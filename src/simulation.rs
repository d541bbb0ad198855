use crate::error::{Result, SimError};
use crate::frame::{Frame, Renderer, Scene};
use crate::math::Point2d;
use crate::record::{Action, EpisodeLog, LogRecord};
use crate::reward::{DefaultReward, RewardContext, RewardStrategy};
use crate::sensor::{SensorModel, SensorReading};
use crate::track::{Track, TrackAttributes, TrackGenerator, TrackSeed};
use crate::util::RingBuffer;
use crate::vehicle::Pose;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Distance driven per ms of a drive command, in mm.
const DRIVE_MM_PER_MS: f64 = 0.29;

/// Distance driven by a drive command of zero duration, in mm.
const DRIVE_OFFSET_MM: f64 = -10.59;

/// Angle turned per ms of a turn command, in degrees.
const TURN_DEG_PER_MS: f64 = 0.14;

/// Angle turned by a turn command of zero duration, in degrees.
const TURN_OFFSET_DEG: f64 = -2.75;

/// The distance driven by a drive command of the given duration.
/// Very short commands give negative distances.
pub fn drive_distance(duration_ms: u32) -> f64 {
    DRIVE_MM_PER_MS * duration_ms as f64 + DRIVE_OFFSET_MM
}

/// The angle turned by a turn command of the given duration, in degrees.
pub fn turn_angle(duration_ms: u32) -> f64 {
    TURN_DEG_PER_MS * duration_ms as f64 + TURN_OFFSET_DEG
}

/// The attributes of a simulation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SimulationAttributes {
    /// The attributes of the generated track.
    pub track: TrackAttributes,
    /// The seed the track is generated from.
    pub seed: TrackSeed,
    /// Canvas units per car unit.
    pub scale: f64,
    /// Whether to capture a [Frame] after every command.
    pub capture_frames: bool,
    /// The number of previous sensor readings to retain.
    pub history_len: usize,
}

impl Default for SimulationAttributes {
    fn default() -> Self {
        Self {
            track: Default::default(),
            seed: TrackSeed(0),
            scale: 1.0,
            capture_frames: false,
            history_len: 2,
        }
    }
}

impl SimulationAttributes {
    /// Checks that an episode can be run with these attributes.
    pub fn validate(&self) -> Result<()> {
        self.track.validate()?;
        if !(self.scale > 0.0 && self.scale.is_finite()) {
            return Err(SimError::InvalidConfig(format!(
                "draw scale {} must be positive",
                self.scale
            )));
        }
        Ok(())
    }
}

/// The lifecycle state of an episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeState {
    Running,
    /// No sensor touches the canvas any more.
    Terminated,
}

/// A state of the car, quantised for detecting revisits.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct VisitKey {
    x: i64,
    y: i64,
    heading: i64,
    follows_line: bool,
    terminated: bool,
}

impl VisitKey {
    fn new(position: Point2d, heading: f64, follows_line: bool, terminated: bool) -> Self {
        Self {
            x: position.x.round() as i64,
            y: position.y.round() as i64,
            heading: (heading.round() as i64).rem_euclid(360),
            follows_line,
            terminated,
        }
    }
}

/// An episode of a car following a line.
///
/// Commands are synchronous: each one moves the car, then updates the sensors,
/// the termination state and the reward before returning.
pub struct Simulation<R = DefaultReward> {
    /// The track being followed.
    track: Track,
    /// The playable area as a closed ring.
    canvas: Vec<Point2d>,
    /// The pose of the car, in car units.
    pose: Pose,
    /// Maps sensor footprints to readings.
    sensor_model: SensorModel,
    /// Computes the reward after every command.
    reward_strategy: R,
    /// The current lifecycle state.
    state: EpisodeState,
    /// The latest sensor readings.
    sensors: SensorReading,
    /// The sensor readings before the latest, oldest first.
    history: RingBuffer<SensorReading>,
    /// Whether the centre of the car is on the track.
    follows_line: bool,
    /// Simulated time since the start of the episode, in s.
    elapsed: f64,
    /// The rightmost canvas x-coordinate the car has reached.
    max_x: f64,
    /// The states reached so far.
    visited: HashSet<VisitKey>,
    /// The latest reward.
    reward: f64,
    /// One record per command.
    log: EpisodeLog,
    /// Captured frames and their display durations in ms, if enabled.
    frames: Option<Vec<(Frame, u32)>>,
}

impl Simulation<DefaultReward> {
    /// Creates a simulation using the default reward policy.
    pub fn new(attributes: &SimulationAttributes) -> Result<Self> {
        Self::with_reward(attributes, DefaultReward::default())
    }
}

impl<R: RewardStrategy> Simulation<R> {
    /// Creates a simulation on a track generated from the attributes' seed.
    pub fn with_reward(attributes: &SimulationAttributes, reward_strategy: R) -> Result<Self> {
        attributes.validate()?;
        let track = TrackGenerator::new(&attributes.track)?.generate(attributes.seed)?;
        Self::with_track(track, attributes, reward_strategy)
    }

    /// Creates a simulation on an existing track.
    /// The `track` and `seed` attributes are ignored.
    pub fn with_track(
        track: Track,
        attributes: &SimulationAttributes,
        reward_strategy: R,
    ) -> Result<Self> {
        attributes.validate()?;
        let sensor_model = SensorModel::new(attributes.scale)?;
        let canvas = track.canvas_polygon();

        // Place the car so its scaled centre lies on the start of the track
        let start = track.start() / attributes.scale;
        let pose = Pose::new(start, track.start_heading()).with_scale(attributes.scale);

        let sensors = sensor_model.read(track.polygon(), &pose)?;
        let follows_line = sensor_model.follows_line(track.polygon(), &pose);
        if !sensors.any_above(crate::sensor::MIN_READING) {
            warn!("No sensor is over the track at the start of the episode");
        }

        let mut visited = HashSet::new();
        visited.insert(VisitKey::new(pose.centre(), pose.heading(), follows_line, false));

        Ok(Self {
            max_x: pose.centre().x,
            track,
            canvas,
            pose,
            sensor_model,
            reward_strategy,
            state: EpisodeState::Running,
            sensors,
            history: RingBuffer::new(attributes.history_len),
            follows_line,
            elapsed: 0.0,
            visited,
            reward: 0.0,
            log: EpisodeLog::new(),
            frames: attributes.capture_frames.then(Vec::new),
        })
    }

    /// Drives forward for `duration_ms`. The `speed` is recorded but does not affect the motion.
    pub fn drive_forward(&mut self, speed: u8, duration_ms: u32) -> Result<()> {
        self.ensure_running()?;
        let mut pose = self.pose;
        pose.move_forward(drive_distance(duration_ms));
        self.step(pose, Action::DriveForward, speed, duration_ms)
    }

    /// Turns anticlockwise for `duration_ms`. The `speed` is recorded but does not affect the motion.
    pub fn turn_left(&mut self, speed: u8, duration_ms: u32) -> Result<()> {
        self.ensure_running()?;
        let mut pose = self.pose;
        pose.rotate(-turn_angle(duration_ms));
        self.step(pose, Action::TurnLeft, speed, duration_ms)
    }

    /// Turns clockwise for `duration_ms`. The `speed` is recorded but does not affect the motion.
    pub fn turn_right(&mut self, speed: u8, duration_ms: u32) -> Result<()> {
        self.ensure_running()?;
        let mut pose = self.pose;
        pose.rotate(turn_angle(duration_ms));
        self.step(pose, Action::TurnRight, speed, duration_ms)
    }

    /// Issues a command by its [Action].
    pub fn apply(&mut self, action: Action, speed: u8, duration_ms: u32) -> Result<()> {
        match action {
            Action::DriveForward => self.drive_forward(speed, duration_ms),
            Action::TurnLeft => self.turn_left(speed, duration_ms),
            Action::TurnRight => self.turn_right(speed, duration_ms),
        }
    }

    fn ensure_running(&self) -> Result<()> {
        match self.state {
            EpisodeState::Running => Ok(()),
            EpisodeState::Terminated => Err(SimError::EpisodeTerminated),
        }
    }

    /// Moves the car to `pose` and updates everything derived from it.
    ///
    /// Nothing is changed if an error is returned.
    fn step(&mut self, pose: Pose, action: Action, speed: u8, duration_ms: u32) -> Result<()> {
        let polygon = self.track.polygon();
        let sensors = self.sensor_model.read(polygon, &pose)?;
        let follows_line = self.sensor_model.follows_line(polygon, &pose);
        let terminated = !self.sensor_model.any_sensor_within_bounds(&self.canvas, &pose);
        let elapsed = self.elapsed + duration_ms as f64 / 1000.0;

        let centre = pose.centre();
        let advanced = centre.x > self.max_x;
        let key = VisitKey::new(centre, pose.heading(), follows_line, terminated);
        let revisited = self.visited.contains(&key);

        let reward = self.reward_strategy.reward(&RewardContext {
            elapsed,
            sensors,
            position: centre,
            heading: pose.heading(),
            follows_line,
            is_terminated: terminated,
            revisited,
            advanced,
        });
        if reward.is_nan() {
            return Err(SimError::DegenerateGeometry(format!(
                "reward is NaN at {:?}",
                pose
            )));
        }

        self.pose = pose;
        self.history.push(std::mem::replace(&mut self.sensors, sensors));
        self.follows_line = follows_line;
        if terminated {
            self.state = EpisodeState::Terminated;
        }
        self.elapsed = elapsed;
        self.max_x = self.max_x.max(centre.x);
        self.visited.insert(key);
        self.reward = reward;
        self.log.push(LogRecord {
            action,
            speed,
            duration_ms,
            position: centre,
            heading: pose.heading(),
            reward,
        });
        if let Some(frames) = &mut self.frames {
            frames.push((Frame::capture(&pose), duration_ms));
        }

        debug!(
            "{}({}, {}): sensors {}, follows line {}, reward {:.2}",
            action, speed, duration_ms, sensors, follows_line, reward
        );
        if terminated {
            info!(
                "Episode terminated after {} commands and {:.2}s, total reward {:.2}",
                self.log.len(),
                elapsed,
                self.log.total_reward()
            );
        }
        Ok(())
    }

    /// The latest sensor readings, left to right.
    pub fn line_tracking_sensor_values(&self) -> SensorReading {
        self.sensors
    }

    /// The readings before the latest, oldest first.
    /// Padded with zeros until enough commands have been issued.
    pub fn previous_line_tracking_sensor_values(&self) -> Vec<SensorReading> {
        self.history.iter().copied().collect()
    }

    /// The simulated time since the start of the episode, in s.
    pub fn duration(&self) -> f64 {
        self.elapsed
    }

    /// Whether the episode has terminated.
    pub fn is_terminated(&self) -> bool {
        self.state == EpisodeState::Terminated
    }

    /// The lifecycle state of the episode.
    pub fn state(&self) -> EpisodeState {
        self.state
    }

    /// Whether the centre of the car is on the track.
    pub fn car_follows_line(&self) -> bool {
        self.follows_line
    }

    /// The reward earned by the latest command.
    pub fn reward(&self) -> f64 {
        self.reward
    }

    /// The pose of the car.
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// The track being followed.
    pub fn track(&self) -> &Track {
        &self.track
    }

    /// The record of every command so far.
    pub fn log(&self) -> &EpisodeLog {
        &self.log
    }

    /// Ends the episode, returning its log.
    pub fn into_log(self) -> EpisodeLog {
        self.log
    }

    /// The captured frames and their display durations in ms.
    /// Empty unless frame capture is enabled.
    pub fn frames(&self) -> &[(Frame, u32)] {
        self.frames.as_deref().unwrap_or_default()
    }

    /// Renders every captured frame in order.
    pub fn render_frames<V: Renderer>(&self, renderer: &mut V) -> Vec<(V::Image, u32)> {
        self.frames()
            .iter()
            .map(|(frame, duration_ms)| {
                let scene = Scene {
                    canvas: self.track.canvas(),
                    track: self.track.polygon(),
                    frame,
                };
                (renderer.render(&scene), *duration_ms)
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::track::CanvasBounds;
    use assert_approx_eq::assert_approx_eq;

    /// A simulation on a straight horizontal track across the middle of the canvas.
    fn straight(capture_frames: bool) -> Simulation {
        let attributes = SimulationAttributes {
            capture_frames,
            ..Default::default()
        };
        let track = TrackGenerator::new(&attributes.track)
            .unwrap()
            .build(vec![
                Point2d::new(100.0, 700.0),
                Point2d::new(850.0, 700.0),
                Point2d::new(1600.0, 700.0),
            ])
            .unwrap();
        Simulation::with_track(track, &attributes, DefaultReward::default()).unwrap()
    }

    #[test]
    fn motion_laws() {
        assert_approx_eq!(drive_distance(1000), 279.41);
        assert_approx_eq!(drive_distance(0), -10.59);
        assert_approx_eq!(turn_angle(50), 4.25);
        assert_approx_eq!(turn_angle(400), 53.25);
    }

    #[test]
    fn starts_on_track() {
        let sim = straight(false);
        assert_eq!(sim.state(), EpisodeState::Running);
        assert!(!sim.is_terminated());
        assert!(sim.car_follows_line());
        assert_eq!(sim.pose().position(), Point2d::new(100.0, 700.0));
        assert_eq!(sim.duration(), 0.0);
        assert_approx_eq!(sim.line_tracking_sensor_values().middle(), 900.0);
        assert!(sim.log().is_empty());
    }

    #[test]
    fn driving_along_the_line_is_rewarded() {
        let mut sim = straight(false);
        sim.drive_forward(100, 150).unwrap();
        assert_approx_eq!(sim.pose().position().x, 100.0 + drive_distance(150));
        assert_approx_eq!(sim.duration(), 0.15);
        assert!(sim.car_follows_line());
        assert_approx_eq!(sim.reward(), 100.0 * (1.0 - 0.15 / 60.0));
        assert_eq!(sim.log().len(), 1);
        assert_eq!(sim.log().records()[0].action, Action::DriveForward);
    }

    #[test]
    fn speed_does_not_affect_motion() {
        let mut slow = straight(false);
        let mut fast = straight(false);
        slow.drive_forward(10, 500).unwrap();
        fast.drive_forward(255, 500).unwrap();
        assert_eq!(slow.pose().position(), fast.pose().position());
    }

    #[test]
    fn short_drives_move_backwards() {
        let mut sim = straight(false);
        sim.drive_forward(100, 10).unwrap();
        assert_approx_eq!(sim.pose().position().x, 100.0 + 0.29 * 10.0 - 10.59);
        // Moving left never earns a reward
        assert_eq!(sim.reward(), 0.0);
    }

    #[test]
    fn turns_change_heading_only() {
        let mut sim = straight(false);
        sim.turn_right(100, 400).unwrap();
        assert_approx_eq!(sim.pose().heading(), 53.25);
        sim.turn_left(100, 400).unwrap();
        assert_approx_eq!(sim.pose().heading(), 0.0);
        assert_eq!(sim.pose().position(), Point2d::new(100.0, 700.0));
    }

    #[test]
    fn returning_to_a_state_earns_nothing() {
        let mut sim = straight(false);
        sim.turn_right(100, 400).unwrap();
        sim.turn_left(100, 400).unwrap();
        // Back at the start pose, which was visited at construction
        assert_eq!(sim.reward(), 0.0);
    }

    #[test]
    fn history_is_zero_padded() {
        let mut sim = straight(false);
        assert_eq!(
            sim.previous_line_tracking_sensor_values(),
            vec![SensorReading::default(); 2]
        );
        let initial = sim.line_tracking_sensor_values();
        sim.turn_right(100, 400).unwrap();
        let history = sim.previous_line_tracking_sensor_values();
        assert_eq!(history, vec![SensorReading::default(), initial]);
        let first = sim.line_tracking_sensor_values();
        sim.turn_left(100, 400).unwrap();
        sim.turn_left(100, 400).unwrap();
        let history = sim.previous_line_tracking_sensor_values();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], first);
    }

    #[test]
    fn terminates_past_the_right_edge() {
        let mut sim = straight(false);
        let mut steps = 0;
        while !sim.is_terminated() {
            sim.drive_forward(100, 1000).unwrap();
            steps += 1;
            assert!(steps < 20);
        }
        assert!(sim.pose().centre().x > 1600.0 - 100.0);
        assert!(sim.car_follows_line() || sim.pose().centre().x > 1600.0);
        assert!(matches!(
            sim.drive_forward(100, 1000),
            Err(SimError::EpisodeTerminated)
        ));
        assert_eq!(sim.log().len(), steps);
    }

    #[test]
    fn captures_frames_when_enabled() {
        struct CountSensors;
        impl Renderer for CountSensors {
            type Image = usize;
            fn render(&mut self, scene: &Scene<'_>) -> usize {
                scene.frame.sensors.len()
            }
        }

        let mut sim = straight(true);
        sim.drive_forward(100, 150).unwrap();
        sim.turn_left(100, 50).unwrap();
        assert_eq!(sim.frames().len(), 2);
        assert_eq!(sim.frames()[0].1, 150);
        assert_eq!(sim.frames()[1].0.pose, *sim.pose());
        assert_eq!(sim.render_frames(&mut CountSensors), vec![(3, 150), (3, 50)]);

        let mut plain = straight(false);
        plain.drive_forward(100, 150).unwrap();
        assert!(plain.frames().is_empty());
    }

    #[test]
    fn custom_reward_strategy() {
        let attributes = SimulationAttributes::default();
        let track = TrackGenerator::new(&attributes.track)
            .unwrap()
            .build(vec![Point2d::new(100.0, 700.0), Point2d::new(1600.0, 700.0)])
            .unwrap();
        let mut sim =
            Simulation::with_track(track, &attributes, |ctx: &RewardContext| ctx.heading).unwrap();
        sim.turn_right(100, 400).unwrap();
        assert_approx_eq!(sim.reward(), 53.25);
    }

    #[test]
    fn failed_command_changes_nothing() {
        let attributes = SimulationAttributes::default();
        let track = TrackGenerator::new(&attributes.track)
            .unwrap()
            .build(vec![Point2d::new(100.0, 700.0), Point2d::new(1600.0, 700.0)])
            .unwrap();
        let mut sim =
            Simulation::with_track(track, &attributes, |_: &RewardContext| f64::NAN).unwrap();
        let pose = *sim.pose();
        let sensors = sim.line_tracking_sensor_values();
        let history = sim.previous_line_tracking_sensor_values();

        assert!(matches!(
            sim.drive_forward(100, 1000),
            Err(SimError::DegenerateGeometry(_))
        ));
        assert_eq!(*sim.pose(), pose);
        assert_eq!(sim.line_tracking_sensor_values(), sensors);
        assert_eq!(sim.previous_line_tracking_sensor_values(), history);
        assert_eq!(sim.duration(), 0.0);
        assert_eq!(sim.reward(), 0.0);
        assert!(sim.car_follows_line());
        assert_eq!(sim.state(), EpisodeState::Running);
        assert!(sim.log().is_empty());
        assert_eq!(sim.max_x, 100.0);
        assert_eq!(sim.visited.len(), 1);
    }

    #[test]
    fn rejects_bad_scale() {
        let attributes = SimulationAttributes {
            scale: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            Simulation::new(&attributes),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn scaled_car_starts_on_track() {
        let attributes = SimulationAttributes {
            scale: 0.5,
            track: TrackAttributes {
                canvas: CanvasBounds {
                    width: 1500,
                    height: 1200,
                    border: 100,
                },
                ..Default::default()
            },
            ..Default::default()
        };
        let track = TrackGenerator::new(&attributes.track)
            .unwrap()
            .build(vec![Point2d::new(100.0, 700.0), Point2d::new(1600.0, 700.0)])
            .unwrap();
        let sim = Simulation::with_track(track, &attributes, DefaultReward::default()).unwrap();
        assert_eq!(sim.pose().centre(), Point2d::new(100.0, 700.0));
        assert!(sim.car_follows_line());
        for v in sim.line_tracking_sensor_values().0 {
            assert!((30.0..=900.0).contains(&v));
        }
    }
}
