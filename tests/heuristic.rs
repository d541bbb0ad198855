//! A naive line tracker driving the simulation like it would drive the real car.

use line_sim::{
    math::Point2d, DefaultReward, RewardParams, SensorReading, SimError, Simulation,
    SimulationAttributes, TrackGenerator, TrackSeed,
};

/// Turns towards whichever side sensor sees the line, and drives straight otherwise.
struct LineTracker {
    sim: Simulation,
    threshold: f64,
    /// The maximum number of turns when searching for the line.
    search_budget: usize,
    /// The maximum number of commands in an episode.
    max_commands: usize,
}

impl LineTracker {
    fn new(sim: Simulation) -> Self {
        Self {
            sim,
            threshold: RewardParams::default().line_threshold,
            search_budget: 15,
            max_commands: 2000,
        }
    }

    fn sensors(&self) -> SensorReading {
        self.sim.line_tracking_sensor_values()
    }

    fn sees_line(&self) -> bool {
        self.sensors().any_above(self.threshold)
    }

    /// Sweeps left, then right, until a sensor sees the line.
    fn find_line(&mut self) -> Result<(), SimError> {
        let mut attempts = 0;
        for turn_left in [true, false] {
            let sweep = if turn_left { 5 } else { 10 };
            for _ in 0..sweep {
                if self.sees_line() || self.sim.is_terminated() {
                    return Ok(());
                }
                match turn_left {
                    true => self.sim.turn_left(100, 50)?,
                    false => self.sim.turn_right(100, 50)?,
                }
                attempts += 1;
            }
        }
        if self.sees_line() || self.sim.is_terminated() || attempts < self.search_budget {
            Ok(())
        } else {
            Err(SimError::LineNotFound { attempts })
        }
    }

    fn follow_line(&mut self) -> Result<(), SimError> {
        while self.sees_line() && !self.done() {
            let sensors = self.sensors();
            if sensors.left() > self.threshold {
                self.sim.turn_left(100, 50)?;
            } else if sensors.right() > self.threshold {
                self.sim.turn_right(100, 50)?;
            } else {
                self.sim.drive_forward(100, 150)?;
            }
        }
        Ok(())
    }

    fn done(&self) -> bool {
        self.sim.is_terminated() || self.sim.log().len() >= self.max_commands
    }

    fn run(&mut self) -> Result<(), SimError> {
        while !self.done() {
            self.find_line()?;
            self.follow_line()?;
        }
        Ok(())
    }
}

#[test]
fn tracker_runs_episodes() {
    for seed in 0..10 {
        let attributes = SimulationAttributes {
            seed: TrackSeed(seed),
            ..Default::default()
        };
        let Ok(sim) = Simulation::new(&attributes) else {
            continue;
        };
        let mut tracker = LineTracker::new(sim);
        match tracker.run() {
            Ok(()) | Err(SimError::LineNotFound { .. }) => {}
            Err(err) => panic!("seed {}: {}", seed, err),
        }
        let log = tracker.sim.log();
        assert!(!log.is_empty());
        assert!(log.records().iter().all(|r| r.reward.is_finite()));
    }
}

#[test]
fn line_not_found_on_a_stub_track() {
    // The track ends long before the sensors, which sit ahead of the car
    let attributes = SimulationAttributes::default();
    let track = TrackGenerator::new(&attributes.track)
        .unwrap()
        .build(vec![Point2d::new(100.0, 700.0), Point2d::new(110.0, 700.0)])
        .unwrap();
    let sim = Simulation::with_track(track, &attributes, DefaultReward::default()).unwrap();
    let mut tracker = LineTracker::new(sim);
    assert!(!tracker.sees_line());
    assert!(matches!(
        tracker.find_line(),
        Err(SimError::LineNotFound { attempts: 15 })
    ));
    assert!(!tracker.sim.is_terminated());
}
