//! The per-step log of an episode.

use crate::error::Result;
use crate::math::Point2d;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A command issued to the car.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    DriveForward,
    TurnLeft,
    TurnRight,
}

impl Action {
    /// The name of the command as issued to the real car.
    pub fn name(&self) -> &'static str {
        match self {
            Action::DriveForward => "driveForward",
            Action::TurnLeft => "turnLeft",
            Action::TurnRight => "turnRight",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The outcome of a single command.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// The command.
    pub action: Action,
    /// The requested motor speed, 0-255.
    pub speed: u8,
    /// The duration of the command in ms.
    pub duration_ms: u32,
    /// The position of the car after the command.
    pub position: Point2d,
    /// The heading of the car after the command, in degrees.
    pub heading: f64,
    /// The reward earned by the command.
    pub reward: f64,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(speed={}, duration={}ms) -> position=({:.2}, {:.2}) heading={:.2} reward={:.2}",
            self.action,
            self.speed,
            self.duration_ms,
            self.position.x,
            self.position.y,
            self.heading,
            self.reward
        )
    }
}

/// An append-only record of every command in an episode.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EpisodeLog {
    records: Vec<LogRecord>,
}

impl EpisodeLog {
    pub fn new() -> Self {
        Default::default()
    }

    pub(crate) fn push(&mut self, record: LogRecord) {
        self.records.push(record);
    }

    /// The records in the order the commands were issued.
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The sum of the rewards of every record.
    pub fn total_reward(&self) -> f64 {
        self.records.iter().map(|r| r.reward).sum()
    }

    /// Serialises the log as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a log previously produced by [EpisodeLog::to_json].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for EpisodeLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, record) in self.records.iter().enumerate() {
            writeln!(f, "{:>4}: {}", idx, record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(action: Action, reward: f64) -> LogRecord {
        LogRecord {
            action,
            speed: 100,
            duration_ms: 150,
            position: Point2d::new(120.5, 340.25),
            heading: -12.5,
            reward,
        }
    }

    #[test]
    fn json_contains_every_field() {
        let mut log = EpisodeLog::new();
        log.push(record(Action::TurnLeft, 20.0));
        let json = log.to_json().unwrap();
        for needle in ["turnLeft", "speed", "duration_ms", "120.5", "340.25", "-12.5", "20.0"] {
            assert!(json.contains(needle), "missing {} in {}", needle, json);
        }
        let parsed = EpisodeLog::from_json(&json).unwrap();
        assert_eq!(parsed.records(), log.records());
    }

    #[test]
    fn text_has_one_line_per_record() {
        let mut log = EpisodeLog::new();
        log.push(record(Action::DriveForward, 100.0));
        log.push(record(Action::TurnRight, 0.0));
        let text = log.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().next().unwrap().contains("driveForward(speed=100, duration=150ms)"));
        assert_eq!(log.total_reward(), 100.0);
    }
}
