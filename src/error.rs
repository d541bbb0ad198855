use thiserror::Error;

/// Errors produced by the simulator.
#[derive(Error, Debug)]
pub enum SimError {
    /// The generated geometry has no well-defined value, e.g. a vertical
    /// first track segment or a NaN sensor reading.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
    /// No rotation within the search budget brought a sensor over the line.
    #[error("line not found after {attempts} attempts")]
    LineNotFound { attempts: usize },
    /// A construction parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A command was issued after the episode terminated.
    #[error("episode has already terminated")]
    EpisodeTerminated,
    /// The episode log could not be serialised.
    #[error("failed to export episode log")]
    Export(#[from] serde_json::Error),
}

/// Convenience alias for results using [SimError].
pub type Result<T> = std::result::Result<T, SimError>;
