// Typed errors with thiserror. Configuration errors are fail-fast at
// construction time; nothing in the per-frame path is fallible.

use thiserror::Error;

/// Engine error types.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Snap interval has end {end} before start {start}")]
    SnapInverted { start: f64, end: f64 },

    #[error("Snap interval [{start}, {end}] overlaps the previous interval ending at {previous_end}")]
    SnapOverlap {
        start: f64,
        end: f64,
        previous_end: f64,
    },

    #[error("Scene needs at least two of start/end/duration")]
    SceneUnderspecified,

    #[error("Scene range is inverted: start {start} is past end {end}")]
    SceneInverted { start: f64, end: f64 },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = EngineError::SnapOverlap {
            start: 100.0,
            end: 200.0,
            previous_end: 150.0,
        };
        assert!(err.to_string().contains("overlaps"));
        assert!(err.to_string().contains("150"));
    }
}
