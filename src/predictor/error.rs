use thiserror::Error;

/// Reasons a prediction is refused: the match state fails validation, or
/// the model output cannot be reported as a score.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("Batting and Bowling teams must be different!")]
    SameTeams,

    #[error("unknown team '{0}'")]
    UnknownTeam(String),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("overs {0} is not a valid over count (use overs.balls with balls 0-5, e.g. 10.2)")]
    InvalidOvers(f64),

    #[error("model output {0} is too large to report as a score")]
    ScoreOverflow(f64),
}

/// Failures loading or accepting a trained model artifact.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model expects {actual} features but the feature vector has {expected}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("model parameter {0} is not a finite number")]
    NonFinite(String),
}
