pub mod engine;
pub mod error;
pub mod features;
pub mod model;
pub mod teams;

pub use engine::{Prediction, Predictor};
pub use features::MatchState;
pub use model::{LinearRegressionModel, ScoreModel};
