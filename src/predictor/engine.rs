use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::{ModelError, PredictError};
use super::features::{MatchState, FEATURE_COUNT};
use super::model::ScoreModel;

const INNINGS_BALLS: u32 = 120;

/// Predicted final score plus the match summary shown under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Model output floored at current runs and rounded
    pub predicted_score: u32,
    /// Unclamped model output, kept for diagnostics
    pub model_output: f64,
    /// "runs/wickets"
    pub current_score: String,
    pub overs: f64,
    /// Legal deliveries left in a 20-over innings
    pub balls_remaining: u32,
    /// Runs per over across the last five overs
    pub run_rate_last_5: f64,
    /// Runs still to come according to the prediction
    pub runs_remaining: u32,
    /// "predicted/wickets"
    pub projected_total: String,
    pub predicted_at: DateTime<Utc>,
}

/// Wraps the trained model and turns a match state into a [`Prediction`].
#[derive(Clone)]
pub struct Predictor {
    model: Arc<dyn ScoreModel>,
}

impl Predictor {
    /// Refuses a model whose input width differs from the feature vector.
    pub fn new(model: Arc<dyn ScoreModel>) -> Result<Self, ModelError> {
        if model.feature_count() != FEATURE_COUNT {
            return Err(ModelError::FeatureCount {
                expected: FEATURE_COUNT,
                actual: model.feature_count(),
            });
        }
        Ok(Predictor { model })
    }

    pub fn model(&self) -> &dyn ScoreModel {
        self.model.as_ref()
    }

    /// Validate, score, and summarise one match state.
    pub fn predict(&self, state: &MatchState) -> Result<Prediction, PredictError> {
        state.validate()?;

        let features = state.feature_vector();
        let raw = self.model.score(&features);
        if !raw.is_finite() {
            warn!(
                "{} returned non-finite output {} for {} vs {}",
                self.model.name(),
                raw,
                state.batting_team,
                state.bowling_team
            );
        }
        let predicted_score = final_score(raw, state.runs).map_err(|e| {
            warn!(
                "{} returned {} for {} vs {}",
                self.model.name(),
                raw,
                state.batting_team,
                state.bowling_team
            );
            e
        })?;

        debug!(
            "{} {}/{} after {} overs → raw {:.2}, predicted {}",
            state.batting_team, state.runs, state.wickets, state.overs, raw, predicted_score
        );

        Ok(Prediction {
            predicted_score,
            model_output: raw,
            current_score: format!("{}/{}", state.runs, state.wickets),
            overs: state.overs,
            balls_remaining: INNINGS_BALLS.saturating_sub(state.balls_bowled()),
            run_rate_last_5: state.runs_last_5 as f64 / 5.0,
            runs_remaining: predicted_score.saturating_sub(state.runs),
            projected_total: format!("{}/{}", predicted_score, state.wickets.min(10)),
            predicted_at: Utc::now(),
        })
    }
}

/// Floor the model output at the runs already scored, then round to the
/// nearest run (halves away from zero). Non-finite output collapses to
/// `runs`; finite output beyond `u32::MAX` is refused rather than saturated.
pub fn final_score(model_output: f64, runs: u32) -> Result<u32, PredictError> {
    // f64::max ignores NaN, so a NaN output falls through to `runs`.
    let floored = model_output.max(runs as f64);
    if floored.is_infinite() {
        return Ok(runs);
    }
    let rounded = floored.round();
    if rounded > u32::MAX as f64 {
        return Err(PredictError::ScoreOverflow(model_output));
    }
    Ok(rounded as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::model::LinearRegressionModel;
    use crate::predictor::teams::TEAMS;
    use approx::assert_relative_eq;

    struct FixedModel {
        output: f64,
        width: usize,
    }

    impl ScoreModel for FixedModel {
        fn score(&self, _features: &[f64]) -> f64 {
            self.output
        }
        fn feature_count(&self) -> usize {
            self.width
        }
        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn fixed(output: f64) -> Predictor {
        Predictor::new(Arc::new(FixedModel {
            output,
            width: FEATURE_COUNT,
        }))
        .unwrap()
    }

    fn bundled() -> Predictor {
        let model = LinearRegressionModel::from_json_str(include_str!(
            "../../models/linear_regression_model.json"
        ))
        .unwrap();
        Predictor::new(Arc::new(model)).unwrap()
    }

    fn mumbai_vs_chennai() -> MatchState {
        MatchState {
            batting_team: "Mumbai Indians".into(),
            bowling_team: "Chennai Super Kings".into(),
            overs: 10.0,
            runs: 80,
            wickets: 2,
            runs_last_5: 40,
            wickets_last_5: 1,
        }
    }

    #[test]
    fn rejects_model_with_wrong_width() {
        let res = Predictor::new(Arc::new(FixedModel {
            output: 0.0,
            width: 20,
        }));
        assert!(matches!(
            res,
            Err(ModelError::FeatureCount {
                expected: 21,
                actual: 20
            })
        ));
    }

    #[test]
    fn bundled_model_on_reference_state() {
        // 90 + 0.95*80 - 4.5*2 - 2*10 + 0.35*40 - 1.8*1 + 2.6 (MI bat) - 2.2 (CSK bowl)
        let p = bundled().predict(&mumbai_vs_chennai()).unwrap();
        assert_relative_eq!(p.model_output, 149.6, epsilon = 1e-9);
        assert_eq!(p.predicted_score, 150);
    }

    #[test]
    fn underestimate_is_floored_at_current_runs() {
        let state = MatchState {
            runs: 300,
            ..mumbai_vs_chennai()
        };
        let p = fixed(240.0).predict(&state).unwrap();
        assert_eq!(p.predicted_score, 300);
        assert_eq!(p.runs_remaining, 0);
    }

    #[test]
    fn negative_output_is_floored() {
        let state = MatchState {
            runs: 0,
            ..mumbai_vs_chennai()
        };
        assert_eq!(fixed(-35.0).predict(&state).unwrap().predicted_score, 0);
    }

    #[test]
    fn same_teams_never_reach_the_model() {
        let state = MatchState {
            bowling_team: "Mumbai Indians".into(),
            ..mumbai_vs_chennai()
        };
        assert_eq!(
            fixed(170.0).predict(&state).unwrap_err(),
            PredictError::SameTeams
        );
    }

    #[test]
    fn summary_fields() {
        let p = fixed(171.4).predict(&mumbai_vs_chennai()).unwrap();
        assert_eq!(p.predicted_score, 171);
        assert_eq!(p.current_score, "80/2");
        assert_relative_eq!(p.run_rate_last_5, 8.0, epsilon = 1e-9);
        assert_eq!(p.runs_remaining, 91);
        assert_eq!(p.projected_total, "171/2");
        assert_eq!(p.balls_remaining, 60);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(final_score(150.5, 80), Ok(151));
        assert_eq!(final_score(150.49, 80), Ok(150));
        assert_eq!(final_score(79.5, 80), Ok(80));
    }

    #[test]
    fn non_finite_output_collapses_to_runs() {
        assert_eq!(final_score(f64::NAN, 95), Ok(95));
        assert_eq!(final_score(f64::INFINITY, 95), Ok(95));
        assert_eq!(final_score(f64::NEG_INFINITY, 95), Ok(95));
    }

    #[test]
    fn oversized_output_is_refused_not_saturated() {
        assert_eq!(
            final_score(1e20, 80),
            Err(PredictError::ScoreOverflow(1e20))
        );
        assert_eq!(final_score(u32::MAX as f64, 80), Ok(u32::MAX));
        assert_eq!(
            fixed(1e20).predict(&mumbai_vs_chennai()).unwrap_err(),
            PredictError::ScoreOverflow(1e20)
        );
    }

    #[test]
    fn prediction_never_below_runs_across_valid_states() {
        let predictor = bundled();
        for (bi, batting) in TEAMS.iter().enumerate() {
            let bowling = TEAMS[(bi + 1) % TEAMS.len()];
            for runs in (0..=300).step_by(25) {
                for wickets in [0, 4, 10] {
                    for overs in [5.1, 12.3, 19.5] {
                        let state = MatchState {
                            batting_team: batting.to_string(),
                            bowling_team: bowling.to_string(),
                            overs,
                            runs,
                            wickets,
                            runs_last_5: 100,
                            wickets_last_5: 5,
                        };
                        let p = predictor.predict(&state).unwrap();
                        assert!(
                            p.predicted_score >= runs,
                            "{} vs {} at {}/{} ({} ov): {} < {}",
                            batting,
                            bowling,
                            runs,
                            wickets,
                            overs,
                            p.predicted_score,
                            runs
                        );
                    }
                }
            }
        }
    }
}
