//! Match state intake and feature vector assembly.
//!
//! Layout of the vector fed to the model (21 columns):
//!
//! | columns | content                                                     |
//! |---------|-------------------------------------------------------------|
//! | 0..5    | runs, wickets, overs, runs_last_5, wickets_last_5           |
//! | 5..13   | batting team one-hot, in [`TEAMS`](super::teams::TEAMS) order |
//! | 13..21  | bowling team one-hot, same order                            |

use serde::{Deserialize, Serialize};

use super::error::PredictError;
use super::teams::{one_hot, team_index, TEAMS, TEAM_COUNT};

/// Numeric columns preceding the two one-hot blocks.
pub const NUMERIC_FEATURES: usize = 5;
/// Total width of the feature vector.
pub const FEATURE_COUNT: usize = NUMERIC_FEATURES + 2 * TEAM_COUNT;

pub const OVERS_MIN: f64 = 5.1;
pub const OVERS_MAX: f64 = 19.5;
pub const RUNS_MAX: u32 = 300;
pub const WICKETS_MAX: u32 = 10;
pub const RUNS_LAST_5_MAX: u32 = 100;
pub const WICKETS_LAST_5_MAX: u32 = 5;

/// Balls in an over; the fractional digit of `overs` counts completed balls.
const BALLS_PER_OVER: u32 = 6;

/// Current state of the innings, as entered in the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub batting_team: String,
    pub bowling_team: String,
    /// Overs completed in `overs.balls` notation (10.2 = 10 overs and 2 balls)
    pub overs: f64,
    pub runs: u32,
    pub wickets: u32,
    pub runs_last_5: u32,
    pub wickets_last_5: u32,
}

impl Default for MatchState {
    /// Form defaults: first two teams, 80/2 after 10 overs.
    fn default() -> Self {
        MatchState {
            batting_team: TEAMS[0].to_string(),
            bowling_team: TEAMS[1].to_string(),
            overs: 10.0,
            runs: 80,
            wickets: 2,
            runs_last_5: 40,
            wickets_last_5: 1,
        }
    }
}

impl MatchState {
    /// Check every field against the form bounds and the team rules.
    ///
    /// Team checks run first so the same-team message wins over numeric
    /// complaints, matching what the form shows.
    pub fn validate(&self) -> Result<(), PredictError> {
        if team_index(&self.batting_team).is_none() {
            return Err(PredictError::UnknownTeam(self.batting_team.clone()));
        }
        if team_index(&self.bowling_team).is_none() {
            return Err(PredictError::UnknownTeam(self.bowling_team.clone()));
        }
        if self.batting_team == self.bowling_team {
            return Err(PredictError::SameTeams);
        }

        validate_overs(self.overs)?;
        check_bound("runs", self.runs, RUNS_MAX)?;
        check_bound("wickets", self.wickets, WICKETS_MAX)?;
        check_bound("runs_last_5", self.runs_last_5, RUNS_LAST_5_MAX)?;
        check_bound("wickets_last_5", self.wickets_last_5, WICKETS_LAST_5_MAX)?;
        Ok(())
    }

    /// Legal deliveries bowled so far (10.2 → 62).
    pub fn balls_bowled(&self) -> u32 {
        let tenths = (self.overs * 10.0).round().max(0.0) as u32;
        (tenths / 10) * BALLS_PER_OVER + tenths % 10
    }

    /// Assemble the model input. Does not validate; unknown team names
    /// produce all-zero one-hot blocks.
    pub fn feature_vector(&self) -> [f64; FEATURE_COUNT] {
        let mut v = [0.0; FEATURE_COUNT];
        v[0] = self.runs as f64;
        v[1] = self.wickets as f64;
        v[2] = self.overs;
        v[3] = self.runs_last_5 as f64;
        v[4] = self.wickets_last_5 as f64;

        let batting_start = NUMERIC_FEATURES;
        let bowling_start = NUMERIC_FEATURES + TEAM_COUNT;
        v[batting_start..bowling_start].copy_from_slice(&one_hot(&self.batting_team));
        v[bowling_start..].copy_from_slice(&one_hot(&self.bowling_team));
        v
    }
}

fn check_bound(field: &'static str, value: u32, max: u32) -> Result<(), PredictError> {
    if value > max {
        return Err(PredictError::OutOfRange {
            field,
            min: 0.0,
            max: max as f64,
            value: value as f64,
        });
    }
    Ok(())
}

fn validate_overs(overs: f64) -> Result<(), PredictError> {
    if !overs.is_finite() {
        return Err(PredictError::InvalidOvers(overs));
    }
    let scaled = overs * 10.0;
    let tenths = scaled.round();
    // Only a single decimal digit is meaningful.
    if (scaled - tenths).abs() > 1e-6 {
        return Err(PredictError::InvalidOvers(overs));
    }
    let tenths = tenths as i64;
    let (lo, hi) = ((OVERS_MIN * 10.0).round() as i64, (OVERS_MAX * 10.0).round() as i64);
    if tenths < lo || tenths > hi {
        return Err(PredictError::OutOfRange {
            field: "overs",
            min: OVERS_MIN,
            max: OVERS_MAX,
            value: overs,
        });
    }
    if tenths % 10 >= BALLS_PER_OVER as i64 {
        return Err(PredictError::InvalidOvers(overs));
    }
    Ok(())
}
