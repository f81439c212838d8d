/// Fixed team vocabulary.
///
/// The order of [`TEAMS`] defines the one-hot column positions of the
/// feature vector and must match the order the model was trained with.
/// Do not reorder or insert entries without retraining.
pub const TEAMS: [&str; TEAM_COUNT] = [
    "Chennai Super Kings",
    "Delhi Daredevils",
    "Kings XI Punjab",
    "Kolkata Knight Riders",
    "Mumbai Indians",
    "Rajasthan Royals",
    "Royal Challengers Bangalore",
    "Sunrisers Hyderabad",
];

/// Number of teams in the vocabulary (width of each one-hot block).
pub const TEAM_COUNT: usize = 8;

/// Column position of `name` in the vocabulary, if it is a known team.
/// Matching is exact, as it is at training time.
pub fn team_index(name: &str) -> Option<usize> {
    TEAMS.iter().position(|t| *t == name)
}

/// One-hot block for `name`: a 1.0 at the team's column, 0.0 elsewhere.
///
/// A name outside the vocabulary yields an all-zero block. Callers that
/// must not degrade silently validate with [`team_index`] first.
pub fn one_hot(name: &str) -> [f64; TEAM_COUNT] {
    let mut block = [0.0; TEAM_COUNT];
    if let Some(i) = team_index(name) {
        block[i] = 1.0;
    }
    block
}
