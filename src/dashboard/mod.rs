use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::predictor::{error::PredictError, teams::TEAMS, MatchState, Prediction, Predictor};

#[derive(Clone)]
pub struct AppState {
    pub predictor: Predictor,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub feature_count: usize,
    pub rmse: Option<f64>,
}

/// Build the Axum router for the prediction form.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/teams", get(teams_handler))
        .route("/api/model", get(model_handler))
        .route("/api/predict", post(predict_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Serve the form page, injecting the model footer.
async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let model = state.predictor.model();
    let rmse = model
        .rmse()
        .map(|r| format!("Model Accuracy: RMSE ≈ {:.2} runs", r))
        .unwrap_or_default();
    let options: String = TEAMS
        .iter()
        .map(|t| format!(r#"<option value="{0}">{0}</option>"#, t))
        .collect();
    let html = FORM_HTML
        .replace("{{TEAM_OPTIONS}}", &options)
        .replace("{{MODEL_NAME}}", &escape_html(&model_label(model.name())))
        .replace("{{MODEL_RMSE}}", &rmse);
    Html(html)
}

fn model_label(name: &str) -> String {
    name.split('_')
        .map(|w| {
            let mut c = w.chars();
            match c.next() {
                Some(first) => first.to_uppercase().chain(c).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Escape text taken from the model artifact before it lands in the page.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// GET /health
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/teams
async fn teams_handler() -> Json<Vec<&'static str>> {
    Json(TEAMS.to_vec())
}

/// GET /api/model
async fn model_handler(State(state): State<Arc<AppState>>) -> Json<ModelInfo> {
    let model = state.predictor.model();
    Json(ModelInfo {
        name: model.name().to_string(),
        feature_count: model.feature_count(),
        rmse: model.rmse(),
    })
}

/// POST /api/predict
///
/// Malformed bodies (negative counts, fractions, nulls) are reported as 400
/// with the same `{"error"}` shape as validation failures.
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MatchState>, JsonRejection>,
) -> Result<Json<Prediction>, (StatusCode, Json<ErrorResponse>)> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!("Rejected malformed prediction request: {}", rejection.body_text());
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("invalid match state: {}", rejection.body_text()),
                }),
            ));
        }
    };

    match state.predictor.predict(&req) {
        Ok(prediction) => {
            info!(
                "Predicted {} for {} vs {} ({} after {} overs)",
                prediction.predicted_score,
                req.batting_team,
                req.bowling_team,
                prediction.current_score,
                req.overs
            );
            Ok(Json(prediction))
        }
        Err(e) => {
            warn!("Rejected prediction request: {}", e);
            let status = match e {
                PredictError::ScoreOverflow(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            };
            Err((
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

/// Embedded single-file form (HTML + CSS + JS)
const FORM_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>IPL Score Predictor</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #1e3a8a;
    --gold: #fbbf24;
    --red: #ff4f6a;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  main { max-width: 760px; margin: 0 auto; padding: 2rem 1.5rem; display: grid; gap: 1.5rem; }
  h1 { font-size: 1.8rem; font-weight: 700; }
  h3 { font-size: 1.1rem; margin-bottom: .8rem; }
  .sub { color: var(--muted); margin-top: .3rem; }
  hr { border: none; border-top: 1px solid var(--border); }
  .row { display: grid; gap: 1rem; }
  .row.two { grid-template-columns: 1fr 1fr; }
  .row.three { grid-template-columns: 1fr 1fr 1fr; }
  @media (max-width: 640px) { .row.two, .row.three { grid-template-columns: 1fr; } }
  label { display: block; font-size: .8rem; color: var(--muted); margin-bottom: .3rem; }
  select, input { width: 100%; background: var(--card); color: var(--text); border: 1px solid var(--border); border-radius: 6px; padding: .55rem .6rem; font-size: .95rem; }
  .hint { font-size: .7rem; color: var(--muted); margin-top: .25rem; }
  .error { background: rgba(255,79,106,.15); color: var(--red); border: 1px solid var(--red); border-radius: 6px; padding: .7rem 1rem; display: none; }
  button { width: 100%; background: #ff4b4b; color: #fff; border: none; border-radius: 8px; padding: .8rem; font-size: 1rem; font-weight: 600; cursor: pointer; }
  button:disabled { opacity: .5; cursor: not-allowed; }
  .result { background: var(--accent); border-radius: 10px; padding: 30px; text-align: center; }
  .result h2 { color: #fff; }
  .result .score { color: var(--gold); font-size: 60px; font-weight: 700; margin: 10px 0; }
  .result p { color: #d1d5db; }
  .metric { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1rem; }
  .metric .label { color: var(--muted); font-size: .8rem; text-transform: uppercase; letter-spacing: .06em; margin-bottom: .3rem; }
  .metric .value { font-size: 1.5rem; font-weight: 700; }
  footer { text-align: center; color: #6b7280; padding: 20px; font-size: .85rem; line-height: 1.6; }
  #result-section { display: none; gap: 1.5rem; }
</style>
</head>
<body>
<main>
  <div>
    <h1>🏏 IPL Score Predictor</h1>
    <p class="sub">Predict the final score of an IPL match using Machine Learning</p>
  </div>
  <hr>

  <div class="row two">
    <div><label for="batting_team">Select Batting Team</label><select id="batting_team">{{TEAM_OPTIONS}}</select></div>
    <div><label for="bowling_team">Select Bowling Team</label><select id="bowling_team">{{TEAM_OPTIONS}}</select></div>
  </div>
  <div class="error" id="error"></div>

  <h3>Current Match Situation</h3>
  <div class="row three">
    <div>
      <label for="overs">Overs Completed</label>
      <input id="overs" type="number" min="5.1" max="19.5" step="0.1" value="10.0">
      <div class="hint">10.2 means 10 overs and 2 balls</div>
    </div>
    <div><label for="runs">Current Runs</label><input id="runs" type="number" min="0" max="300" step="1" value="80"></div>
    <div><label for="wickets">Wickets Fallen</label><input id="wickets" type="number" min="0" max="10" step="1" value="2"></div>
  </div>

  <h3>Last 5 Overs Statistics</h3>
  <div class="row two">
    <div><label for="runs_last_5">Runs in Last 5 Overs</label><input id="runs_last_5" type="number" min="0" max="100" step="1" value="40"></div>
    <div><label for="wickets_last_5">Wickets in Last 5 Overs</label><input id="wickets_last_5" type="number" min="0" max="5" step="1" value="1"></div>
  </div>

  <hr>
  <button id="predict-btn" onclick="predict()">Predict Final Score</button>

  <section id="result-section">
    <h3>Prediction Result</h3>
    <div class="result">
      <h2>Predicted Final Score</h2>
      <div class="score" id="r-score">–</div>
      <p>Expected runs at end of innings</p>
    </div>
    <hr>
    <h3>Match Summary</h3>
    <div class="row two">
      <div class="metric"><div class="label">Current Score</div><div class="value" id="r-current">–</div></div>
      <div class="metric"><div class="label">Predicted Final</div><div class="value" id="r-final">–</div></div>
      <div class="metric"><div class="label">Overs Completed</div><div class="value" id="r-overs">–</div></div>
      <div class="metric"><div class="label">Runs Needed</div><div class="value" id="r-needed">–</div></div>
      <div class="metric"><div class="label">Run Rate (Last 5)</div><div class="value" id="r-rate">–</div></div>
      <div class="metric"><div class="label">Projected Total</div><div class="value" id="r-projected">–</div></div>
    </div>
  </section>
</main>

<footer>
  <p>Built with Machine Learning | {{MODEL_NAME}} Model</p>
  <p>{{MODEL_RMSE}}</p>
</footer>

<script>
const $ = id => document.getElementById(id);

function checkTeams() {
  const same = $('batting_team').value === $('bowling_team').value;
  $('error').textContent = same ? 'Batting and Bowling teams must be different!' : '';
  $('error').style.display = same ? 'block' : 'none';
  return !same;
}

async function predict() {
  if (!checkTeams()) return;
  const body = {
    batting_team: $('batting_team').value,
    bowling_team: $('bowling_team').value,
    overs: parseFloat($('overs').value),
    runs: parseInt($('runs').value, 10),
    wickets: parseInt($('wickets').value, 10),
    runs_last_5: parseInt($('runs_last_5').value, 10),
    wickets_last_5: parseInt($('wickets_last_5').value, 10),
  };
  $('predict-btn').disabled = true;
  try {
    const r = await fetch('/api/predict', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(body),
    });
    if (!r.ok) {
      let msg = 'Prediction failed (' + r.status + ')';
      try { msg = (await r.json()).error || msg; } catch (_) {}
      $('error').textContent = msg;
      $('error').style.display = 'block';
      $('result-section').style.display = 'none';
      return;
    }
    const p = await r.json();
    $('error').style.display = 'none';
    $('r-score').textContent = p.predicted_score;
    $('r-current').textContent = p.current_score;
    $('r-final').textContent = p.predicted_score;
    $('r-overs').textContent = p.overs;
    $('r-needed').textContent = p.runs_remaining;
    $('r-rate').textContent = p.run_rate_last_5.toFixed(2);
    $('r-projected').textContent = p.projected_total;
    $('result-section').style.display = 'grid';
  } finally {
    $('predict-btn').disabled = false;
  }
}

document.addEventListener('DOMContentLoaded', () => {
  // Default selection: first team batting, second bowling
  $('bowling_team').selectedIndex = 1;
  $('batting_team').addEventListener('change', checkTeams);
  $('bowling_team').addEventListener('change', checkTeams);
});
</script>
</body>
</html>"#;
