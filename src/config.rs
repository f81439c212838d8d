use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;

/// IPL final score predictor
#[derive(Parser, Debug, Clone)]
#[command(name = "ipl-score-predictor", version, about)]
pub struct Config {
    /// Address the prediction form listens on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8501")]
    pub listen_addr: String,

    /// Path to the trained regression model (JSON)
    #[arg(
        long,
        env = "MODEL_PATH",
        default_value = "models/linear_regression_model.json"
    )]
    pub model_path: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            anyhow::bail!("listen_addr '{}' is not a valid socket address", self.listen_addr);
        }
        if self.model_path.trim().is_empty() {
            anyhow::bail!("model_path must not be empty");
        }
        if !Path::new(&self.model_path).is_file() {
            anyhow::bail!(
                "model file '{}' not found. Set MODEL_PATH or pass --model-path.",
                self.model_path
            );
        }
        Ok(())
    }
}
