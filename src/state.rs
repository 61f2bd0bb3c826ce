//! Application state shared by every handler.
//!
//! This is read-only after startup: the generator (service client + rendered
//! prompt + schema). Per-student state lives in each WebSocket task's
//! `Session`, never here.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::load_app_config_from_env;
use crate::gemini::Gemini;
use crate::generator::{ExerciseGenerator, GenerationService};

#[derive(Clone)]
pub struct AppState {
    pub generator: ExerciseGenerator,
}

impl AppState {
    /// Build state from env: load config, build the Gemini client.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Result<Self, reqwest::Error> {
        let cfg = load_app_config_from_env().unwrap_or_default();
        let gemini = Gemini::from_env()?;
        info!(
            target: "mates_backend",
            base_url = %gemini.base_url,
            model = %gemini.model,
            max_operand = cfg.limits.max_operand,
            max_divisor = cfg.limits.max_divisor,
            "Gemini generation enabled."
        );
        Ok(Self::with_service(Arc::new(gemini), &cfg))
    }

    pub fn with_service(service: Arc<dyn GenerationService>, cfg: &crate::config::AppConfig) -> Self {
        Self { generator: ExerciseGenerator::new(service, &cfg.prompts, &cfg.limits) }
    }
}
