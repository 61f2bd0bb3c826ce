//! Exercise generation: one schema-constrained call to the generation
//! service, then parse + normalize into an `Exercise`.
//!
//! Leniency is two-tier:
//!   - no text / not JSON / missing required text fields => `GenerationError`
//!   - unknown `type` => silently `STANDARD_PROBLEM`
//!
//! No retry, caching or rate limiting happens here; callers own that.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::{Limits, Prompts};
use crate::domain::{Exercise, ExerciseType};
use crate::error::GenerationError;
use crate::util::non_blank;

/// Everything the service needs for one call.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
  pub system_instruction: String,
  pub user_instruction: String,
  pub response_schema: Value,
}

/// External text-generation backend. `Ok(None)` means the service answered
/// without any text.
#[async_trait]
pub trait GenerationService: Send + Sync {
  async fn generate_json(&self, request: &GenerationRequest) -> Result<Option<String>, GenerationError>;
}

/// Shape of the JSON we ask for. `type` stays untyped so a bad category never
/// fails the parse.
#[derive(Deserialize)]
struct RawExercise {
  title: String,
  #[serde(default, rename = "type")]
  kind: Value,
  statement: String,
  #[serde(default)]
  question: Option<String>,
  solution: String,
  explanation: String,
  #[serde(default)]
  hint: Option<String>,
}

#[derive(Clone)]
pub struct ExerciseGenerator {
  service: Arc<dyn GenerationService>,
  request: GenerationRequest,
}

impl ExerciseGenerator {
  pub fn new(service: Arc<dyn GenerationService>, prompts: &Prompts, limits: &Limits) -> Self {
    let request = GenerationRequest {
      system_instruction: prompts.render_system_instruction(limits),
      user_instruction: prompts.user_instruction.clone(),
      response_schema: response_schema(),
    };
    Self { service, request }
  }

  /// Produce one fresh exercise.
  #[instrument(level = "info", skip(self))]
  pub async fn generate(&self) -> Result<Exercise, GenerationError> {
    let start = std::time::Instant::now();
    let text = match self.service.generate_json(&self.request).await {
      Ok(t) => t,
      Err(e) => {
        error!(target: "exercise", elapsed = ?start.elapsed(), error = %e, "Generation service call failed");
        return Err(e);
      }
    };

    let exercise = parse_exercise(text.as_deref()).map_err(|e| {
      error!(target: "exercise", elapsed = ?start.elapsed(), error = %e, "Unusable generation reply");
      e
    })?;

    info!(
      target: "exercise",
      id = %exercise.id,
      kind = exercise.kind.as_str(),
      closed = exercise.has_closed_solution(),
      title = %exercise.title,
      elapsed = ?start.elapsed(),
      "Exercise generated"
    );
    Ok(exercise)
  }
}

/// Turn the service's reply text into an `Exercise` with a fresh id.
pub fn parse_exercise(text: Option<&str>) -> Result<Exercise, GenerationError> {
  let text = text.map(str::trim).filter(|t| !t.is_empty()).ok_or(GenerationError::EmptyResponse)?;
  let raw: RawExercise = serde_json::from_str(text)?;

  let kind = ExerciseType::normalize(&raw.kind);
  if kind.as_str() != raw.kind.as_str().unwrap_or_default() {
    warn!(target: "exercise", raw_type = %raw.kind, "Unrecognized exercise type; using STANDARD_PROBLEM");
  }

  Ok(Exercise {
    id: Uuid::new_v4().to_string(),
    kind,
    title: raw.title,
    statement: raw.statement,
    question: non_blank(raw.question),
    solution: raw.solution,
    explanation: raw.explanation,
    hint: non_blank(raw.hint),
  })
}

/// Declared JSON schema for the reply (Gemini OpenAPI subset).
pub fn response_schema() -> Value {
  let kinds: Vec<&str> = ExerciseType::ALL.iter().map(|t| t.as_str()).collect();
  json!({
    "type": "OBJECT",
    "properties": {
      "title": { "type": "STRING", "description": "Un título corto y divertido (3-5 palabras)" },
      "type": { "type": "STRING", "enum": kinds },
      "statement": { "type": "STRING", "description": "El enunciado del problema (con narrativa andaluza) o los datos." },
      "question": { "type": "STRING", "description": "La pregunta específica (si aplica)" },
      "solution": { "type": "STRING", "description": "La solución correcta" },
      "explanation": { "type": "STRING", "description": "Explicación paso a paso" },
      "hint": { "type": "STRING", "description": "Una pista útil" }
    },
    "required": ["title", "type", "statement", "solution", "explanation"]
  })
}
