//! Error taxonomy for exercise generation.
//!
//! Every variant is a hard failure: no exercise is produced. Off-schema but
//! parseable replies (an unknown category) are not errors; see
//! `ExerciseType::normalize`.

/// Message shown to the student for any generation failure.
pub const USER_ERROR_MESSAGE: &str = "¡Vaya! El profe se ha dejado las tizas. Inténtalo de nuevo.";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
  /// The service answered but produced no text.
  #[error("generation service returned no text")]
  EmptyResponse,

  /// The text was not the JSON object we asked for.
  #[error("generated text is not valid exercise JSON: {0}")]
  InvalidJson(#[from] serde_json::Error),

  /// Non-2xx from the service (bad key, quota, server error...).
  #[error("generation service HTTP {status}: {message}")]
  Service { status: u16, message: String },

  /// Connectivity, TLS, timeout or body decoding failures.
  #[error("generation request failed: {0}")]
  Transport(#[from] reqwest::Error),
}

impl GenerationError {
  /// The cause is never shown to the student.
  pub fn user_message(&self) -> &'static str {
    USER_ERROR_MESSAGE
  }
}
