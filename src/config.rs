//! Loading app configuration (prompts + numeric limits) from TOML.
//!
//! See `AppConfig`, `Prompts` and `Limits` for the expected schema. Every
//! section is optional; missing values fall back to the built-in defaults.

use serde::Deserialize;
use tracing::{info, error};

use crate::util::{fill_template, format_es_thousands};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub limits: Limits,
}

/// Numeric constraints the model is told to respect. Nothing checks the
/// generated math against them.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Limits {
  pub max_operand: u32,
  pub max_divisor: u32,
}

impl Default for Limits {
  fn default() -> Self {
    Self { max_operand: 99_999, max_divisor: 50 }
  }
}

/// Prompts sent to the generation service. `system_instruction` may use the
/// `{max_operand}` and `{max_divisor}` placeholders.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub system_instruction: String,
  pub user_instruction: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      system_instruction: DEFAULT_SYSTEM_INSTRUCTION.into(),
      user_instruction: "Genera un ejercicio de matemáticas aleatorio para el examen de 5º de primaria siguiendo las reglas.".into(),
    }
  }
}

impl Prompts {
  /// System instruction with the limits filled in.
  pub fn render_system_instruction(&self, limits: &Limits) -> String {
    let max_operand = format_es_thousands(limits.max_operand);
    let max_divisor = limits.max_divisor.to_string();
    fill_template(
      &self.system_instruction,
      &[("max_operand", max_operand.as_str()), ("max_divisor", max_divisor.as_str())],
    )
  }
}

const DEFAULT_SYSTEM_INSTRUCTION: &str = r#"
Eres un maestro de matemáticas experto de un colegio de primaria en Andalucía, España.
Tu audiencia son niños de 10 años (5º de Primaria).

ESTILO Y CONTEXTO:
1. Usa un tono animado, motivador y cercano.
2. Contextualiza los problemas en Andalucía (aceitunas, naranjas, la Alhambra, la playa, la feria, pueblos blancos, etc.).
3. Crea pequeñas historias atractivas para que el alumno se interese por el problema.
4. Prioriza la claridad y legibilidad (evita símbolos como "@").

REGLAS MATEMÁTICAS ESTRICTAS:
1. Números máximos: {max_operand}.
2. Divisiones: El divisor NUNCA puede ser mayor de {max_divisor}.
3. Operaciones permitidas: Suma, Resta, Multiplicación (x1 o x2 cifras), División (entre 1 o 2 cifras).
4. Sin decimales en los operandos ni resultados (división entera con resto es válida).

TIPOS DE EJERCICIOS (Generar uno aleatorio de esta lista):
1. PROBLEMA ESTÁNDAR: Se resuelve con 1 o 2 operaciones.
2. INTERPRETACIÓN DEL RESTO: Un problema de división donde la clave es saber cuánto sobra y qué significa.
3. REFORMULAR PREGUNTAS: Dado un enunciado corto, pedir al alumno que escriba una pregunta diferente.
4. GENERAR PREGUNTAS: Dado un enunciado corto o datos, pedir todas las preguntas posibles.
5. CREAR PROBLEMA: Dadas unas operaciones (ej: 25 x 4) o unos datos, pedir al alumno que invente la letra del problema.
6. MÚLTIPLOS Y DIVISORES: Problemas de mcd, mcm (sencillos), o lógica de divisibilidad.

SALIDA:
Devuelve SIEMPRE un JSON válido.
"#;

/// Attempt to load `AppConfig` from APP_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("APP_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_app_config(&s) {
      Ok(cfg) => {
        info!(target: "mates_backend", %path, "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "mates_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "mates_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_app_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}
