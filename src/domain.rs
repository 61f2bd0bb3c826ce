//! Domain models: exercise categories, the exercise itself, and the
//! per-category display table (label + badge colour).

use serde::{Deserialize, Serialize};

/// Pedagogical kind of exercise. Wire names are the SCREAMING_SNAKE literals
/// declared in the response schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseType {
  /// Solved with one or two operations.
  #[default]
  StandardProblem,
  /// Division where the point is what the remainder means.
  RemainderInterpretation,
  /// Given a short statement, write a different question.
  ReformulateQuestion,
  /// Given data, list every question that can be asked.
  GenerateQuestions,
  /// Given operations or data, invent the problem text.
  CreateProblem,
  /// Simple gcd/lcm or divisibility reasoning.
  MultiplesDivisors,
}

impl ExerciseType {
  pub const ALL: [ExerciseType; 6] = [
    ExerciseType::StandardProblem,
    ExerciseType::RemainderInterpretation,
    ExerciseType::ReformulateQuestion,
    ExerciseType::GenerateQuestions,
    ExerciseType::CreateProblem,
    ExerciseType::MultiplesDivisors,
  ];

  pub const fn as_str(self) -> &'static str {
    match self {
      ExerciseType::StandardProblem => "STANDARD_PROBLEM",
      ExerciseType::RemainderInterpretation => "REMAINDER_INTERPRETATION",
      ExerciseType::ReformulateQuestion => "REFORMULATE_QUESTION",
      ExerciseType::GenerateQuestions => "GENERATE_QUESTIONS",
      ExerciseType::CreateProblem => "CREATE_PROBLEM",
      ExerciseType::MultiplesDivisors => "MULTIPLES_DIVISORS",
    }
  }

  /// Exact match against the six wire literals.
  pub fn from_wire(s: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|t| t.as_str() == s)
  }

  /// Lenient mapping for whatever the model put in `type`: anything that is
  /// not one of the six literals (absent, null, a number, a typo) becomes
  /// `StandardProblem`.
  pub fn normalize(raw: &serde_json::Value) -> Self {
    raw.as_str().and_then(Self::from_wire).unwrap_or_default()
  }

  /// True when the answer is a single determinate value.
  pub const fn has_closed_solution(self) -> bool {
    matches!(
      self,
      ExerciseType::StandardProblem | ExerciseType::RemainderInterpretation | ExerciseType::MultiplesDivisors
    )
  }

  /// Display attributes for the category badge.
  pub const fn style(self) -> CategoryStyle {
    let (label, badge) = match self {
      ExerciseType::StandardProblem => ("Problema Estándar", BadgeColor::Blue),
      ExerciseType::RemainderInterpretation => ("¿Qué sobra?", BadgeColor::Teal),
      ExerciseType::ReformulateQuestion => ("Cambia la pregunta", BadgeColor::Teal),
      ExerciseType::GenerateQuestions => ("Busca preguntas", BadgeColor::Teal),
      ExerciseType::CreateProblem => ("¡Inventor de Problemas!", BadgeColor::Purple),
      ExerciseType::MultiplesDivisors => ("Múltiplos y Divisores", BadgeColor::Orange),
    };
    CategoryStyle { label, badge }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeColor {
  Blue,
  Purple,
  Orange,
  /// Default for categories without their own colour.
  Teal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryStyle {
  pub label: &'static str,
  pub badge: BadgeColor,
}

/// One generated word problem. Never mutated after creation; the next fetch
/// replaces it wholesale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exercise {
  pub id: String,
  pub kind: ExerciseType,
  pub title: String,
  pub statement: String,
  /// Absent for open tasks such as "invent the problem".
  pub question: Option<String>,
  pub solution: String,
  pub explanation: String,
  pub hint: Option<String>,
}

impl Exercise {
  pub fn has_closed_solution(&self) -> bool {
    self.kind.has_closed_solution()
  }

  /// First four characters of the id, shown as `#abcd` on the card.
  pub fn short_id(&self) -> &str {
    match self.id.char_indices().nth(4) {
      Some((idx, _)) => &self.id[..idx],
      None => &self.id,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn known_literals_are_kept() {
    for t in ExerciseType::ALL {
      assert_eq!(ExerciseType::normalize(&json!(t.as_str())), t);
    }
  }

  #[test]
  fn anything_else_defaults_to_standard_problem() {
    for raw in [json!("UNKNOWN_KIND"), json!(""), json!(null), json!(7), json!("standard_problem"), json!(["CREATE_PROBLEM"])] {
      assert_eq!(ExerciseType::normalize(&raw), ExerciseType::StandardProblem, "raw={raw}");
    }
  }

  #[test]
  fn closed_solution_membership() {
    let closed: Vec<_> = ExerciseType::ALL.into_iter().filter(|t| t.has_closed_solution()).collect();
    assert_eq!(
      closed,
      vec![ExerciseType::StandardProblem, ExerciseType::RemainderInterpretation, ExerciseType::MultiplesDivisors]
    );
  }

  #[test]
  fn serde_names_match_wire_literals() {
    for t in ExerciseType::ALL {
      assert_eq!(serde_json::to_value(t).unwrap(), json!(t.as_str()));
    }
  }

  #[test]
  fn style_table() {
    assert_eq!(ExerciseType::StandardProblem.style().badge, BadgeColor::Blue);
    assert_eq!(ExerciseType::CreateProblem.style().badge, BadgeColor::Purple);
    assert_eq!(ExerciseType::MultiplesDivisors.style().badge, BadgeColor::Orange);
    assert_eq!(ExerciseType::GenerateQuestions.style().badge, BadgeColor::Teal);
    assert_eq!(ExerciseType::RemainderInterpretation.style().label, "¿Qué sobra?");
    for t in ExerciseType::ALL {
      assert!(!t.style().label.is_empty());
    }
  }

  #[test]
  fn short_id_takes_four_chars() {
    let ex = Exercise {
      id: "abcdef-123".into(),
      kind: ExerciseType::StandardProblem,
      title: String::new(),
      statement: String::new(),
      question: None,
      solution: String::new(),
      explanation: String::new(),
      hint: None,
    };
    assert_eq!(ex.short_id(), "abcd");
  }
}
