//! Exercise card: per-exercise reveal state and the render model the page
//! draws from.
//!
//! Reveal flags belong to one exercise id. As soon as a different exercise is
//! shown they start over at "nothing revealed".

use serde::Serialize;

use crate::domain::{BadgeColor, Exercise, ExerciseType};

pub const NEXT_LABEL: &str = "Siguiente Ejercicio";
pub const NEXT_LABEL_LOADING: &str = "Pensando...";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RevealState {
  exercise_id: Option<String>,
  hint_shown: bool,
  solution_shown: bool,
}

impl RevealState {
  /// Reset the flags if `exercise` is not the one they were recorded for.
  pub fn sync(&mut self, exercise: &Exercise) {
    if self.exercise_id.as_deref() != Some(exercise.id.as_str()) {
      *self = RevealState { exercise_id: Some(exercise.id.clone()), ..Default::default() };
    }
  }

  /// The hint area exists only while there is a hint and the solution is hidden.
  pub fn hint_available(&self, exercise: &Exercise) -> bool {
    exercise.hint.as_deref().is_some_and(|h| !h.trim().is_empty()) && !self.solution_shown
  }

  /// Returns false when there was nothing to reveal.
  pub fn reveal_hint(&mut self, exercise: &Exercise) -> bool {
    self.sync(exercise);
    if !self.hint_available(exercise) || self.hint_shown {
      return false;
    }
    self.hint_shown = true;
    true
  }

  /// One-way: there is no "hide solution".
  pub fn reveal_solution(&mut self, exercise: &Exercise) -> bool {
    self.sync(exercise);
    if self.solution_shown {
      return false;
    }
    self.solution_shown = true;
    true
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HintView {
  None,
  Button,
  Shown { text: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SolutionView {
  pub solution: String,
  pub explanation: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NextButton {
  pub enabled: bool,
  pub label: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CardView {
  pub id: String,
  pub short_id: String,
  pub kind: ExerciseType,
  pub category_label: &'static str,
  pub badge: BadgeColor,
  pub title: String,
  pub statement: String,
  pub question: Option<String>,
  pub has_closed_solution: bool,
  pub hint: HintView,
  /// `None` shows the "Ver Solución" button instead.
  pub solution: Option<SolutionView>,
  pub next: NextButton,
}

/// Render one exercise. `reveal` must already be synced to `exercise`.
pub fn render_card(exercise: &Exercise, reveal: &RevealState, loading: bool) -> CardView {
  let style = exercise.kind.style();

  let hint = match (&exercise.hint, reveal.hint_available(exercise), reveal.hint_shown) {
    (Some(text), true, true) => HintView::Shown { text: text.clone() },
    (_, true, false) => HintView::Button,
    _ => HintView::None,
  };

  let solution = reveal.solution_shown.then(|| SolutionView {
    solution: exercise.solution.clone(),
    explanation: exercise.explanation.clone(),
  });

  CardView {
    id: exercise.id.clone(),
    short_id: exercise.short_id().to_string(),
    kind: exercise.kind,
    category_label: style.label,
    badge: style.badge,
    title: exercise.title.clone(),
    statement: exercise.statement.clone(),
    question: exercise.question.clone(),
    has_closed_solution: exercise.has_closed_solution(),
    hint,
    solution,
    next: NextButton {
      enabled: !loading,
      label: if loading { NEXT_LABEL_LOADING } else { NEXT_LABEL },
    },
  }
}
