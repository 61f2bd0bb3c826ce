//! Application shell: the welcome → loading → exercise / error state machine
//! and the full-screen view model derived from it.
//!
//! ```text
//!   NotStarted --start--> Loading --ok--> Ready --next--> Loading
//!                            |                               |
//!                            +--err--> Error --retry--> Loading
//!   (any) --go_home--> NotStarted
//! ```
//!
//! The shell never refuses a trigger while loading; the page disables the
//! "next" button instead. A result that arrives after the user left
//! `Loading` (went home) is dropped. Failures are logged by the generator.

use serde::Serialize;
use tracing::{debug, info};

use crate::display::{render_card, CardView, RevealState};
use crate::domain::Exercise;
use crate::error::{GenerationError, USER_ERROR_MESSAGE};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ShellState {
  #[default]
  NotStarted,
  /// `previous` stays on screen while the next one is fetched.
  Loading { previous: Option<Exercise> },
  Ready(Exercise),
  /// `previous` is kept but not rendered while the banner is up.
  Error { message: String, previous: Option<Exercise> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  NotStarted,
  Loading,
  Ready,
  Error,
}

#[derive(Debug, Default)]
pub struct Shell {
  state: ShellState,
}

impl Shell {
  pub fn phase(&self) -> Phase {
    match self.state {
      ShellState::NotStarted => Phase::NotStarted,
      ShellState::Loading { .. } => Phase::Loading,
      ShellState::Ready(_) => Phase::Ready,
      ShellState::Error { .. } => Phase::Error,
    }
  }

  pub fn is_loading(&self) -> bool {
    matches!(self.state, ShellState::Loading { .. })
  }

  /// The exercise currently held, whether or not it is rendered.
  pub fn current(&self) -> Option<&Exercise> {
    match &self.state {
      ShellState::NotStarted => None,
      ShellState::Loading { previous } | ShellState::Error { previous, .. } => previous.as_ref(),
      ShellState::Ready(ex) => Some(ex),
    }
  }

  /// The exercise the page shows, if any (none behind the error banner).
  pub fn visible_exercise(&self) -> Option<&Exercise> {
    match &self.state {
      ShellState::Loading { previous } => previous.as_ref(),
      ShellState::Ready(ex) => Some(ex),
      ShellState::NotStarted | ShellState::Error { .. } => None,
    }
  }

  /// Welcome screen "Entrar".
  pub fn start(&mut self) {
    self.begin_loading("start");
  }

  /// Error banner "Reintentar".
  pub fn retry(&mut self) {
    self.begin_loading("retry");
  }

  /// Card "Siguiente Ejercicio".
  pub fn next(&mut self) {
    self.begin_loading("next");
  }

  /// Header click: back to the welcome screen, dropping exercise and error.
  pub fn go_home(&mut self) {
    debug!(target: "exercise", from = ?self.phase(), "Back to welcome screen");
    self.state = ShellState::NotStarted;
  }

  fn begin_loading(&mut self, trigger: &'static str) {
    let previous = match std::mem::take(&mut self.state) {
      ShellState::NotStarted => None,
      ShellState::Loading { previous } | ShellState::Error { previous, .. } => previous,
      ShellState::Ready(ex) => Some(ex),
    };
    debug!(target: "exercise", trigger, has_previous = previous.is_some(), "Loading exercise");
    self.state = ShellState::Loading { previous };
  }

  /// Apply the outcome of the request started by the last trigger. Returns
  /// false (and changes nothing) when the shell is no longer loading.
  pub fn resolve(&mut self, outcome: Result<Exercise, GenerationError>) -> bool {
    if !self.is_loading() {
      info!(target: "exercise", phase = ?self.phase(), "Dropping generation result: shell is not loading");
      return false;
    }
    let previous = match &mut self.state {
      ShellState::Loading { previous } => previous.take(),
      _ => None,
    };

    self.state = match outcome {
      Ok(exercise) => ShellState::Ready(exercise),
      Err(e) => {
        debug!(target: "exercise", error = %e, "Showing error banner");
        ShellState::Error { message: USER_ERROR_MESSAGE.to_string(), previous }
      }
    };
    true
  }

  /// Snapshot for the page. `reveal` is re-synced to the visible exercise.
  pub fn view(&self, reveal: &mut RevealState) -> ShellView {
    let loading = self.is_loading();
    let error = match &self.state {
      ShellState::Error { message, .. } => Some(ErrorBanner { message: message.clone(), retry_label: RETRY_LABEL }),
      _ => None,
    };
    let card = self.visible_exercise().map(|ex| {
      reveal.sync(ex);
      render_card(ex, reveal, loading)
    });

    ShellView {
      phase: self.phase(),
      screen: if self.phase() == Phase::NotStarted { Screen::Welcome } else { Screen::Practice },
      loading,
      skeleton: loading && card.is_none() && error.is_none(),
      error,
      card,
    }
  }
}

pub const RETRY_LABEL: &str = "Reintentar";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
  Welcome,
  Practice,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBanner {
  pub message: String,
  pub retry_label: &'static str,
}

/// Everything the page needs to draw itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShellView {
  pub phase: Phase,
  pub screen: Screen,
  pub loading: bool,
  /// Placeholder for the very first load only.
  pub skeleton: bool,
  pub error: Option<ErrorBanner>,
  pub card: Option<CardView>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ExerciseType;
  use crate::display::HintView;

  fn exercise(id: &str) -> Exercise {
    Exercise {
      id: id.into(),
      kind: ExerciseType::StandardProblem,
      title: "Pueblos blancos".into(),
      statement: "Un autobús recorre 48 km por la mañana y 37 km por la tarde.".into(),
      question: Some("¿Cuántos km recorre en total?".into()),
      solution: "85 km".into(),
      explanation: "48 + 37 = 85".into(),
      hint: Some("Suma las dos distancias.".into()),
    }
  }

  fn failure() -> GenerationError {
    GenerationError::EmptyResponse
  }

  #[test]
  fn first_load_shows_skeleton() {
    let mut shell = Shell::default();
    let mut reveal = RevealState::default();
    assert_eq!(shell.view(&mut reveal).screen, Screen::Welcome);

    shell.start();
    let view = shell.view(&mut reveal);
    assert_eq!(view.phase, Phase::Loading);
    assert_eq!(view.screen, Screen::Practice);
    assert!(view.skeleton);
    assert!(view.card.is_none());
  }

  #[test]
  fn success_becomes_ready() {
    let mut shell = Shell::default();
    shell.start();
    assert!(shell.resolve(Ok(exercise("a"))));
    assert_eq!(shell.phase(), Phase::Ready);
    let view = shell.view(&mut RevealState::default());
    assert!(!view.loading && !view.skeleton && view.error.is_none());
    assert_eq!(view.card.expect("card").id, "a");
  }

  #[test]
  fn next_keeps_previous_exercise_visible_and_disables_next() {
    let mut shell = Shell::default();
    shell.start();
    shell.resolve(Ok(exercise("a")));
    shell.next();

    let view = shell.view(&mut RevealState::default());
    assert_eq!(view.phase, Phase::Loading);
    assert!(!view.skeleton);
    let card = view.card.expect("previous card");
    assert_eq!(card.id, "a");
    assert!(!card.next.enabled);

    shell.resolve(Ok(exercise("b")));
    assert_eq!(shell.current().map(|e| e.id.as_str()), Some("b"));
  }

  #[test]
  fn failure_shows_banner_and_hides_but_keeps_previous() {
    let mut shell = Shell::default();
    shell.start();
    shell.resolve(Ok(exercise("a")));
    shell.next();
    shell.resolve(Err(failure()));

    assert_eq!(shell.phase(), Phase::Error);
    assert_eq!(shell.current().map(|e| e.id.as_str()), Some("a"));
    let view = shell.view(&mut RevealState::default());
    let banner = view.error.expect("banner");
    assert_eq!(banner.message, USER_ERROR_MESSAGE);
    assert_eq!(banner.retry_label, "Reintentar");
    assert!(view.card.is_none());
    assert!(!view.skeleton);
  }

  #[test]
  fn retry_from_error_loads_again_and_clears_error() {
    let mut shell = Shell::default();
    shell.start();
    shell.resolve(Err(failure()));
    shell.retry();
    let view = shell.view(&mut RevealState::default());
    assert_eq!(view.phase, Phase::Loading);
    assert!(view.error.is_none());
    assert!(view.skeleton, "no exercise yet, so the placeholder shows");

    shell.resolve(Ok(exercise("a")));
    assert_eq!(shell.phase(), Phase::Ready);
  }

  #[test]
  fn go_home_discards_everything() {
    let mut shell = Shell::default();
    shell.start();
    shell.resolve(Ok(exercise("a")));
    shell.go_home();
    assert_eq!(shell.phase(), Phase::NotStarted);
    assert!(shell.current().is_none());

    shell.start();
    shell.resolve(Err(failure()));
    shell.go_home();
    assert_eq!(shell.phase(), Phase::NotStarted);
  }

  #[test]
  fn late_result_after_going_home_is_dropped() {
    let mut shell = Shell::default();
    shell.start();
    shell.go_home();
    assert!(!shell.resolve(Ok(exercise("late"))));
    assert_eq!(shell.phase(), Phase::NotStarted);
  }

  #[test]
  fn reveal_flags_reset_when_exercise_changes() {
    let mut shell = Shell::default();
    let mut reveal = RevealState::default();
    shell.start();
    shell.resolve(Ok(exercise("a")));
    let a = shell.current().cloned().unwrap();
    reveal.reveal_solution(&a);
    assert!(shell.view(&mut reveal).card.unwrap().solution.is_some());

    shell.next();
    shell.resolve(Ok(exercise("b")));
    let card = shell.view(&mut reveal).card.unwrap();
    assert!(card.solution.is_none());
    assert_eq!(card.hint, HintView::Button);
  }
}
