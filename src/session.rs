//! One student's session: the shell plus the card's reveal flags.
//!
//! A WebSocket connection owns exactly one `Session`; nothing in it is shared.
//! Triggers that need a new exercise report `Step::Generate`, and the caller
//! runs the generator and hands the outcome back through `resolve`. This lets
//! the transport push the loading view before awaiting the network call.

use tracing::debug;

use crate::display::RevealState;
use crate::domain::Exercise;
use crate::error::GenerationError;
use crate::protocol::ClientWsMessage;
use crate::shell::{Shell, ShellView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  /// Just redraw.
  Render,
  /// Redraw, then fetch an exercise and `resolve` with the outcome.
  Generate,
  /// Answer with a pong; nothing changed.
  Pong,
}

#[derive(Debug, Default)]
pub struct Session {
  shell: Shell,
  reveal: RevealState,
}

impl Session {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn shell(&self) -> &Shell {
    &self.shell
  }

  pub fn apply(&mut self, msg: ClientWsMessage) -> Step {
    match msg {
      ClientWsMessage::Ping => Step::Pong,
      ClientWsMessage::Snapshot => Step::Render,
      ClientWsMessage::Start => { self.shell.start(); Step::Generate }
      ClientWsMessage::Retry => { self.shell.retry(); Step::Generate }
      ClientWsMessage::Next => { self.shell.next(); Step::Generate }
      ClientWsMessage::GoHome => { self.shell.go_home(); Step::Render }
      ClientWsMessage::RevealHint { exercise_id } => {
        if let Some(ex) = card_for(&self.shell, &exercise_id) {
          if !self.reveal.reveal_hint(ex) {
            debug!(target: "exercise", id = %ex.id, "reveal_hint ignored: no hint on offer");
          }
        }
        Step::Render
      }
      ClientWsMessage::RevealSolution { exercise_id } => {
        if let Some(ex) = card_for(&self.shell, &exercise_id) {
          self.reveal.reveal_solution(ex);
        }
        Step::Render
      }
    }
  }

  pub fn resolve(&mut self, outcome: Result<Exercise, GenerationError>) -> bool {
    self.shell.resolve(outcome)
  }

  pub fn view(&mut self) -> ShellView {
    self.shell.view(&mut self.reveal)
  }
}

/// The visible exercise, but only if it is the one the click came from.
fn card_for<'a>(shell: &'a Shell, exercise_id: &str) -> Option<&'a Exercise> {
  let visible = shell.visible_exercise();
  if visible.map(|ex| ex.id.as_str()) != Some(exercise_id) {
    debug!(
      target: "exercise",
      clicked = exercise_id,
      visible = visible.map(|ex| ex.id.as_str()).unwrap_or("-"),
      "Reveal for a card that is no longer shown; ignored"
    );
    return None;
  }
  visible
}
