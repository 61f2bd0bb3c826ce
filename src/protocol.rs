//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{BadgeColor, Exercise, ExerciseType};
use crate::shell::ShellView;

/// Messages the client can send over WebSocket. One per button on the page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    /// Current view without changing anything (page reload, reconnect).
    Snapshot,
    Start,
    Retry,
    Next,
    GoHome,
    /// Reveals name the card they were clicked on; stale ids are ignored.
    RevealHint { exercise_id: String },
    RevealSolution { exercise_id: String },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    View { view: ShellView },
    Error { message: String },
}

/// Stand-alone exercise as returned by the HTTP API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseOut {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ExerciseType,
    pub title: String,
    pub statement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    pub solution: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub has_closed_solution: bool,
    pub category_label: &'static str,
    pub badge: BadgeColor,
}

/// Convert the internal `Exercise` to the public DTO.
pub fn to_out(ex: &Exercise) -> ExerciseOut {
    let style = ex.kind.style();
    ExerciseOut {
        id: ex.id.clone(),
        kind: ex.kind,
        title: ex.title.clone(),
        statement: ex.statement.clone(),
        question: ex.question.clone(),
        solution: ex.solution.clone(),
        explanation: ex.explanation.clone(),
        hint: ex.hint.clone(),
        has_closed_solution: ex.has_closed_solution(),
        category_label: style.label,
        badge: style.badge,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOut {
    #[serde(rename = "type")]
    pub kind: ExerciseType,
    pub label: &'static str,
    pub badge: BadgeColor,
    pub has_closed_solution: bool,
}

pub fn categories() -> Vec<CategoryOut> {
    ExerciseType::ALL
        .into_iter()
        .map(|kind| {
            let style = kind.style();
            CategoryOut { kind, label: style.label, badge: style.badge, has_closed_solution: kind.has_closed_solution() }
        })
        .collect()
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_messages_parse_from_tagged_json() {
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"reveal_hint","exercise_id":"ab12"}"#).unwrap();
        assert_eq!(m, ClientWsMessage::RevealHint { exercise_id: "ab12".into() });
        assert!(serde_json::from_str::<ClientWsMessage>(r#"{"type":"reveal_solution"}"#).is_err());
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"go_home"}"#).unwrap();
        assert_eq!(m, ClientWsMessage::GoHome);
        assert!(serde_json::from_str::<ClientWsMessage>(r#"{"type":"hide_solution"}"#).is_err());
    }

    #[test]
    fn exercise_out_uses_camel_case_field_names() {
        let ex = Exercise {
            id: "1234-5678".into(),
            kind: ExerciseType::MultiplesDivisors,
            title: "Aceitunas".into(),
            statement: "...".into(),
            question: None,
            solution: "12".into(),
            explanation: "...".into(),
            hint: None,
        };
        let v = serde_json::to_value(to_out(&ex)).unwrap();
        assert_eq!(v["type"], "MULTIPLES_DIVISORS");
        assert_eq!(v["hasClosedSolution"], true);
        assert_eq!(v["badge"], "orange");
        assert!(v.get("question").is_none());
        assert!(v.get("hint").is_none());
    }

    #[test]
    fn category_table_is_complete() {
        let cats = categories();
        assert_eq!(cats.len(), 6);
        let v = serde_json::to_value(&cats[4]).unwrap();
        assert_eq!(
            v,
            json!({ "type": "CREATE_PROBLEM", "label": "¡Inventor de Problemas!", "badge": "purple", "hasClosedSolution": false })
        );
    }
}
