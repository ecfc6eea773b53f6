//! The Orchestrator collaborator: an opaque LLM-backed service that
//! turns a user prompt plus the current spec into proposed deltas (or
//! clarifying questions). The core never fabricates deltas itself — every
//! `add`/`update`/`remove` a generate run proposes comes from here.

use async_trait::async_trait;
use modforge_core::error::ForgeError;
use modforge_core::spec::ModSpec;
use modforge_core::SpecDelta;

/// The Orchestrator's response to one prompt: either proposed deltas, or
/// clarifying questions when the prompt is too ambiguous to act on.
///
/// A non-empty `clarifying_questions` implies
/// `requires_user_input` and an empty `deltas`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorResponse {
    /// Deltas proposed against `current_spec`. Empty when clarification is
    /// required.
    pub deltas: Vec<SpecDelta>,
    /// Questions the user must answer before deltas can be proposed.
    pub clarifying_questions: Vec<String>,
    /// The Orchestrator's free-text rationale, surfaced in
    /// `run.awaiting_input`.
    pub reasoning: String,
    /// Whether the caller must collect a user reply before proceeding.
    pub requires_user_input: bool,
}

impl OrchestratorResponse {
    /// Build a response with no clarifying questions and no reasoning.
    #[must_use]
    pub fn deltas(deltas: Vec<SpecDelta>) -> Self {
        Self {
            deltas,
            clarifying_questions: Vec::new(),
            reasoning: String::new(),
            requires_user_input: false,
        }
    }

    /// Build a response that asks the user one or more clarifying
    /// questions instead of proposing deltas.
    #[must_use]
    pub fn clarify(questions: Vec<String>, reasoning: impl Into<String>) -> Self {
        Self {
            deltas: Vec::new(),
            clarifying_questions: questions,
            reasoning: reasoning.into(),
            requires_user_input: true,
        }
    }
}

/// The LLM-backed service that parses a natural-language prompt into spec
/// deltas. Opaque and side-effecting from the core's perspective; modeled
/// as a narrow async trait so tests and the CLI's offline mode can supply
/// a deterministic stand-in.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Propose deltas (or clarifying questions) for `prompt` against
    /// `current_spec`.
    async fn propose(&self, prompt: &str, current_spec: Option<&ModSpec>) -> Result<OrchestratorResponse, ForgeError>;
}

/// A deterministic stand-in used by tests, the CLI's offline mode, and
/// anywhere a real LLM-backed Orchestrator is unavailable.
///
/// Never fabricates semantics beyond its configured canned response — it
/// either always asks `always_clarify`'s question, or always returns
/// `canned_deltas` unchanged, never inventing deltas a collaborator
/// didn't propose.
pub struct MockOrchestrator {
    canned_deltas: Vec<SpecDelta>,
    clarifying_questions: Vec<String>,
}

impl MockOrchestrator {
    /// An Orchestrator stand-in that always proposes `deltas` verbatim.
    #[must_use]
    pub fn with_deltas(deltas: Vec<SpecDelta>) -> Self {
        Self {
            canned_deltas: deltas,
            clarifying_questions: Vec::new(),
        }
    }

    /// An Orchestrator stand-in that always asks `questions` instead of
    /// proposing deltas.
    #[must_use]
    pub fn always_clarify(questions: Vec<String>) -> Self {
        Self {
            canned_deltas: Vec::new(),
            clarifying_questions: questions,
        }
    }
}

#[async_trait]
impl Orchestrator for MockOrchestrator {
    async fn propose(&self, _prompt: &str, _current_spec: Option<&ModSpec>) -> Result<OrchestratorResponse, ForgeError> {
        if !self.clarifying_questions.is_empty() {
            return Ok(OrchestratorResponse::clarify(
                self.clarifying_questions.clone(),
                "mock orchestrator configured to always ask for clarification",
            ));
        }
        Ok(OrchestratorResponse::deltas(self.canned_deltas.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_with_deltas_returns_them_unchanged() {
        let deltas = vec![SpecDelta::add("items[0]", serde_json::json!({"item_name": "Ruby Sword"}))];
        let orchestrator = MockOrchestrator::with_deltas(deltas.clone());
        let response = orchestrator.propose("add a ruby sword", None).await.unwrap();
        assert_eq!(response.deltas, deltas);
        assert!(response.clarifying_questions.is_empty());
        assert!(!response.requires_user_input);
    }

    #[tokio::test]
    async fn mock_always_clarify_never_proposes_deltas() {
        let orchestrator = MockOrchestrator::always_clarify(vec!["What should the item be?".to_string()]);
        let response = orchestrator.propose("add it", None).await.unwrap();
        assert!(response.deltas.is_empty());
        assert!(response.requires_user_input);
        assert_eq!(response.clarifying_questions.len(), 1);
    }
}
