use super::backend::{CompletionBackend, ModelSource};
use super::candidates::{ModelCandidate, ModelCatalog};
use super::error::{ChatError, ChatResult};
use super::outcome::CallOutcome;
use super::prompt::build_prompt;
use crate::types::ChatMessage;

pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Resolves a chat message to one completion by walking every mechanism,
/// API version and model name in priority order until something answers.
///
/// Attempts are strictly sequential: the first success wins and an invalid
/// key stops everything, so each outcome decides whether the next call
/// happens at all.
pub struct ModelCascade {
    models: Box<dyn ModelSource>,
    mechanisms: Vec<Box<dyn CompletionBackend>>,
    catalog: ModelCatalog,
    history_window: usize,
}

/// Failed attempt kept for the terminal error summary.
#[derive(Clone, Debug)]
struct Attempt {
    mechanism: String,
    candidate: ModelCandidate,
    outcome: CallOutcome,
}

impl Attempt {
    fn summary(&self) -> String {
        format!(
            "{} {}: {}",
            self.mechanism,
            self.candidate,
            self.outcome.reason()
        )
    }
}

impl ModelCascade {
    /// `mechanisms` are tried in the given order; put the primary first.
    pub fn new(
        models: Box<dyn ModelSource>,
        mechanisms: Vec<Box<dyn CompletionBackend>>,
        catalog: ModelCatalog,
    ) -> Self {
        Self {
            models,
            mechanisms,
            catalog,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    /// Discovery failures degrade to the catalog's fallback list.
    pub async fn candidate_names(&self) -> Vec<String> {
        let discovered = match self.models.list_models().await {
            Ok(models) => models,
            Err(err) => {
                tracing::warn!(error = %err, "model discovery failed, using fallback list");
                Vec::new()
            }
        };
        let names = self.catalog.ordered_names(&discovered);
        tracing::debug!(?names, "candidate models");
        names
    }

    pub async fn resolve(&self, message: &str, history: &[ChatMessage]) -> ChatResult<String> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let names = self.candidate_names().await;
        let prompt = build_prompt(message, history, self.history_window);
        let mut failures: Vec<Attempt> = Vec::new();

        for backend in &self.mechanisms {
            let mechanism = backend.mechanism();
            tracing::info!(mechanism, "trying completion mechanism");

            for &api_version in backend.api_versions() {
                for name in &names {
                    let candidate = ModelCandidate {
                        name: name.clone(),
                        api_version,
                    };

                    match backend.generate(&candidate, &prompt).await {
                        CallOutcome::Success { text } => {
                            tracing::info!(
                                mechanism,
                                %api_version,
                                model = %candidate.name,
                                "completion received"
                            );
                            return Ok(text);
                        }
                        CallOutcome::InvalidKey { leaked } => {
                            tracing::error!(
                                mechanism,
                                %api_version,
                                model = %candidate.name,
                                leaked,
                                "API key rejected, aborting"
                            );
                            return Err(ChatError::invalid_key(
                                leaked,
                                &format!("{mechanism} {candidate}"),
                            ));
                        }
                        outcome => {
                            if outcome == CallOutcome::RateLimited {
                                tracing::info!(
                                    mechanism,
                                    %api_version,
                                    model = %candidate.name,
                                    "rate limited, trying next model"
                                );
                            } else {
                                tracing::warn!(
                                    mechanism,
                                    %api_version,
                                    model = %candidate.name,
                                    reason = %outcome.reason(),
                                    "attempt failed"
                                );
                            }
                            failures.push(Attempt {
                                mechanism: mechanism.to_string(),
                                candidate,
                                outcome,
                            });
                        }
                    }
                }
            }
        }

        Err(terminal_error(&failures))
    }
}

fn terminal_error(failures: &[Attempt]) -> ChatError {
    let rate_limited = failures
        .iter()
        .any(|attempt| attempt.outcome == CallOutcome::RateLimited);

    tracing::error!(
        attempts = failures.len(),
        rate_limited,
        "every model attempt failed"
    );
    for attempt in failures {
        tracing::debug!(attempt = %attempt.summary());
    }

    if rate_limited {
        ChatError::QuotaExceeded
    } else {
        ChatError::Unavailable {
            attempts: failures.iter().map(Attempt::summary).collect(),
        }
    }
}
