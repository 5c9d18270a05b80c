use crate::core::view::{Command, ExplainerView, Message};
use crate::domain::model::{ChatRequest, ChatResponse, Language, Level};
use crate::domain::ports::ExplainBackend;
use crate::utils::error::Result;
use crate::utils::validation::validate_non_blank;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Runs the side effects requested by an [`ExplainerView`].
///
/// Cloning is cheap and every clone shares the same view, so a clone can be
/// moved into a spawned task to submit in the background.
pub struct Explainer<B: ExplainBackend> {
    backend: Arc<B>,
    view: Arc<Mutex<ExplainerView>>,
}

impl<B: ExplainBackend> Clone for Explainer<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            view: Arc::clone(&self.view),
        }
    }
}

impl<B: ExplainBackend> Explainer<B> {
    pub fn new(backend: B) -> Self {
        Self::with_view(backend, ExplainerView::new())
    }

    pub fn with_view(backend: B, view: ExplainerView) -> Self {
        Self {
            backend: Arc::new(backend),
            view: Arc::new(Mutex::new(view)),
        }
    }

    async fn dispatch(&self, message: Message) -> Option<Command> {
        self.view.lock().await.update(message)
    }

    pub async fn set_code(&self, code: impl Into<String>) {
        self.dispatch(Message::CodeChanged(code.into())).await;
    }

    pub async fn set_language(&self, language: Language) {
        self.dispatch(Message::LanguageSelected(language)).await;
    }

    pub async fn set_level(&self, level: Level) {
        self.dispatch(Message::LevelSelected(level)).await;
    }

    pub async fn snapshot(&self) -> ExplainerView {
        self.view.lock().await.clone()
    }

    /// Sends the current form to the backend and applies the outcome.
    ///
    /// Returns the request's sequence number, or `None` when the code was
    /// blank and nothing was sent. Failures are logged, never returned. The
    /// view lock is not held while the request is in flight, so overlapping
    /// calls both complete and the one that settles last is displayed.
    pub async fn submit(&self) -> Option<u64> {
        let command = self.begin_submit().await?;
        Some(self.execute(command).await)
    }

    /// First half of [`submit`](Self::submit): marks the view busy and returns
    /// the request to send, or `None` for blank code.
    pub async fn begin_submit(&self) -> Option<Command> {
        self.dispatch(Message::Submit).await
    }

    /// Second half of [`submit`](Self::submit): sends the request and applies
    /// whatever comes back.
    pub async fn execute(&self, command: Command) -> u64 {
        let Command::Explain { seq, request } = command;

        let outcome = self.backend.explain(&request).await;
        if outcome.is_ok() {
            tracing::info!("Explain request #{} succeeded", seq);
        }
        self.dispatch(Message::Settled { seq, outcome }).await;
        seq
    }

    /// Asks a follow-up question about the code currently in the form.
    pub async fn chat(&self, question: &str) -> Result<ChatResponse> {
        validate_non_blank("question", question)?;
        let request = {
            let view = self.view.lock().await;
            validate_non_blank("code", view.code())?;
            ChatRequest {
                question: question.to_string(),
                code: view.code().to_string(),
                language: view.language(),
                level: view.level(),
            }
        };
        tracing::debug!("Sending chat question ({} chars)", request.question.len());
        self.backend.chat(&request).await
    }

    pub async fn health(&self) -> Result<bool> {
        self.backend.health().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ExplainRequest, Explanation};
    use crate::utils::error::ExplainError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use tokio::sync::oneshot;

    fn explanation(summary: &str) -> Explanation {
        Explanation {
            summary: summary.to_string(),
            walkthrough: vec![],
            concepts: vec![],
            gotchas: vec![],
            improvements: vec![],
            questions_to_ask: vec![],
            risks: vec![],
        }
    }

    /// Each explain call waits on the next queued receiver, so the test
    /// decides when and how every request settles.
    #[derive(Default)]
    struct ScriptedBackend {
        gates: std::sync::Mutex<VecDeque<oneshot::Receiver<Result<Explanation>>>>,
        seen: std::sync::Mutex<Vec<ExplainRequest>>,
    }

    impl ScriptedBackend {
        fn gate(&self) -> oneshot::Sender<Result<Explanation>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().push_back(rx);
            tx
        }
    }

    #[async_trait]
    impl ExplainBackend for ScriptedBackend {
        async fn explain(&self, request: &ExplainRequest) -> Result<Explanation> {
            self.seen.lock().unwrap().push(request.clone());
            let gate = self.gates.lock().unwrap().pop_front();
            match gate {
                Some(rx) => rx.await.unwrap_or_else(|_| {
                    Err(ExplainError::ValidationError {
                        message: "gate dropped".to_string(),
                    })
                }),
                None => Ok(explanation("ungated")),
            }
        }

        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
            Ok(ChatResponse {
                answer: format!("{} about {}", request.question, request.language),
            })
        }

        async fn health(&self) -> Result<bool> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_blank_code_sends_nothing() {
        let explainer = Explainer::new(ScriptedBackend::default());
        explainer.set_code("   ").await;

        assert_eq!(explainer.submit().await, None);
        assert!(explainer.backend.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_busy_while_request_pending() {
        let backend = ScriptedBackend::default();
        let gate = backend.gate();
        let explainer = Explainer::new(backend);
        explainer.set_code("x = 1").await;

        let task = tokio::spawn({
            let explainer = explainer.clone();
            async move { explainer.submit().await }
        });
        while explainer.backend.seen.lock().unwrap().is_empty() {
            tokio::task::yield_now().await;
        }
        assert!(explainer.snapshot().await.is_in_flight());

        gate.send(Ok(explanation("done"))).unwrap();
        assert_eq!(task.await.unwrap(), Some(1));

        let view = explainer.snapshot().await;
        assert!(!view.is_in_flight());
        assert_eq!(view.explanation().unwrap().summary, "done");
    }

    #[tokio::test]
    async fn test_overlapping_submits_last_settled_wins() {
        let backend = ScriptedBackend::default();
        let first_gate = backend.gate();
        let second_gate = backend.gate();
        let explainer = Explainer::new(backend);

        explainer.set_code("print('first')").await;
        let first = tokio::spawn({
            let explainer = explainer.clone();
            async move { explainer.submit().await }
        });
        while explainer.backend.seen.lock().unwrap().len() < 1 {
            tokio::task::yield_now().await;
        }

        explainer.set_code("console.log('second')").await;
        explainer.set_language(Language::Javascript).await;
        let second = tokio::spawn({
            let explainer = explainer.clone();
            async move { explainer.submit().await }
        });
        while explainer.backend.seen.lock().unwrap().len() < 2 {
            tokio::task::yield_now().await;
        }

        second_gate.send(Ok(explanation("second"))).unwrap();
        assert_eq!(second.await.unwrap(), Some(2));
        first_gate.send(Ok(explanation("first"))).unwrap();
        assert_eq!(first.await.unwrap(), Some(1));

        let seen = explainer.backend.seen.lock().unwrap().clone();
        assert_eq!(seen[0].language, Language::Python);
        assert_eq!(seen[1].language, Language::Javascript);

        let view = explainer.snapshot().await;
        assert_eq!(view.explanation().unwrap().summary, "first");
        assert_eq!(view.last_issued(), 2);
    }

    #[tokio::test]
    async fn test_failed_submit_is_swallowed() {
        let backend = ScriptedBackend::default();
        let ok_gate = backend.gate();
        let err_gate = backend.gate();
        let explainer = Explainer::new(backend);
        explainer.set_code("x = 1").await;

        ok_gate.send(Ok(explanation("good"))).unwrap();
        explainer.submit().await;

        err_gate
            .send(Err(ExplainError::StatusError {
                status: 502,
                body: "Model returned invalid JSON".to_string(),
            }))
            .unwrap();
        assert_eq!(explainer.submit().await, Some(2));

        let view = explainer.snapshot().await;
        assert_eq!(view.explanation().unwrap().summary, "good");
        assert!(!view.is_in_flight());
    }

    #[tokio::test]
    async fn test_chat_uses_current_form() {
        let explainer = Explainer::new(ScriptedBackend::default());
        explainer.set_code("int main() {}").await;
        explainer.set_language(Language::Cpp).await;

        let response = explainer.chat("why int").await.unwrap();
        assert_eq!(response.answer, "why int about cpp");
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_inputs() {
        let explainer = Explainer::new(ScriptedBackend::default());
        assert!(explainer.chat("why?").await.is_err());

        explainer.set_code("x = 1").await;
        assert!(explainer.chat("  ").await.is_err());
    }
}
