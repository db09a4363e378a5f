use std::sync::Arc;

use tracing::{debug, info, warn};

use super::client::{CompletionClient, CompletionError};
use super::config::{LLMConfig, RetryPolicy};
use super::tokenizer::count_tokens;

/// Prompts at or above this many tokens go to the extended-context model.
pub const SHORT_CONTEXT_TOKEN_LIMIT: usize = 3000;

/// What the model is told to reply when the passage has no answer.
pub const OUT_OF_SCOPE_MARKER: &str = "out of scope";

/// Answer reported when both attempts for a question fail.
pub const FAILED_ANSWER: &str = "Oops, unable to get answer from ChatGPT!";

/// Receives `(completed, total)` after every question.
pub trait ProgressObserver {
    fn on_question_done(&self, completed: usize, total: usize);

    fn on_finished(&self) {}
}

pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_question_done(&self, _completed: usize, _total: usize) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionOutcome {
    Answered(String),
    Failed,
}

impl QuestionOutcome {
    pub fn into_answer(self) -> String {
        match self {
            QuestionOutcome::Answered(answer) => answer,
            QuestionOutcome::Failed => FAILED_ANSWER.to_string(),
        }
    }
}

pub fn build_prompt(passage: &str, question: &str) -> String {
    format!(
        "Answer the following question using only the provided context. \
         Do not give any answer that does not come from the context. \
         If there is not an answer in the context, respond with the text '{}'.\n\n\
         CONTEXT:\n{}\n\n\
         QUESTION:\n{}",
        OUT_OF_SCOPE_MARKER, passage, question
    )
}

/// Picks the short-context model below the token limit, the extended one otherwise.
pub fn select_model(prompt_tokens: usize, config: &LLMConfig) -> &str {
    if prompt_tokens < SHORT_CONTEXT_TOKEN_LIMIT {
        &config.short_model
    } else {
        &config.long_model
    }
}

pub struct Answerer {
    client: Arc<dyn CompletionClient>,
    config: LLMConfig,
}

impl Answerer {
    pub fn new(client: Arc<dyn CompletionClient>, config: LLMConfig) -> Self {
        Self { client, config }
    }

    pub async fn answer_all(&self, passage: &str, questions: &[String]) -> Vec<String> {
        self.answer_all_with_progress(passage, questions, &NoProgress).await
    }

    /// One answer per question, in question order. Never fails: a question
    /// whose calls all fail gets [`FAILED_ANSWER`].
    pub async fn answer_all_with_progress(
        &self,
        passage: &str,
        questions: &[String],
        progress: &dyn ProgressObserver,
    ) -> Vec<String> {
        let total = questions.len();
        info!("Answering {} questions", total);

        let mut answers = Vec::with_capacity(total);
        for (i, question) in questions.iter().enumerate() {
            let outcome = self.answer_one(i, passage, question).await;
            answers.push(outcome.into_answer());
            progress.on_question_done(i + 1, total);
        }
        progress.on_finished();

        answers
    }

    pub async fn answer_one(&self, index: usize, passage: &str, question: &str) -> QuestionOutcome {
        let prompt = build_prompt(passage, question);
        let prompt_tokens = count_tokens(&prompt);
        let model = select_model(prompt_tokens, &self.config);
        debug!("Question {}: {} prompt tokens, using {}", index + 1, prompt_tokens, model);

        let first_err = match self.client.complete(model, &prompt).await {
            Ok(answer) => return QuestionOutcome::Answered(answer),
            Err(e) => e,
        };
        warn!("Question {}: completion failed: {}", index + 1, first_err);

        if !self.should_retry(&first_err) {
            warn!("Question {}: not retrying non-transient failure", index + 1);
            return QuestionOutcome::Failed;
        }

        match self.client.complete(model, &prompt).await {
            Ok(answer) => {
                info!("Question {}: retry succeeded", index + 1);
                QuestionOutcome::Answered(answer)
            }
            Err(e) => {
                warn!("Question {}: retry failed: {}", index + 1, e);
                QuestionOutcome::Failed
            }
        }
    }

    fn should_retry(&self, err: &CompletionError) -> bool {
        match self.config.retry_policy {
            RetryPolicy::Always => true,
            RetryPolicy::TransientOnly => err.is_transient(),
        }
    }
}
