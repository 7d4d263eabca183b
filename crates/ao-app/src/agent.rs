//! Debounced "agent mode": analyze the prompt once the user stops typing.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;
use ao_core::{ContentSuggestion, PromptAnalyzer};

pub const AGENT_DEBOUNCE: Duration = Duration::from_millis(800);

pub struct PromptAgent {
    prompt_tx: watch::Sender<String>,
    suggestions: mpsc::UnboundedReceiver<ContentSuggestion>,
    task: JoinHandle<()>,
}

impl PromptAgent {
    pub fn spawn(analyzer: PromptAnalyzer, debounce: Duration) -> Self {
        let (prompt_tx, prompt_rx) = watch::channel(String::new());
        let (suggestion_tx, suggestions) = mpsc::unbounded_channel();

        let task = tokio::spawn(run(analyzer, debounce, prompt_rx, suggestion_tx));

        Self {
            prompt_tx,
            suggestions,
            task,
        }
    }

    /// Record a prompt edit; restarts the debounce window.
    pub fn edit(&self, prompt: impl Into<String>) {
        self.prompt_tx.send_replace(prompt.into());
    }

    pub async fn next_suggestion(&mut self) -> Option<ContentSuggestion> {
        self.suggestions.recv().await
    }

    pub fn try_next_suggestion(&mut self) -> Option<ContentSuggestion> {
        self.suggestions.try_recv().ok()
    }
}

impl Drop for PromptAgent {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    analyzer: PromptAnalyzer,
    debounce: Duration,
    mut prompt_rx: watch::Receiver<String>,
    suggestion_tx: mpsc::UnboundedSender<ContentSuggestion>,
) {
    loop {
        if prompt_rx.changed().await.is_err() {
            return;
        }

        // Wait for a quiet period; every further edit restarts the timer
        loop {
            tokio::select! {
                changed = prompt_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        let prompt = prompt_rx.borrow_and_update().clone();
        match analyzer.analyze(&prompt) {
            Some(suggestion) => {
                debug!(content_type = ?suggestion.content_type, confidence = suggestion.confidence, "prompt suggestion");
                if suggestion_tx.send(suggestion).is_err() {
                    return;
                }
            }
            None => debug!(len = prompt.len(), "prompt too short to analyze"),
        }
    }
}
