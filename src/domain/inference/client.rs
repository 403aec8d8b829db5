use std::fmt::Debug;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{Completion, InferenceError};

/// External inference capability (OpenAI-compatible providers, test doubles)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InferenceClient: Send + Sync + Debug {
    /// Complete a prompt with the given model, bounded by `max_tokens` of output
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        max_tokens: u32,
    ) -> Result<Completion, InferenceError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::domain::inference::Usage;

    type Responder = Arc<dyn Fn(&str, &str) -> Result<Completion, InferenceError> + Send + Sync>;

    /// Inference client that replays scripted results, then falls back to a responder
    pub struct ScriptedInferenceClient {
        script: Mutex<VecDeque<Result<Completion, InferenceError>>>,
        responder: Option<Responder>,
        delay: Option<Duration>,
        calls: AtomicU32,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
        models: Mutex<Vec<String>>,
    }

    impl std::fmt::Debug for ScriptedInferenceClient {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ScriptedInferenceClient")
                .field("calls", &self.calls.load(Ordering::SeqCst))
                .finish()
        }
    }

    impl Default for ScriptedInferenceClient {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ScriptedInferenceClient {
        pub fn new() -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                responder: None,
                delay: None,
                calls: AtomicU32::new(0),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
                models: Mutex::new(Vec::new()),
            }
        }

        /// Queue a result to be returned by the next unscripted call
        pub fn then(self, result: Result<Completion, InferenceError>) -> Self {
            self.script.lock().unwrap().push_back(result);
            self
        }

        /// Queue a text completion
        pub fn then_text(self, text: impl Into<String>) -> Self {
            self.then(Ok(Completion::new(text, Usage::new(100, 20))))
        }

        /// Queue an error `times` times
        pub fn then_fail(self, error: InferenceError, times: usize) -> Self {
            for _ in 0..times {
                self.script.lock().unwrap().push_back(Err(error.clone()));
            }
            self
        }

        /// Responder used once the script runs dry
        pub fn with_responder<F>(mut self, responder: F) -> Self
        where
            F: Fn(&str, &str) -> Result<Completion, InferenceError> + Send + Sync + 'static,
        {
            self.responder = Some(Arc::new(responder));
            self
        }

        /// Answer every prompt with the same text
        pub fn always_text(self, text: impl Into<String>) -> Self {
            let text = text.into();
            self.with_responder(move |_, _| Ok(Completion::new(text.clone(), Usage::new(100, 20))))
        }

        /// Fail every call with the same error
        pub fn always_fail(self, error: InferenceError) -> Self {
            self.with_responder(move |_, _| Err(error.clone()))
        }

        /// Simulated network latency per call
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn peak_in_flight(&self) -> usize {
            self.peak_in_flight.load(Ordering::SeqCst)
        }

        pub fn models(&self) -> Vec<String> {
            self.models.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InferenceClient for ScriptedInferenceClient {
        async fn complete(
            &self,
            prompt: &str,
            model: &str,
            _max_tokens: u32,
        ) -> Result<Completion, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.models.lock().unwrap().push(model.to_string());

            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let scripted = self.script.lock().unwrap().pop_front();
            let result = match scripted {
                Some(result) => result,
                None => match &self.responder {
                    Some(responder) => responder(prompt, model),
                    None => Err(InferenceError::server("No scripted response")),
                },
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }

        fn provider_name(&self) -> &'static str {
            "scripted"
        }
    }
}
