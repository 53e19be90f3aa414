/*!
 * Mock translator implementations for testing and offline replay.
 *
 * This module provides a mock translator that simulates different behaviors:
 * - `MockTranslator::working()` - Always succeeds with tagged text
 * - `MockTranslator::intermittent(n)` - Fails every n-th request
 * - `MockTranslator::failing()` - Always fails with an API error
 * - `MockTranslator::failing_on("needle")` - Fails requests containing a needle
 * - `MockTranslator::merged_segments()` - Ignores delimiters in batched requests
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

use crate::errors::ProviderError;
use crate::providers::{ProviderProfile, Translator};

/// A request received by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock translator
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds, segment by segment
    Working,
    /// Fails every Nth request with a 503
    Intermittent { fail_every: usize },
    /// Always fails with an API error
    Failing,
    /// Fails with a transport error when the request contains the needle
    FailOn { needle: String },
    /// Answers batched requests with all segments run together
    MergedSegments,
    /// Returns an empty response
    Empty,
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
}

/// Mock translator for testing scheduling behavior
#[derive(Debug, Clone)]
pub struct MockTranslator {
    behavior: MockBehavior,
    profile: ProviderProfile,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<MockRequest>>>,
    gate: Option<Arc<Semaphore>>,
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            profile: ProviderProfile::single_segment(0),
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            gate: None,
            custom_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn failing_on(needle: &str) -> Self {
        Self::new(MockBehavior::FailOn { needle: needle.to_string() })
    }

    pub fn merged_segments() -> Self {
        Self::new(MockBehavior::MergedSegments)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Report a different batching profile
    pub fn with_profile(mut self, profile: ProviderProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Hold every response until a permit is added to the gate
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Set a custom response generator for single segments
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// The text the working mock produces for one segment
    pub fn expected_translation(segment: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, segment)
    }

    fn translate_segments(&self, request: &MockRequest) -> String {
        let delimiter = &self.profile.delimiter;
        request
            .text
            .split(delimiter.as_str())
            .map(|segment| {
                let single = MockRequest { text: segment.to_string(), ..request.clone() };
                match self.custom_response {
                    Some(generator) => generator(&single),
                    None => Self::expected_translation(segment, &request.target_language),
                }
            })
            .collect::<Vec<_>>()
            .join(delimiter)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let request = MockRequest {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };
        self.requests.lock().push(request.clone());

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| ProviderError::ConnectionError("gate closed".to_string()))?;
            permit.forget();
        }

        match &self.behavior {
            MockBehavior::Working => Ok(self.translate_segments(&request)),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.translate_segments(&request))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::FailOn { needle } => {
                if text.contains(needle.as_str()) {
                    Err(ProviderError::RequestFailed(format!("Simulated failure for '{}'", needle)))
                } else {
                    Ok(self.translate_segments(&request))
                }
            }

            MockBehavior::MergedSegments => Ok(text
                .split(self.profile.delimiter.as_str())
                .map(|segment| Self::expected_translation(segment, target_language))
                .collect::<Vec<_>>()
                .join(" ")),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(self.translate_segments(&request))
            }
        }
    }

    fn profile(&self) -> ProviderProfile {
        self.profile.clone()
    }
}
