use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use kycocr::errors::ProviderError;
use kycocr::optimizer::{DocumentOptimizer, OptimizedDocument};
use kycocr::providers::ai::{InferenceProvider, InferenceRequest};
use kycocr::InputDocument;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// --- Envelope builders ---

/// Wraps a JSON answer the way `generateContent` returns it.
pub fn candidate_envelope(answer: &Value) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": answer.to_string() }] },
            "finishReason": "STOP"
        }]
    })
}

/// Wraps a JSON answer as base64 inline data.
pub fn inline_data_envelope(answer: &Value) -> Value {
    let data = general_purpose::STANDARD.encode(answer.to_string());
    json!({
        "candidates": [{
            "content": { "parts": [{ "inlineData": { "mimeType": "application/json", "data": data } }] }
        }]
    })
}

// --- Mock Inference Provider ---

#[derive(Clone, Debug)]
enum MockReply {
    Envelope(Value),
    Failure(String),
}

/// An inference provider that replays one programmed reply and records every request.
#[derive(Clone, Debug)]
pub struct MockInferenceProvider {
    reply: Arc<Mutex<MockReply>>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<InferenceRequest>>>,
}

impl MockInferenceProvider {
    fn with_reply(reply: MockReply) -> Self {
        Self {
            reply: Arc::new(Mutex::new(reply)),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Replies with `envelope` verbatim.
    pub fn returning(envelope: Value) -> Self {
        Self::with_reply(MockReply::Envelope(envelope))
    }

    /// Replies with `answer` wrapped in a candidates envelope.
    pub fn answering(answer: Value) -> Self {
        Self::returning(candidate_envelope(&answer))
    }

    /// Fails every call with an API error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self::with_reply(MockReply::Failure(message.to_string()))
    }

    /// Sleeps before replying, keeping the request in flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replaces the programmed reply for subsequent calls.
    pub fn set_answer(&self, answer: Value) {
        *self.reply.lock().unwrap() = MockReply::Envelope(candidate_envelope(&answer));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Retrieves the recorded requests for assertion.
    pub fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceProvider for MockInferenceProvider {
    async fn generate(&self, request: &InferenceRequest) -> Result<Value, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.reply.lock().unwrap().clone();
        match reply {
            MockReply::Envelope(envelope) => Ok(envelope),
            MockReply::Failure(body) => Err(ProviderError::Api { status: 500, body }),
        }
    }
}

// --- Pass-through optimizer ---

/// An optimizer that never transcodes, so tests can assert on the exact bytes sent.
#[derive(Clone, Debug, Default)]
pub struct PassThroughOptimizer {
    calls: Arc<AtomicUsize>,
}

impl PassThroughOptimizer {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentOptimizer for PassThroughOptimizer {
    async fn optimize(&self, document: InputDocument) -> OptimizedDocument {
        self.calls.fetch_add(1, Ordering::SeqCst);
        OptimizedDocument::unchanged(document)
    }
}

/// A small upload with the given name and MIME type.
pub fn sample_document(name: &str, mime_type: &str) -> InputDocument {
    InputDocument::new(b"not-really-an-image".to_vec(), mime_type, name)
}
