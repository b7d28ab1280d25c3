//! In-process transports for exercising the engine without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use resttable_api::{HttpRequest, HttpResponse, HttpTransport};
use resttable_types::FetchError;
use tokio::sync::oneshot;

pub fn response(status: u16, status_text: &str, content_type: Option<&str>, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        status_text: status_text.to_string(),
        content_type: content_type.map(str::to_string),
        body: body.to_string(),
    }
}

pub fn json_response(status: u16, body: &str) -> HttpResponse {
    response(status, "OK", Some("application/json; charset=utf-8"), body)
}

/// Replays a fixed list of outcomes, then an optional fallback forever.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse, FetchError>>>,
    fallback: Option<HttpResponse>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<HttpResponse, FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn repeating(response: HttpResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Self::new(Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        self.requests.lock().unwrap().push(request);
        match self.script.lock().unwrap().pop_front() {
            Some(outcome) => outcome,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| FetchError::Network("no scripted response left".into())),
        }
    }
}

/// Holds every request open until the test releases it by arrival index.
pub struct GatedTransport {
    gates: Mutex<Vec<Option<oneshot::Sender<HttpResponse>>>>,
}

impl GatedTransport {
    pub fn new(expected: usize) -> Self {
        Self {
            gates: Mutex::new(Vec::with_capacity(expected)),
        }
    }

    pub fn arrived(&self) -> usize {
        self.gates.lock().unwrap().len()
    }

    pub async fn wait_for_requests(&self, count: usize) {
        while self.arrived() < count {
            tokio::task::yield_now().await;
        }
    }

    pub fn release(&self, index: usize, response: HttpResponse) {
        let gate = self.gates.lock().unwrap()[index].take();
        if let Some(gate) = gate {
            let _ = gate.send(response);
        }
    }
}

#[async_trait]
impl HttpTransport for GatedTransport {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let (sender, receiver) = oneshot::channel();
        self.gates.lock().unwrap().push(Some(sender));
        receiver
            .await
            .map_err(|_| FetchError::Network("gate closed".into()))
    }
}
