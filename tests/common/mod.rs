#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use truetext::config::TranslatorConfig;
use truetext::translate::{
    Direction, DispatchError, Endpoint, LanguagePair, TranslationDispatcher, Translator,
};

/// How a mock translation endpoint answers `POST /translate`
#[derive(Clone)]
pub enum Behavior {
    Translate(&'static str),
    Status(u16),
    Hang(Duration),
    Raw(&'static str),
}

#[derive(Clone)]
pub struct MockEndpoint {
    pub endpoint: Endpoint,
    calls: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<Vec<u8>>>>,
    content_types: Arc<Mutex<Vec<String>>>,
    behavior: Behavior,
}

impl MockEndpoint {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<Vec<u8>> {
        self.bodies.lock().unwrap().clone()
    }

    pub fn content_types(&self) -> Vec<String> {
        self.content_types.lock().unwrap().clone()
    }
}

async fn handle_translate(
    State(mock): State<MockEndpoint>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    mock.calls.fetch_add(1, Ordering::SeqCst);
    mock.bodies.lock().unwrap().push(body.to_vec());
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    mock.content_types.lock().unwrap().push(content_type);

    match mock.behavior {
        Behavior::Translate(text) => (StatusCode::OK, Json(json!({ "translation": text }))).into_response(),
        Behavior::Status(code) => StatusCode::from_u16(code).unwrap().into_response(),
        Behavior::Hang(delay) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, Json(json!({ "translation": "too late" }))).into_response()
        }
        Behavior::Raw(body) => (StatusCode::OK, body).into_response(),
    }
}

/// Start a translation endpoint on an ephemeral loopback port
pub async fn spawn_endpoint(behavior: Behavior) -> MockEndpoint {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mock = MockEndpoint {
        endpoint: Endpoint::new(format!("http://{}", addr)),
        calls: Arc::new(AtomicUsize::new(0)),
        bodies: Arc::new(Mutex::new(Vec::new())),
        content_types: Arc::new(Mutex::new(Vec::new())),
        behavior,
    };
    let app = Router::new()
        .route("/translate", post(handle_translate))
        .with_state(mock.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    mock
}

/// An endpoint nothing listens on
pub async fn closed_endpoint() -> Endpoint {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Endpoint::new(format!("http://{}", addr))
}

pub fn translator_config(endpoints: Vec<Endpoint>) -> TranslatorConfig {
    TranslatorConfig {
        endpoints,
        attempt_timeout_ms: 300,
        connect_timeout_ms: 300,
        deadline_ms: 5_000,
        ..TranslatorConfig::default()
    }
}

pub fn dispatcher(endpoints: Vec<Endpoint>) -> TranslationDispatcher {
    TranslationDispatcher::new(&translator_config(endpoints)).unwrap()
}

/// In-process translator. Text starting with "slow" takes two seconds.
pub struct FakeTranslator {
    pub calls: AtomicUsize,
    languages: LanguagePair,
    failure: Option<DispatchError>,
}

impl FakeTranslator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            languages: LanguagePair::default(),
            failure: None,
        }
    }

    pub fn failing(error: DispatchError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(&self, text: &str, direction: Direction) -> Result<String, DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.starts_with("slow") {
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(match (text, direction) {
            ("Hello", Direction::Forward) => "Hej".to_string(),
            ("Hej", Direction::Reversed) => "Hello".to_string(),
            _ => format!("{} [{}]", text, self.languages.target_for(direction)),
        })
    }

    fn languages(&self) -> &LanguagePair {
        &self.languages
    }
}

/// Poll until `check` holds, for at most a second
pub async fn wait_until(check: impl Fn() -> bool) {
    for _ in 0..100 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 1s");
}
