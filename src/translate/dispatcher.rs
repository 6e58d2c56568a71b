use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::endpoint::Endpoint;
use super::error::{AttemptError, DispatchError};
use super::interface::{
    Direction, EndpointHealth, LanguagePair, TranslationRequest, TranslationResponse, Translator,
};
use crate::config::TranslatorConfig;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Client of the remote translation service.
///
/// Tries every configured endpoint in order and returns the first translation
/// it gets. Holds no state between calls: an endpoint that failed last time is
/// tried first again on the next call.
#[derive(Debug, Clone)]
pub struct TranslationDispatcher {
    client: Client,
    endpoints: Vec<Endpoint>,
    languages: LanguagePair,
    context: String,
    deadline: Duration,
}

impl TranslationDispatcher {
    /// Build a dispatcher with its own HTTP client from translator settings
    pub fn new(config: &TranslatorConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("truetext/", env!("CARGO_PKG_VERSION")))
            .timeout(config.attempt_timeout())
            .connect_timeout(config.connect_timeout());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        info!(
            "Initialized TranslationDispatcher: endpoints={:?}, languages={}/{}",
            config.endpoints.iter().map(|e| e.base_url()).collect::<Vec<_>>(),
            config.languages.source,
            config.languages.target
        );

        Ok(Self::with_client(
            client,
            config.endpoints.clone(),
            config.languages.clone(),
            config.context.clone(),
            config.deadline(),
        ))
    }

    pub fn with_client(
        client: Client,
        endpoints: Vec<Endpoint>,
        languages: LanguagePair,
        context: String,
        deadline: Duration,
    ) -> Self {
        Self {
            client,
            endpoints,
            languages,
            context,
            deadline,
        }
    }

    /// Build the request payload for a call
    pub fn build_request(&self, text: &str, direction: Direction) -> TranslationRequest {
        TranslationRequest {
            text: text.to_string(),
            target_lang: self.languages.target_for(direction).to_string(),
            context: self.context.clone(),
        }
    }

    /// Translate `text`, falling back through the endpoints in order.
    ///
    /// The text is not validated here. Dropping the returned future abandons
    /// the in-flight attempt.
    pub async fn dispatch(&self, text: &str, direction: Direction) -> Result<String, DispatchError> {
        let request = self.build_request(text, direction);
        let payload = request.to_json_bytes().map_err(|e| {
            error!("Failed to encode translation request: {}", e);
            DispatchError::Encode(e.to_string())
        })?;

        debug!(
            "Dispatching translation: target_lang={}, chars={}",
            request.target_lang,
            text.chars().count()
        );

        match tokio::time::timeout(self.deadline, self.try_endpoints(&payload)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Translation deadline of {:?} elapsed", self.deadline);
                Err(DispatchError::DeadlineExceeded(self.deadline))
            }
        }
    }

    async fn try_endpoints(&self, payload: &[u8]) -> Result<String, DispatchError> {
        let mut last_error = None;
        let mut attempts = 0;

        for endpoint in &self.endpoints {
            attempts += 1;
            match self.attempt(endpoint, payload).await {
                Ok(response) => {
                    info!("Translation served by {}", endpoint);
                    return Ok(response.translation);
                }
                Err(AttemptOutcome::Failed(err)) => {
                    warn!("Failed to translate via {}: {}", endpoint, err);
                    last_error = Some(err);
                }
                Err(AttemptOutcome::Malformed(message)) => {
                    warn!("Malformed response from {}: {}", endpoint, message);
                    return Err(DispatchError::MalformedResponse {
                        endpoint: endpoint.to_string(),
                        message,
                    });
                }
            }
        }

        Err(DispatchError::AllEndpointsExhausted {
            attempts,
            last: last_error,
        })
    }

    async fn attempt(
        &self,
        endpoint: &Endpoint,
        payload: &[u8],
    ) -> Result<TranslationResponse, AttemptOutcome> {
        let url = endpoint.translate_url();
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_vec())
            .send()
            .await
            .map_err(|e| transport_failure(endpoint, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptOutcome::Failed(AttemptError::Http {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            }));
        }

        match response.json::<TranslationResponse>().await {
            Ok(body) => Ok(body),
            Err(e) if e.is_decode() => Err(AttemptOutcome::Malformed(e.to_string())),
            // the body never arrived in full, so the endpoint did not really answer
            Err(e) => Err(transport_failure(endpoint, &e)),
        }
    }

    /// GET each base URL; any HTTP answer counts as reachable
    pub async fn check_endpoints(&self) -> Vec<EndpointHealth> {
        let mut report = Vec::with_capacity(self.endpoints.len());
        for endpoint in &self.endpoints {
            let health = match self
                .client
                .get(endpoint.base_url())
                .timeout(HEALTH_CHECK_TIMEOUT)
                .send()
                .await
            {
                Ok(response) => EndpointHealth {
                    url: endpoint.to_string(),
                    reachable: true,
                    status: Some(response.status().as_u16()),
                    error: None,
                },
                Err(e) => EndpointHealth {
                    url: endpoint.to_string(),
                    reachable: false,
                    status: None,
                    error: Some(e.to_string()),
                },
            };
            report.push(health);
        }
        report
    }
}

enum AttemptOutcome {
    Failed(AttemptError),
    Malformed(String),
}

fn transport_failure(endpoint: &Endpoint, err: &reqwest::Error) -> AttemptOutcome {
    let message = if err.is_timeout() {
        format!("timed out: {}", err)
    } else {
        err.to_string()
    };
    AttemptOutcome::Failed(AttemptError::Transport {
        endpoint: endpoint.to_string(),
        message,
    })
}

#[async_trait]
impl Translator for TranslationDispatcher {
    async fn translate(&self, text: &str, direction: Direction) -> Result<String, DispatchError> {
        self.dispatch(text, direction).await
    }

    fn languages(&self) -> &LanguagePair {
        &self.languages
    }

    async fn endpoint_health(&self) -> Vec<EndpointHealth> {
        self.check_endpoints().await
    }
}
