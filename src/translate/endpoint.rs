use serde::{Deserialize, Serialize};

/// One candidate base URL of the translation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Endpoint {
    base_url: String,
}

impl Endpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn translate_url(&self) -> String {
        format!("{}/translate", self.base_url)
    }
}

impl From<String> for Endpoint {
    fn from(base_url: String) -> Self {
        Endpoint::new(base_url)
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.base_url
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base_url)
    }
}

/// Built-in candidates, highest priority first: LAN address, then loopback names
pub fn default_endpoints() -> Vec<Endpoint> {
    [
        "http://192.168.242.195:8000",
        "http://localhost:8000",
        "http://127.0.0.1:8000",
    ]
    .into_iter()
    .map(Endpoint::new)
    .collect()
}
