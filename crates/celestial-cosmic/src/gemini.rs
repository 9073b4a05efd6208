//! Blocking client for the hosted `generateContent` endpoint.

use serde_json::{json, Value};

use celestial_config::GatewayConfig;

use crate::model::{GenerationRequest, ModelError, TextModel};

const API_KEY_HEADER: &str = "x-goog-api-key";
const DEFAULT_API_KEY_ENV: &str = "API_KEY";

pub struct GeminiClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    agent: ureq::Agent,
}

impl GeminiClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            agent: ureq::Agent::new(),
        }
    }

    /// Name of the environment variable the key is read from, reported when it is missing.
    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = var.into();
        self
    }

    /// Build a client from config, reading the key from the configured
    /// environment variable. An unset or empty variable leaves the key absent.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(var = %config.api_key_env, "No API key set, requests will use the fallback record");
        }
        Self::new(&config.endpoint, &config.model, api_key).with_api_key_env(&config.api_key_env)
    }

    pub fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.model)
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_body(request: &GenerationRequest) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": request.prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": request.response_schema,
            },
        })
    }
}

/// Concatenate the text parts of the first candidate. Missing text is empty.
fn extract_text(envelope: &Value) -> String {
    envelope
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

impl TextModel for GeminiClient {
    fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ModelError::MissingCredential(self.api_key_env.clone()));
        };

        tracing::debug!(model = %self.model, "Requesting planet record");
        let response = self
            .agent
            .post(&self.url())
            .set(API_KEY_HEADER, api_key)
            .send_json(Self::request_body(request))
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => ModelError::Status {
                    code,
                    body: resp.into_string().unwrap_or_default(),
                },
                ureq::Error::Transport(t) => ModelError::Transport(t.to_string()),
            })?;

        let envelope: Value = response
            .into_json()
            .map_err(|e| ModelError::Malformed(e.to_string()))?;
        Ok(extract_text(&envelope))
    }
}
