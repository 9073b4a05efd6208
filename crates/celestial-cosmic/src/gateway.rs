//! Prompt in, planet record out. Never fails from the caller's side.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::{GenerationRequest, ModelError, TextModel};
use crate::record::{CosmicReply, PlanetRecord, DEFAULT_MESSAGE};

/// Anything that can turn prompt text into a reply.
///
/// Implementations must always settle with a value; failures become the
/// fallback reply.
pub trait RecordSource: Send + Sync + 'static {
    fn fetch_record(&self, prompt: &str) -> CosmicReply;
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Model returned an empty body")]
    EmptyBody,
    #[error("Reply does not match the record shape: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Reply has an empty atmosphere list")]
    EmptyAtmosphere,
}

/// Wire shape of the model's JSON reply.
#[derive(Debug, Deserialize)]
struct RecordReply {
    #[serde(flatten)]
    record: PlanetRecord,
    #[serde(default)]
    message: Option<String>,
}

/// Wrap the user's text in the cartographer instruction.
pub fn build_prompt(prompt: &str) -> String {
    format!(
        "You are a Galactic Cartographer. Describe this specific planet: {prompt}. \
         Focus on a blue gas giant with luminous rings. Return data in the specified JSON format."
    )
}

/// Structured-output schema: six record fields plus a greeting, all required.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "description": { "type": "STRING" },
            "age": { "type": "STRING" },
            "mass": { "type": "STRING" },
            "temperature": { "type": "STRING" },
            "atmosphere": { "type": "ARRAY", "items": { "type": "STRING" } },
            "message": { "type": "STRING", "description": "A cosmic greeting or lore snippet" },
        },
        "required": ["name", "description", "age", "mass", "temperature", "atmosphere", "message"],
    })
}

/// Parse raw model text into a reply.
pub fn parse_reply(text: &str) -> Result<CosmicReply, GatewayError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(GatewayError::EmptyBody);
    }
    let reply: RecordReply = serde_json::from_str(text)?;
    if reply.record.atmosphere.is_empty() {
        return Err(GatewayError::EmptyAtmosphere);
    }
    let message = reply
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
    Ok(CosmicReply {
        record: reply.record,
        message,
    })
}

/// The cosmic-info gateway over an injected model client.
pub struct CosmicGateway<M: TextModel> {
    model: M,
}

impl<M: TextModel> CosmicGateway<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// One attempt, errors surfaced. [`RecordSource::fetch_record`] wraps this.
    pub fn try_fetch(&self, prompt: &str) -> Result<CosmicReply, GatewayError> {
        let request = GenerationRequest {
            prompt: build_prompt(prompt),
            response_schema: response_schema(),
        };
        let text = self.model.generate(&request)?;
        parse_reply(&text)
    }
}

impl<M: TextModel + 'static> RecordSource for CosmicGateway<M> {
    fn fetch_record(&self, prompt: &str) -> CosmicReply {
        match self.try_fetch(prompt) {
            Ok(reply) => {
                tracing::info!(name = %reply.record.name, "Planet record received");
                reply
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cosmic lookup failed, using fallback record");
                CosmicReply::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::gemini::GeminiClient;

    /// Model that returns a canned result and remembers the last request.
    struct FakeModel {
        result: fn() -> Result<String, ModelError>,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    impl FakeModel {
        fn new(result: fn() -> Result<String, ModelError>) -> Self {
            Self {
                result,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextModel for FakeModel {
        fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError> {
            self.seen.lock().unwrap().push(request.clone());
            (self.result)()
        }
    }

    const KEPLER: &str = r#"{
        "name": "Kepler-442b",
        "description": "A temperate world.",
        "age": "2.9 Billion Years",
        "mass": "2.3 Earth Masses",
        "temperature": "-2°C",
        "atmosphere": ["Nitrogen", "Oxygen", "Argon"],
        "message": "Signal acquired."
    }"#;

    #[test]
    fn test_prompt_template() {
        assert_eq!(
            build_prompt("Kepler-442b"),
            "You are a Galactic Cartographer. Describe this specific planet: Kepler-442b. \
             Focus on a blue gas giant with luminous rings. Return data in the specified JSON format."
        );
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required.len(), 7);
        assert!(required.contains(&"atmosphere"));
        assert_eq!(schema["properties"]["atmosphere"]["type"], "ARRAY");
        assert_eq!(schema["properties"]["atmosphere"]["items"]["type"], "STRING");
    }

    #[test]
    fn test_well_formed_reply() {
        let gateway = CosmicGateway::new(FakeModel::new(|| Ok(KEPLER.to_string())));
        let reply = gateway.fetch_record("Kepler-442b");

        assert_eq!(reply.record.name, "Kepler-442b");
        assert_eq!(reply.record.description, "A temperate world.");
        assert_eq!(reply.record.age, "2.9 Billion Years");
        assert_eq!(reply.record.mass, "2.3 Earth Masses");
        assert_eq!(reply.record.temperature, "-2°C");
        assert_eq!(reply.record.atmosphere, ["Nitrogen", "Oxygen", "Argon"]);
        assert_eq!(reply.message, "Signal acquired.");

        let seen = gateway.model().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].prompt.contains("Describe this specific planet: Kepler-442b."));
        assert_eq!(seen[0].response_schema, response_schema());
    }

    #[test]
    fn test_missing_message_uses_default() {
        let reply = parse_reply(
            r#"{"name":"X","description":"d","age":"a","mass":"m","temperature":"t","atmosphere":["H"]}"#,
        )
        .unwrap();
        assert_eq!(reply.message, DEFAULT_MESSAGE);

        let reply = parse_reply(
            r#"{"name":"X","description":"d","age":"a","mass":"m","temperature":"t","atmosphere":["H"],"message":"  "}"#,
        )
        .unwrap();
        assert_eq!(reply.message, DEFAULT_MESSAGE);
    }

    #[test]
    fn test_transport_failure_falls_back() {
        let gateway = CosmicGateway::new(FakeModel::new(|| {
            Err(ModelError::Transport("connection refused".to_string()))
        }));
        assert_eq!(gateway.fetch_record("anything"), CosmicReply::fallback());
    }

    #[test]
    fn test_empty_body_falls_back() {
        let gateway = CosmicGateway::new(FakeModel::new(|| Ok("   ".to_string())));
        assert!(matches!(gateway.try_fetch("x"), Err(GatewayError::EmptyBody)));
        assert_eq!(gateway.fetch_record("x"), CosmicReply::fallback());
    }

    #[test]
    fn test_malformed_body_falls_back() {
        let gateway = CosmicGateway::new(FakeModel::new(|| Ok(r#"{"name":"only"}"#.to_string())));
        assert!(matches!(gateway.try_fetch("x"), Err(GatewayError::Malformed(_))));
        assert_eq!(gateway.fetch_record("x"), CosmicReply::fallback());
    }

    #[test]
    fn test_empty_atmosphere_falls_back() {
        let gateway = CosmicGateway::new(FakeModel::new(|| {
            Ok(r#"{"name":"X","description":"d","age":"a","mass":"m","temperature":"t","atmosphere":[]}"#.to_string())
        }));
        assert!(matches!(gateway.try_fetch("x"), Err(GatewayError::EmptyAtmosphere)));
        assert_eq!(gateway.fetch_record("x"), CosmicReply::fallback());
    }

    #[test]
    fn test_missing_credential_falls_back() {
        let gateway = CosmicGateway::new(GeminiClient::new("http://127.0.0.1:9", "m", None));
        assert_eq!(gateway.fetch_record("Kepler-442b"), CosmicReply::fallback());
    }

    #[test]
    fn test_unreachable_endpoint_falls_back() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = GeminiClient::new(format!("http://127.0.0.1:{port}"), "m", Some("k".into()));
        let gateway = CosmicGateway::new(client);
        assert_eq!(gateway.fetch_record("Kepler-442b"), CosmicReply::fallback());
    }
}
