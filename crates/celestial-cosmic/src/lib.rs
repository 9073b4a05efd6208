//! Cosmic-info gateway.
//!
//! Sends a free-text prompt to a hosted generative model and returns a
//! [`PlanetRecord`]. Every failure (missing credential, transport, status,
//! empty or malformed body) resolves to [`CosmicReply::fallback`] instead of
//! an error, so callers always get something to display.

pub mod gateway;
pub mod gemini;
pub mod model;
pub mod record;

pub use gateway::{
    build_prompt, parse_reply, response_schema, CosmicGateway, GatewayError, RecordSource,
};
pub use gemini::GeminiClient;
pub use model::{GenerationRequest, ModelError, TextModel};
pub use record::{CosmicReply, PlanetRecord, DEFAULT_MESSAGE, FALLBACK_MESSAGE};
