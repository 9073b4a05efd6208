//! The planet record shown in the panel, plus the fixed initial and fallback records.

use serde::{Deserialize, Serialize};

/// Status line used when a reply carries no message of its own.
pub const DEFAULT_MESSAGE: &str = "New coordinates established.";

/// Status line paired with the fallback record.
pub const FALLBACK_MESSAGE: &str = "The void whispers of your arrival, traveler.";

/// A cosmetic planet description. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetRecord {
    pub name: String,
    pub description: String,
    pub age: String,
    pub mass: String,
    pub temperature: String,
    pub atmosphere: Vec<String>,
}

impl PlanetRecord {
    /// The record displayed before any request has been made.
    pub fn initial() -> Self {
        Self {
            name: "Cerulean-9".to_string(),
            description: "A majestic gas giant wrapped in sapphire mists and frozen methane \
                          clouds. Its colossal rings sing with the light of a thousand \
                          captured comets."
                .to_string(),
            age: "4.5 Billion Years".to_string(),
            mass: "124 Earth Masses".to_string(),
            temperature: "-185°C".to_string(),
            atmosphere: vec!["Hydrogen".to_string(), "He".to_string(), "CH4".to_string()],
        }
    }

    /// The record returned whenever generation fails.
    pub fn fallback() -> Self {
        Self {
            name: "Aethelgard-9".to_string(),
            description: "A colossal blue gas giant located in the outer rim of the Sapphire \
                          Nebula. Its rings are composed of ionized silicates and glowing mana \
                          crystals."
                .to_string(),
            age: "4.2 Billion Years".to_string(),
            mass: "95.2 Earth Masses".to_string(),
            temperature: "-178°C".to_string(),
            atmosphere: ["Hydrogen", "Helium", "Methane", "Exotic Ether"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// What one gateway call settles with: a record and a status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CosmicReply {
    pub record: PlanetRecord,
    pub message: String,
}

impl CosmicReply {
    /// The fixed reply used on every failure path.
    pub fn fallback() -> Self {
        Self {
            record: PlanetRecord::fallback(),
            message: FALLBACK_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_record() {
        let record = PlanetRecord::initial();
        assert_eq!(record.name, "Cerulean-9");
        assert_eq!(record.mass, "124 Earth Masses");
        assert_eq!(record.temperature, "-185°C");
        assert_eq!(record.atmosphere, ["Hydrogen", "He", "CH4"]);
        assert!(record.description.starts_with("A majestic gas giant wrapped in sapphire mists"));
        assert!(!record.description.contains("  "));
    }

    #[test]
    fn test_fallback_reply() {
        let reply = CosmicReply::fallback();
        assert_eq!(reply.record.name, "Aethelgard-9");
        assert_eq!(reply.record.age, "4.2 Billion Years");
        assert_eq!(reply.record.mass, "95.2 Earth Masses");
        assert_eq!(reply.record.temperature, "-178°C");
        assert_eq!(
            reply.record.atmosphere,
            ["Hydrogen", "Helium", "Methane", "Exotic Ether"]
        );
        assert_eq!(
            reply.record.description,
            "A colossal blue gas giant located in the outer rim of the Sapphire Nebula. \
             Its rings are composed of ionized silicates and glowing mana crystals."
        );
        assert_eq!(reply.message, "The void whispers of your arrival, traveler.");
    }

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_value(PlanetRecord::initial()).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        for key in ["name", "description", "age", "mass", "temperature", "atmosphere"] {
            assert!(keys.contains(&key), "missing {key}");
        }
    }
}
