//! Capability Advertisement
//!
//! The agent's static descriptor, served verbatim to discovery requests.

use serde::{Deserialize, Serialize};

/// Content types the agent accepts and produces
pub const SUPPORTED_CONTENT_TYPES: &[&str] = &["text", "text/plain"];

/// Capability flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCapabilities {
    pub streaming: bool,
}

/// An advertised skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub examples: Vec<String>,
}

/// The agent's identity and capabilities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDescriptor {
    pub name: String,
    pub description: String,
    pub url: String,
    pub version: String,
    pub default_input_modes: Vec<String>,
    pub default_output_modes: Vec<String>,
    pub capabilities: AgentCapabilities,
    pub skills: Vec<Skill>,
}

impl AgentDescriptor {
    /// The Shadowblade descriptor served at `url`
    pub fn shadowblade(url: impl Into<String>) -> Self {
        let modes: Vec<String> = SUPPORTED_CONTENT_TYPES.iter().map(|s| s.to_string()).collect();

        Self {
            name: "Shadowblade".to_string(),
            description: "A swift and silent operative in the Agentverse game. The Shadowblade \
                          responds to battlefield commands, executing attacks with a chosen weapon \
                          from its arsenal and reporting the outcome."
                .to_string(),
            url: url.into(),
            version: "1.0.0".to_string(),
            default_input_modes: modes.clone(),
            default_output_modes: modes,
            capabilities: AgentCapabilities { streaming: true },
            skills: vec![combat_actions()],
        }
    }

    /// Descriptor as returned to discovery requests
    pub fn describe(&self) -> &Self {
        self
    }
}

fn combat_actions() -> Skill {
    Skill {
        id: "combat_actions".to_string(),
        name: "combat_actions".to_string(),
        description: "Executes combat maneuvers. When commanded to attack a monster, the agent \
                      surveys its arsenal of weapon tools, selects the weapon whose description \
                      best matches the monster's stated weakness, executes the attack and returns \
                      the combat statistics (damage, effects, etc.)."
            .to_string(),
        tags: vec!["game".to_string(), "combat".to_string(), "shadowblade".to_string()],
        examples: vec![
            "Attack 'The Weaver of Spaghetti Code'.".to_string(),
            "Take down 'The Colossus of a Thousand Patches' with Revolutionary Rewrite weakness"
                .to_string(),
        ],
    }
}
