//! Weapon definitions
//!
//! A weapon is the armory's unit of execution: a named tool with a free-text
//! description (the only thing selection matches against) and the stat ranges
//! the outcome generator samples from.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ArmoryError;

/// Inclusive base-damage range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRange {
    pub min: i64,
    pub max: i64,
}

impl DamageRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// A constant damage value (utility effects)
    pub fn fixed(value: i64) -> Self {
        Self { min: value, max: value }
    }

    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Inclusive critical-hit-chance range, both ends in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CritRange {
    pub low: f64,
    pub high: f64,
}

impl CritRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn fixed(value: f64) -> Self {
        Self { low: value, high: value }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// A registered weapon (tool)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    /// Tool name (snake_case, unique within a registry)
    pub name: String,
    /// Display name reported in combat results
    pub weapon_name: String,
    /// Free-text description used for weakness matching
    pub description: String,
    pub damage_type: String,
    pub damage: DamageRange,
    pub crit: CritRange,
    /// Carried verbatim into every result
    pub special_effect: String,
}

impl Weapon {
    /// Start a weapon definition; stats default to zero until set
    pub fn new(name: &str, weapon_name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            weapon_name: weapon_name.to_string(),
            description: description.to_string(),
            damage_type: String::new(),
            damage: DamageRange::fixed(0),
            crit: CritRange::fixed(0.0),
            special_effect: String::new(),
        }
    }

    pub fn with_damage_type(mut self, damage_type: &str) -> Self {
        self.damage_type = damage_type.to_string();
        self
    }

    pub fn with_damage(mut self, min: i64, max: i64) -> Self {
        self.damage = DamageRange::new(min, max);
        self
    }

    pub fn with_crit(mut self, low: f64, high: f64) -> Self {
        self.crit = CritRange::new(low, high);
        self
    }

    pub fn with_special_effect(mut self, effect: &str) -> Self {
        self.special_effect = effect.to_string();
        self
    }

    /// Check range invariants
    pub fn validate(&self) -> Result<(), ArmoryError> {
        let invalid = |reason: String| ArmoryError::InvalidTool {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        if self.damage.min > self.damage.max {
            return Err(invalid(format!(
                "damage min {} exceeds max {}",
                self.damage.min, self.damage.max
            )));
        }
        let CritRange { low, high } = self.crit;
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low > high {
            return Err(invalid(format!("critical range [{}, {}] is not within [0, 1]", low, high)));
        }
        if !is_hundredths(low) || !is_hundredths(high) {
            return Err(invalid(format!(
                "critical range [{}, {}] has more than 2 decimals",
                low, high
            )));
        }
        Ok(())
    }

    /// MCP tool definition for introspection
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
            output_schema: result_schema(),
        }
    }
}

/// Tool definition as reported by `tools/list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    #[serde(rename = "outputSchema")]
    pub output_schema: Value,
}

fn is_hundredths(value: f64) -> bool {
    let scaled = value * 100.0;
    (scaled - scaled.round()).abs() < 1e-9
}

/// JSON schema of a combat result
pub fn result_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "weapon_name": { "type": "string" },
            "damage_type": { "type": "string" },
            "base_damage": { "type": "number" },
            "critical_hit_chance": { "type": "number", "minimum": 0, "maximum": 1 },
            "special_effect": { "type": "string" }
        },
        "required": [
            "weapon_name",
            "damage_type",
            "base_damage",
            "critical_hit_chance",
            "special_effect"
        ]
    })
}
