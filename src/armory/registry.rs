//! Tool Registry
//!
//! Populated once at startup, then shared read-only behind an `Arc`.
//! Registration order is kept and used as the selection tie-break.

use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::outcome::{self, CombatResult};
use super::weapon::{ToolDefinition, Weapon};
use crate::error::ArmoryError;

/// Registry of armory weapons
#[derive(Debug, Default)]
pub struct ToolRegistry {
    weapons: Vec<Arc<Weapon>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a weapon; names must be unique
    pub fn register(&mut self, weapon: Weapon) -> Result<(), ArmoryError> {
        weapon.validate()?;
        if self.index.contains_key(&weapon.name) {
            return Err(ArmoryError::DuplicateTool(weapon.name));
        }

        debug!("Registered weapon: {}", weapon.name);
        self.index.insert(weapon.name.clone(), self.weapons.len());
        self.weapons.push(Arc::new(weapon));
        Ok(())
    }

    /// Build a registry from weapons in order
    pub fn from_weapons(weapons: impl IntoIterator<Item = Weapon>) -> Result<Self, ArmoryError> {
        let mut registry = Self::new();
        for weapon in weapons {
            registry.register(weapon)?;
        }
        Ok(registry)
    }

    /// All weapons in registration order
    pub fn list(&self) -> &[Arc<Weapon>] {
        &self.weapons
    }

    /// Look up a weapon by tool name
    pub fn get(&self, name: &str) -> Result<Arc<Weapon>, ArmoryError> {
        self.index
            .get(name)
            .map(|&i| self.weapons[i].clone())
            .ok_or_else(|| ArmoryError::UnknownTool(name.to_string()))
    }

    /// Invoke a weapon with the thread-local random source
    pub fn invoke(&self, name: &str) -> Result<CombatResult, ArmoryError> {
        let weapon = self.get(name)?;
        Ok(outcome::generate(&weapon))
    }

    /// Invoke a weapon with an explicit random source
    pub fn invoke_with<R: Rng + ?Sized>(
        &self,
        name: &str,
        rng: &mut R,
    ) -> Result<CombatResult, ArmoryError> {
        let weapon = self.get(name)?;
        Ok(outcome::generate_with(&weapon, rng))
    }

    /// MCP definitions for every weapon
    pub fn list_definitions(&self) -> Vec<ToolDefinition> {
        self.weapons.iter().map(|w| w.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }
}
