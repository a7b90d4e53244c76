//! Armory
//!
//! The discoverable registry of executable weapons and the outcome generator
//! behind each invocation.

pub mod arsenal;
pub mod outcome;
pub mod registry;
pub mod weapon;

pub use arsenal::{standard_registry, standard_weapons};
pub use outcome::{generate, generate_with, CombatResult};
pub use registry::ToolRegistry;
pub use weapon::{result_schema, CritRange, DamageRange, ToolDefinition, Weapon};
