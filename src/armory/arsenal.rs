//! Standard arsenal
//!
//! The weapons the armory registers at startup, in selection-priority order.

use super::registry::ToolRegistry;
use super::weapon::Weapon;
use crate::error::ArmoryError;

/// The armory's weapons in registration order
pub fn standard_weapons() -> Vec<Weapon> {
    vec![
        Weapon::new(
            "forge_broadsword",
            "Forged Broadsword",
            "A well-balanced blade against 'The Weaver of Spaghetti Code'.",
        )
        .with_damage_type("Slashing")
        .with_damage(110, 140)
        .with_crit(0.15, 0.25)
        .with_special_effect("Cleave - has a chance to hit multiple tangled lines of code at once."),
        Weapon::new(
            "enchant_soulshard_dagger",
            "Soulshard Dagger",
            "Effective against 'Revolutionary Rewrite' weaknesses like 'The Colossus of a Thousand Patches'.",
        )
        .with_damage_type("Arcane/Piercing")
        .with_damage(120, 135)
        .with_crit(0.25, 0.40)
        .with_special_effect("Phase Strike - ignores a portion of the target's legacy complexity."),
        Weapon::new(
            "hone_refactoring_sickle",
            "Refactoring Sickle",
            "Cuts through 'Legacy Debt' weaknesses, best against 'The Hydra of Nested Conditionals'.",
        )
        .with_damage_type("Slashing")
        .with_damage(95, 125)
        .with_crit(0.10, 0.20)
        .with_special_effect("Untangle - flattens deeply nested branches into a single clean path."),
        Weapon::new(
            "quench_lightning_kris",
            "Lightning Kris",
            "Strikes 'Latency' weaknesses such as 'The Leviathan of Blocking Calls'.",
        )
        .with_damage_type("Lightning")
        .with_damage(100, 130)
        .with_crit(0.30, 0.45)
        .with_special_effect("Chain Spark - arcs across every awaiting call in the target's path."),
        Weapon::new(
            "raise_scaffolding_bulwark",
            "Scaffolding Bulwark",
            "A defensive utility for 'Missing Test' weaknesses like 'The Specter of Untested Paths'.",
        )
        .with_damage_type("Utility")
        .with_damage(20, 40)
        .with_crit(0.0, 0.05)
        .with_special_effect(
            "Scaffolding - erects a harness of tests around the target, exposing it to follow-up strikes.",
        ),
        Weapon::new(
            "invoke_final_deprecation",
            "Final Deprecation",
            "Ends 'Obsolescence' weaknesses; the last rite for 'The Revenant of Deprecated APIs'.",
        )
        .with_damage_type("Void")
        .with_damage(0, 0)
        .with_crit(0.0, 0.0)
        .with_special_effect("Finality - the target is marked for removal and cannot be revived."),
    ]
}

/// Registry holding the standard arsenal
pub fn standard_registry() -> Result<ToolRegistry, ArmoryError> {
    ToolRegistry::from_weapons(standard_weapons())
}
