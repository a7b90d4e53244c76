//! Outcome Generator
//!
//! Produces a randomized but range-bounded combat result for a weapon.
//! Stateless: the default entry point draws from the thread-local generator
//! (independently seeded per thread), so concurrent invocations share nothing.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::weapon::Weapon;

/// Result of one weapon invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatResult {
    pub weapon_name: String,
    pub damage_type: String,
    pub base_damage: i64,
    /// Rounded to 2 decimal places
    pub critical_hit_chance: f64,
    pub special_effect: String,
}

/// Generate a result using the thread-local random source
pub fn generate(weapon: &Weapon) -> CombatResult {
    generate_with(weapon, &mut rand::thread_rng())
}

/// Generate a result from an explicit random source
pub fn generate_with<R: Rng + ?Sized>(weapon: &Weapon, rng: &mut R) -> CombatResult {
    let damage = weapon.damage;
    let base_damage = if damage.is_fixed() {
        damage.min
    } else {
        rng.gen_range(damage.min..=damage.max)
    };

    let crit = weapon.crit;
    let sampled = if crit.low == crit.high {
        crit.low
    } else {
        rng.gen_range(crit.low..=crit.high)
    };
    // Bounds are validated to hundredths; clamp only absorbs float noise
    let critical_hit_chance = round2(sampled).clamp(crit.low, crit.high);

    CombatResult {
        weapon_name: weapon.weapon_name.clone(),
        damage_type: weapon.damage_type.clone(),
        base_damage,
        critical_hit_chance,
        special_effect: weapon.special_effect.clone(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
