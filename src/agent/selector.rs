//! Weapon Selection
//!
//! Deterministic best-match of a resolved weakness (and target name) against
//! weapon descriptions. Case-insensitive:
//! - whole weakness phrase in the description: +3
//! - whole target name in the description: +3
//! - each distinct keyword of either found as a word in the description: +1
//!
//! Highest score wins, earliest registration breaks ties, zero means no match.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::command::Resolution;
use crate::armory::Weapon;

const PHRASE_SCORE: u32 = 3;
const KEYWORD_SCORE: u32 = 1;
const MIN_KEYWORD_LEN: usize = 3;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "against", "like", "its", "from", "into", "weakness",
    "weaknesses", "that", "this", "those", "these", "are", "was", "attack",
];

/// A weapon together with its match score
#[derive(Debug, Clone)]
pub struct ScoredWeapon {
    pub weapon: Arc<Weapon>,
    pub score: u32,
}

/// Score one description against a resolution
pub fn score(description: &str, resolution: &Resolution) -> u32 {
    let description = description.to_lowercase();
    let words = words(&description);
    let mut total = 0;

    let weakness = resolution.weakness.to_lowercase();
    if !weakness.trim().is_empty() && description.contains(weakness.trim()) {
        total += PHRASE_SCORE;
    }

    let target = resolution.target.as_deref().map(str::to_lowercase);
    if let Some(target) = target.as_deref() {
        // Target doubles as the weakness cue when none was stated; count it once
        if !target.trim().is_empty() && target != weakness && description.contains(target.trim()) {
            total += PHRASE_SCORE;
        }
    }

    let mut keys = keywords(&weakness);
    if let Some(target) = target.as_deref() {
        keys.extend(keywords(target));
    }
    total += keys.iter().filter(|k| words.contains(k.as_str())).count() as u32 * KEYWORD_SCORE;

    total
}

/// Score every weapon, preserving registration order
pub fn rank(weapons: &[Arc<Weapon>], resolution: &Resolution) -> Vec<ScoredWeapon> {
    weapons
        .iter()
        .map(|w| ScoredWeapon {
            weapon: w.clone(),
            score: score(&w.description, resolution),
        })
        .collect()
}

/// Pick the best weapon, or `None` when nothing scores above zero
pub fn select(weapons: &[Arc<Weapon>], resolution: &Resolution) -> Option<ScoredWeapon> {
    let mut best: Option<ScoredWeapon> = None;
    for candidate in rank(weapons, resolution) {
        if candidate.score == 0 {
            continue;
        }
        // Strictly greater keeps the earliest registration on ties
        let better = best.as_ref().map_or(true, |b| candidate.score > b.score);
        if better {
            best = Some(candidate);
        }
    }
    best
}

fn words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn keywords(text: &str) -> BTreeSet<String> {
    words(text)
        .into_iter()
        .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN && !STOPWORDS.contains(&w.as_str()))
        .collect()
}
