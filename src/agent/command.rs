//! Command Resolution
//!
//! Extracts the target and its weakness from a free-text battlefield command:
//! - `Attack 'The Weaver of Spaghetti Code' with Slashing weakness`
//! - `Take down 'The Colossus of a Thousand Patches' with Revolutionary Rewrite weakness`
//! - `Strike the hydra, it is weak to Legacy Debt`

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TaskError;

// Opening quote must start a word so apostrophes (`dragon's`) are not read as quotes
static QUOTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|\s)'([^']+)'|(?:^|\s)"([^"]+)""#).expect("valid quoted regex")
});

static VERB_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:please\s+)?(?:attack|take\s+down|strike|fight|defeat|slay|hit)\s+(.+?)(?:\s*,.*|\s+with\s+.*|\s+(?:which|that|it)\s+.*)?$",
    )
    .expect("valid verb regex")
});

static WEAKNESS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bwith\s+(?:an?\s+|the\s+)?(.+?)\s+weakness(?:es)?\b",
        r"(?i)\bweak(?:ness)?\s+(?:to|against)\s+(.+?)\s*(?:[.!?;]|$)",
        r"(?i)\bweakness(?:\s+is|\s*:)\s*(.+?)\s*(?:[.!?;]|$)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid weakness regex"))
    .collect()
});

/// What a command resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Named target, if one was found
    pub target: Option<String>,
    /// Matching cue: the stated weakness, or the target name when none was stated
    pub weakness: String,
    /// Whether the weakness was stated explicitly
    pub explicit_weakness: bool,
}

/// Resolve a command into a target and weakness
///
/// A target is required. Without a stated weakness the target name becomes the cue.
pub fn resolve(command: &str) -> Result<Resolution, TaskError> {
    let Some(target) = extract_target(command) else {
        return Err(TaskError::AmbiguousCommand(format!(
            "no target found in '{}'",
            command.trim()
        )));
    };

    Ok(match extract_weakness(command) {
        Some(weakness) => Resolution {
            target: Some(target),
            weakness,
            explicit_weakness: true,
        },
        None => Resolution {
            weakness: target.clone(),
            target: Some(target),
            explicit_weakness: false,
        },
    })
}

/// The quoted phrase, or the words following an attack verb
pub fn extract_target(command: &str) -> Option<String> {
    if let Some(caps) = QUOTED.captures(command) {
        let quoted = caps.get(1).or_else(|| caps.get(2)).map(|m| clean(m.as_str()));
        if let Some(q) = quoted.filter(|q| !q.is_empty()) {
            return Some(q);
        }
    }

    VERB_TARGET
        .captures(command)
        .and_then(|caps| caps.get(1))
        .map(|m| clean(m.as_str()))
        .filter(|t| !t.is_empty())
}

/// The explicitly stated weakness, if any
pub fn extract_weakness(command: &str) -> Option<String> {
    WEAKNESS_PATTERNS
        .iter()
        .filter_map(|re| re.captures(command))
        .filter_map(|caps| caps.get(1).map(|m| clean(m.as_str())))
        .find(|w| !w.is_empty())
}

fn clean(text: &str) -> String {
    text.trim()
        .trim_matches(|c: char| c.is_whitespace() || "'\".,!?:;".contains(c))
        .to_string()
}
