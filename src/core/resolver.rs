//! Alias and fuzzy name resolution.
//!
//! The pure half of the lookup resolver: exact alias/canonical matching and ranked
//! similarity suggestions. Presenting suggestions to the user is done by the session,
//! which owns the choice protocol.

use std::collections::{HashMap, HashSet};
use std::fmt;

/// Class of entity a name is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityClass {
    /// Pokémon names
    Pokemon,
    /// Skill names
    Skill,
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pokemon => "pokemon",
            Self::Skill => "skill",
        })
    }
}

/// Canonical names of one entity class plus the alias table.
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    canonical: Vec<String>,
    canonical_by_lower: HashMap<String, String>,
    aliases: Vec<(String, String)>,
    alias_by_lower: HashMap<String, String>,
}

/// One fuzzy suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The alias or canonical name that matched
    pub matched: String,
    /// Canonical name it resolves to
    pub target: String,
}

impl Candidate {
    /// Label shown in a choice prompt: `matched (target)` when they differ.
    #[must_use]
    pub fn label(&self) -> String {
        if self.matched.eq_ignore_ascii_case(&self.target) {
            self.target.clone()
        } else {
            format!("{} ({})", self.matched, self.target)
        }
    }
}

impl LookupTables {
    /// Builds tables from canonical names and `(alias, target)` pairs.
    ///
    /// Aliases pointing outside this class's canonical names are dropped, so a Pokémon
    /// alias never resolves a skill lookup.
    #[must_use]
    pub fn new(canonical: Vec<String>, aliases: Vec<(String, String)>) -> Self {
        let canonical_by_lower: HashMap<String, String> = canonical
            .iter()
            .map(|name| (name.to_lowercase(), name.clone()))
            .collect();
        let aliases: Vec<(String, String)> = aliases
            .into_iter()
            .filter_map(|(alias, target)| {
                canonical_by_lower
                    .get(&target.to_lowercase())
                    .map(|canonical| (alias, canonical.clone()))
            })
            .collect();
        let alias_by_lower = aliases
            .iter()
            .map(|(alias, target)| (alias.to_lowercase(), target.clone()))
            .collect();

        Self {
            canonical,
            canonical_by_lower,
            aliases,
            alias_by_lower,
        }
    }

    /// Canonical name for `query` via alias substitution and case-insensitive matching.
    #[must_use]
    pub fn resolve_exact(&self, query: &str) -> Option<String> {
        let lower = query.trim().to_lowercase();
        let substituted = self
            .alias_by_lower
            .get(&lower)
            .map_or(lower, |target| target.to_lowercase());
        self.canonical_by_lower.get(&substituted).cloned()
    }

    /// Up to `limit` suggestions scoring at least `cutoff`, best first, de-duplicated by
    /// target (first occurrence wins).
    #[must_use]
    pub fn suggestions(&self, query: &str, cutoff: f64, limit: usize) -> Vec<Candidate> {
        let query = query.trim().to_lowercase();
        let mut scored: Vec<(f64, Candidate)> = self
            .aliases
            .iter()
            .map(|(alias, target)| Candidate {
                matched: alias.clone(),
                target: target.clone(),
            })
            .chain(self.canonical.iter().map(|name| Candidate {
                matched: name.clone(),
                target: name.clone(),
            }))
            .map(|candidate| (similarity(&query, &candidate.matched.to_lowercase()), candidate))
            .filter(|(score, _)| *score >= cutoff)
            .collect();

        scored.sort_by(|(sa, ca), (sb, cb)| {
            sb.total_cmp(sa).then_with(|| ca.matched.cmp(&cb.matched))
        });
        scored.truncate(limit);

        let mut seen = HashSet::new();
        scored
            .into_iter()
            .map(|(_, candidate)| candidate)
            .filter(|candidate| seen.insert(candidate.target.clone()))
            .collect()
    }
}

/// Edit distance between two strings, counted in chars.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let n = b_chars.len();

    let mut prev_row: Vec<usize> = (0..=n).collect();
    let mut curr_row = vec![0usize; n + 1];

    for (i, a_ch) in a_chars.iter().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let cost = usize::from(a_ch != b_ch);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[n]
}

/// Similarity in `[0, 1]`: one minus the edit distance over the longer length.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}
