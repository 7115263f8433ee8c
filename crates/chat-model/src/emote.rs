//! Emote weighting.
//!
//! The table maps emote identifiers to excitement multipliers. Lookups are
//! case-insensitive; the spelling stored in the table is canonical. Emotes
//! missing from the table weigh [`DEFAULT_EMOTE_WEIGHT`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Weight of an emote that has no entry in the table.
pub const DEFAULT_EMOTE_WEIGHT: f64 = 1.0;

/// Emotes tracked when the caller supplies no table of their own.
pub const HYPE_EMOTES: &[&str] = &[
    "PogChamp",
    "Pog",
    "PogU",
    "Poggers",
    "KEKW",
    "EZ",
    "HYPERS",
    "LETSGO",
    "CATJAM",
    "OMEGALUL",
    "WeirdChamp",
    "AYAYA",
    "PepeJAM",
    "HYPE",
    "LULW",
    "WIDEPEEPOHAPPY",
    "Clap",
    "KomodoHype",
    "5Head",
    "POGSLIDE",
    "PepeLaugh",
    "PepoG",
    "peepoClap",
    "POGCRAZY",
    "FeelsWowMan",
    "PartyParrot",
    "peepoWow",
    "monkaS",
    "TriHard",
    "popCat",
    "POGGIN",
    "POGGIES",
    "monkaW",
    "NOPERS",
    "COGGERS",
    "blobDance",
    "POGGY",
    "Wowee",
];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EmoteWeightError {
    #[error("emote `{emote}` has invalid weight {weight}; weights must be positive and finite")]
    InvalidWeight { emote: String, weight: f64 },

    #[error("emote identifier must not be empty")]
    EmptyIdentifier,

    #[error("emote `{first}` and `{second}` differ only by case")]
    CaseCollision { first: String, second: String },

    #[error("malformed emote weight `{entry}`; expected NAME or NAME=WEIGHT")]
    MalformedEntry { entry: String },
}

/// Mapping from emote identifier to a positive weight multiplier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, f64>",
    into = "BTreeMap<String, f64>"
)]
pub struct EmoteWeightTable {
    weights: BTreeMap<String, f64>,
    /// Lowercased identifier -> canonical identifier.
    index: HashMap<String, String>,
}

impl EmoteWeightTable {
    /// Build a table, rejecting non-positive weights and case collisions.
    pub fn new(weights: BTreeMap<String, f64>) -> Result<Self, EmoteWeightError> {
        let mut index = HashMap::with_capacity(weights.len());
        for (emote, &weight) in &weights {
            if emote.trim().is_empty() {
                return Err(EmoteWeightError::EmptyIdentifier);
            }
            if !(weight.is_finite() && weight > 0.0) {
                return Err(EmoteWeightError::InvalidWeight {
                    emote: emote.clone(),
                    weight,
                });
            }
            if let Some(existing) = index.insert(emote.to_lowercase(), emote.clone()) {
                return Err(EmoteWeightError::CaseCollision {
                    first: existing,
                    second: emote.clone(),
                });
            }
        }
        Ok(Self { weights, index })
    }

    /// An empty table: every emote weighs the default.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in hype emote list, each at the default weight.
    pub fn hype_defaults() -> Self {
        let weights = HYPE_EMOTES
            .iter()
            .map(|emote| (emote.to_string(), DEFAULT_EMOTE_WEIGHT))
            .collect();
        // The built-in list has no collisions and only default weights.
        Self::new(weights).unwrap_or_default()
    }

    /// Parse `NAME` or `NAME=WEIGHT` entries (as given on a command line).
    pub fn from_entries<I, S>(entries: I) -> Result<Self, EmoteWeightError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut weights = BTreeMap::new();
        for entry in entries {
            let (name, weight) = parse_weight_entry(entry.as_ref())?;
            weights.insert(name, weight);
        }
        Self::new(weights)
    }

    /// Return a copy with `other`'s entries layered on top.
    pub fn merged_with(&self, other: &EmoteWeightTable) -> Result<Self, EmoteWeightError> {
        let mut weights = self.weights.clone();
        for (emote, &weight) in &other.weights {
            if let Some(existing) = self.canonical(emote) {
                let existing = existing.to_string();
                weights.remove(&existing);
            }
            weights.insert(emote.clone(), weight);
        }
        Self::new(weights)
    }

    /// Weight of an emote, falling back to [`DEFAULT_EMOTE_WEIGHT`].
    pub fn weight(&self, emote: &str) -> f64 {
        self.canonical(emote)
            .and_then(|canonical| self.weights.get(canonical))
            .copied()
            .unwrap_or(DEFAULT_EMOTE_WEIGHT)
    }

    /// Canonical spelling of a tracked emote, matched case-insensitively.
    pub fn canonical(&self, emote: &str) -> Option<&str> {
        if let Some((key, _)) = self.weights.get_key_value(emote) {
            return Some(key.as_str());
        }
        self.index.get(&emote.to_lowercase()).map(String::as_str)
    }

    /// Find tracked emotes in free text at word boundaries.
    pub fn detect(&self, text: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        if self.weights.is_empty() {
            return found;
        }

        for token in text.split_whitespace() {
            if let Some(canonical) = self.canonical(token) {
                found.insert(canonical.to_string());
                continue;
            }
            for word in token
                .split(|c: char| !(c.is_alphanumeric() || c == '_'))
                .filter(|w| !w.is_empty())
            {
                if let Some(canonical) = self.canonical(word) {
                    found.insert(canonical.to_string());
                }
            }
        }

        found
    }

    /// A message's contribution to its bucket: `1 + sum of emote weights`.
    pub fn message_weight<'a, I>(&self, emotes: I) -> f64
    where
        I: IntoIterator<Item = &'a String>,
    {
        1.0 + emotes
            .into_iter()
            .map(|emote| self.weight(emote))
            .sum::<f64>()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(emote, w)| (emote.as_str(), *w))
    }
}

impl TryFrom<BTreeMap<String, f64>> for EmoteWeightTable {
    type Error = EmoteWeightError;

    fn try_from(weights: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::new(weights)
    }
}

impl From<EmoteWeightTable> for BTreeMap<String, f64> {
    fn from(table: EmoteWeightTable) -> Self {
        table.weights
    }
}

/// Parse one `NAME` or `NAME=WEIGHT` entry.
pub fn parse_weight_entry(entry: &str) -> Result<(String, f64), EmoteWeightError> {
    let malformed = || EmoteWeightError::MalformedEntry {
        entry: entry.to_string(),
    };

    match entry.split_once('=') {
        None => {
            let name = entry.trim();
            if name.is_empty() {
                return Err(EmoteWeightError::EmptyIdentifier);
            }
            Ok((name.to_string(), DEFAULT_EMOTE_WEIGHT))
        }
        Some((name, weight)) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(EmoteWeightError::EmptyIdentifier);
            }
            let weight: f64 = weight.trim().parse().map_err(|_| malformed())?;
            Ok((name.to_string(), weight))
        }
    }
}
