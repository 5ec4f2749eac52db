// src/ccip/registry.rs

use lazy_static::lazy_static;
use std::collections::HashMap;
use thiserror::Error;

use super::similarity::{ratio, FUZZY_MATCH_CUTOFF};

/// Canonical chain identifiers and the free-text aliases users may type for them.
/// Iteration order matters: it breaks ties in the fuzzy pass.
pub const SUPPORTED_CHAINS: &[(&str, &[&str])] = &[
    (
        "ethereum_sepolia",
        &[
            "ethereum",
            "eth",
            "sepolia",
            "ethereum sepolia",
            "eth sepolia",
            "ethereum_sepolia",
        ],
    ),
    (
        "base_sepolia",
        &["base", "base sepolia", "base_sepolia", "coinbase"],
    ),
    (
        "arbitrum_sepolia",
        &[
            "arbitrum",
            "arb",
            "arbitrum sepolia",
            "arbitrum_sepolia",
            "arb sepolia",
        ],
    ),
    (
        "avalanche_fuji",
        &[
            "avalanche",
            "avax",
            "fuji",
            "avalanche fuji",
            "avalanche_fuji",
            "avax fuji",
        ],
    ),
];

lazy_static! {
    static ref DEFAULT_REGISTRY: ChainRegistry = ChainRegistry::from_table(SUPPORTED_CHAINS)
        .expect("built-in chain table must have disjoint aliases");
}

/// The registry built from [`SUPPORTED_CHAINS`].
pub fn default_registry() -> &'static ChainRegistry {
    &DEFAULT_REGISTRY
}

#[derive(Error, Debug, PartialEq)]
pub enum RegistryError {
    #[error("chain registry has no entries")]
    Empty,
    #[error("chain '{0}' has no aliases")]
    NoAliases(String),
    #[error("alias '{alias}' is claimed by both '{first}' and '{second}'")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },
}

#[derive(Debug, Clone)]
struct ChainEntry {
    id: String,
    aliases: Vec<String>,
}

/// Immutable alias table mapping free-form chain names onto canonical identifiers.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    entries: Vec<ChainEntry>,
    by_alias: HashMap<String, usize>,
}

impl ChainRegistry {
    /// Builds a registry, rejecting tables where one folded alias maps to two chains.
    pub fn new<I, A>(entries: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (String, A)>,
        A: IntoIterator<Item = String>,
    {
        let mut registry = Self {
            entries: Vec::new(),
            by_alias: HashMap::new(),
        };

        for (id, aliases) in entries {
            let index = registry.entries.len();
            let mut folded = Vec::new();
            for alias in aliases {
                let alias = alias.trim().to_lowercase();
                if let Some(&owner) = registry.by_alias.get(&alias) {
                    if owner == index {
                        continue;
                    }
                    return Err(RegistryError::DuplicateAlias {
                        alias,
                        first: registry.entries[owner].id.clone(),
                        second: id,
                    });
                }
                registry.by_alias.insert(alias.clone(), index);
                folded.push(alias);
            }
            if folded.is_empty() {
                return Err(RegistryError::NoAliases(id));
            }
            registry.entries.push(ChainEntry { id, aliases: folded });
        }

        if registry.entries.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(registry)
    }

    pub fn from_table(table: &[(&str, &[&str])]) -> Result<Self, RegistryError> {
        Self::new(table.iter().map(|(id, aliases)| {
            (
                id.to_string(),
                aliases.iter().map(|a| a.to_string()).collect::<Vec<_>>(),
            )
        }))
    }

    /// Canonical identifiers in registry order.
    pub fn chain_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }

    /// Folded aliases accepted for `chain_id`.
    pub fn aliases(&self, chain_id: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.id == chain_id)
            .map(|e| e.aliases.as_slice())
    }

    /// Resolves user input to a canonical chain identifier.
    ///
    /// An exact (case-insensitive, trimmed) alias match always wins. Otherwise the
    /// alias with the highest similarity ratio at or above the cutoff is chosen;
    /// on equal scores the alias met first in registry order is kept. The ratio
    /// is taken with the alias as the first sequence.
    pub fn resolve(&self, input: &str) -> Option<&str> {
        let needle = input.trim().to_lowercase();

        if let Some(&index) = self.by_alias.get(&needle) {
            return Some(self.entries[index].id.as_str());
        }

        let mut best: Option<(f64, &str)> = None;
        for entry in &self.entries {
            for alias in &entry.aliases {
                let score = ratio(alias, &needle);
                if score < FUZZY_MATCH_CUTOFF {
                    continue;
                }
                if best.map_or(true, |(top, _)| score > top) {
                    best = Some((score, entry.id.as_str()));
                }
            }
        }

        if let Some((score, id)) = best {
            tracing::debug!("Fuzzy-matched chain input to {} (score {:.3})", id, score);
        }
        best.map(|(_, id)| id)
    }
}
