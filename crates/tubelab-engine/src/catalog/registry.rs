use std::collections::HashMap;

use crate::api::types::ChemicalId;
use crate::catalog::manifest::{
    Chemical, ChemicalClass, ChemicalManifest, DangerThresholds, RuleOutcome,
};

/// Embed the default catalog at compile time.
const DEFAULT_CATALOG_JSON: &str = include_str!("../../data/chemicals.json");

/// Read-only chemical lookup, built from a [`ChemicalManifest`].
///
/// Pair and class rules are stored under a normalized key `(min, max)` so
/// lookups are independent of argument order.
#[derive(Debug, Clone, Default)]
pub struct ChemicalCatalog {
    chemicals: HashMap<ChemicalId, Chemical>,
    pair_rules: HashMap<(ChemicalId, ChemicalId), RuleOutcome>,
    class_rules: HashMap<(ChemicalClass, ChemicalClass), RuleOutcome>,
    danger: DangerThresholds,
}

fn ordered<T: Ord>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl ChemicalCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self, serde_json::Error> {
        let manifest = ChemicalManifest::from_json(DEFAULT_CATALOG_JSON)?;
        Ok(Self::from_manifest(&manifest))
    }

    /// Parse and build in one step.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let manifest = ChemicalManifest::from_json(json)?;
        Ok(Self::from_manifest(&manifest))
    }

    /// Build a catalog. Duplicate ids keep the last entry; rules naming
    /// unknown chemicals are dropped.
    pub fn from_manifest(manifest: &ChemicalManifest) -> Self {
        let mut chemicals = HashMap::with_capacity(manifest.chemicals.len());
        for chemical in &manifest.chemicals {
            if chemicals.insert(chemical.id.clone(), chemical.clone()).is_some() {
                log::warn!("catalog: duplicate chemical '{}', keeping the last entry", chemical.id);
            }
        }

        let mut pair_rules = HashMap::with_capacity(manifest.pair_rules.len());
        for rule in &manifest.pair_rules {
            if !chemicals.contains_key(&rule.a) || !chemicals.contains_key(&rule.b) {
                log::warn!("catalog: rule {} + {} names an unknown chemical, skipped", rule.a, rule.b);
                continue;
            }
            pair_rules.insert(ordered(rule.a.clone(), rule.b.clone()), rule.outcome.clone());
        }

        let class_rules = manifest
            .class_rules
            .iter()
            .map(|rule| (ordered(rule.a, rule.b), rule.outcome.clone()))
            .collect();

        Self {
            chemicals,
            pair_rules,
            class_rules,
            danger: manifest.danger,
        }
    }

    /// Look up a chemical by id. Returns None if not found.
    pub fn get(&self, id: &ChemicalId) -> Option<&Chemical> {
        self.chemicals.get(id)
    }

    pub fn contains(&self, id: &ChemicalId) -> bool {
        self.chemicals.contains_key(id)
    }

    /// Rule for a specific pair of chemicals, in either order.
    pub fn pair_rule(&self, a: &ChemicalId, b: &ChemicalId) -> Option<&RuleOutcome> {
        self.pair_rules.get(&ordered(a.clone(), b.clone()))
    }

    /// Rule for a pair of chemical classes, in either order.
    pub fn class_rule(&self, a: ChemicalClass, b: ChemicalClass) -> Option<&RuleOutcome> {
        self.class_rules.get(&ordered(a, b))
    }

    /// Specific pair rule first, then the class rule.
    pub fn rule_between(&self, a: &Chemical, b: &Chemical) -> Option<&RuleOutcome> {
        self.pair_rule(&a.id, &b.id)
            .or_else(|| self.class_rule(a.class, b.class))
    }

    pub fn danger(&self) -> DangerThresholds {
        self.danger
    }

    /// All chemicals sorted by id.
    pub fn chemicals(&self) -> Vec<&Chemical> {
        let mut all: Vec<&Chemical> = self.chemicals.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    pub fn len(&self) -> usize {
        self.chemicals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chemicals.is_empty()
    }
}
