use crate::skills::catalog::Catalog;
use crate::skills::project_config::ProjectConfig;
use std::collections::{BTreeMap, BTreeSet};

/// Difference between the catalog and the names recorded in a project config.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// In the catalog, not yet in the config.
    pub added: Vec<String>,
    /// In the config, gone from the catalog.
    pub removed: Vec<String>,
}

impl Reconciliation {
    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

pub fn reconcile(catalog: &Catalog, config: &ProjectConfig) -> Reconciliation {
    diff(&catalog.names(), config)
}

pub fn diff(available: &BTreeSet<String>, config: &ProjectConfig) -> Reconciliation {
    let configured: BTreeSet<String> = config.skills.keys().cloned().collect();
    Reconciliation {
        added: available.difference(&configured).cloned().collect(),
        removed: configured.difference(available).cloned().collect(),
    }
}

/// Drops config keys for skills that left the catalog.
pub fn apply_pruning(config: &mut ProjectConfig, reconciliation: &Reconciliation) {
    for name in &reconciliation.removed {
        config.remove(name);
    }
}

/// Records answers for newly discovered skills. Unanswered ones are
/// recorded as disabled so they are not offered again.
pub fn apply_decisions(
    config: &mut ProjectConfig,
    reconciliation: &Reconciliation,
    decisions: &BTreeMap<String, bool>,
) -> Vec<String> {
    let mut enabled = Vec::new();
    for name in &reconciliation.added {
        let on = decisions.get(name).copied().unwrap_or(false);
        config.set(name, on);
        if on {
            enabled.push(name.clone());
        }
    }
    enabled
}
