//! Reconciliation of configured mappings into a registry.
//!
//! # Rules
//! - A configured mapping already stored with identical fields is left alone
//! - Every other configured mapping is upserted
//! - Patterns configured previously but not any more are removed
//! - Mappings never declared in config are not touched

use std::collections::HashSet;

use crate::config::MappingConfig;
use crate::mapping::normalize::{normalize_destination, normalize_pattern};
use crate::mapping::{Mapping, MappingRegistry, RegistryResult};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub upserted: usize,
    pub unchanged: usize,
    pub removed: usize,
}

impl SyncReport {
    pub fn changed(&self) -> bool {
        self.upserted > 0 || self.removed > 0
    }
}

fn as_stored(seed: &MappingConfig) -> Mapping {
    Mapping::new(
        normalize_pattern(&seed.pattern),
        normalize_destination(&seed.destination, seed.is_local),
        seed.is_local,
        seed.is_active,
    )
}

/// Bring `registry` in line with `desired`, given the previously applied set.
///
/// Stops at the first registry error; work done before it is kept.
pub async fn apply(
    registry: &MappingRegistry,
    desired: &[MappingConfig],
    previous: &[MappingConfig],
) -> RegistryResult<SyncReport> {
    let mut report = SyncReport::default();
    let current = registry.list_mappings().await?;

    let wanted: HashSet<String> = desired.iter().map(|m| normalize_pattern(&m.pattern)).collect();

    for seed in desired {
        let target = as_stored(seed);
        if current.contains(&target) {
            report.unchanged += 1;
            continue;
        }
        registry
            .upsert(&seed.pattern, &seed.destination, seed.is_local, seed.is_active)
            .await?;
        report.upserted += 1;
    }

    let mut dropped = HashSet::new();
    for seed in previous {
        let pattern = normalize_pattern(&seed.pattern);
        if wanted.contains(&pattern) || !dropped.insert(pattern.clone()) {
            continue;
        }
        if registry.remove(&pattern).await? {
            report.removed += 1;
        }
    }

    tracing::info!(
        upserted = report.upserted,
        unchanged = report.unchanged,
        removed = report.removed,
        "Mappings synchronized"
    );
    Ok(report)
}
