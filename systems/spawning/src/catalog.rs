//! Fixed bug catalog and the shuffled draw sequence over it.

use defense_arcade_core::{BugCategory, BugDefinition, DefinitionId};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Number of entries in the catalog.
pub const CATALOG_SIZE: usize = 75;

const PER_CATEGORY: usize = CATALOG_SIZE / 3;

const LABELS: [&str; CATALOG_SIZE] = [
    "Off-by-one error",
    "Wrong variable type",
    "Null pointer in util",
    "GST calc wrong",
    "Rounding mismatch",
    "Missing validation",
    "Incorrect loop bound",
    "Uninitialized var",
    "Edge-case divide by zero",
    "Wrong default value",
    "Wrong comparator",
    "Floating precision bug",
    "Wrong sign on calculation",
    "Index out of range",
    "Incorrect accumulator",
    "Wrong math formula",
    "Missing unit test",
    "Order of operations bug",
    "Bad regex logic",
    "Wrong constant used",
    "Locale number parse bug",
    "Time-zone handling bug",
    "Incorrect flag check",
    "State mutation bug",
    "Callback misuse",
    "API contract mismatch",
    "Missing response field",
    "Wrong HTTP status",
    "Schema version mismatch",
    "Field type mismatch",
    "Unexpected null in response",
    "Header missing",
    "Wrong content-type",
    "Response shape changed",
    "Deprecated field used",
    "Payload key typo",
    "Missing required param",
    "Extra field in response",
    "Versioning mismatch",
    "Incorrect enum value",
    "Invalid JSON format",
    "Missing validation in schema",
    "Query param name typo",
    "Incorrect date format",
    "Wrong pagination format",
    "Incorrect status code mapping",
    "Auth header name mismatch",
    "Field maxLength exceeded",
    "Wrong field encoding",
    "Trailing comma in response",
    "DB query fails intermittently",
    "Config missing in CI",
    "Container env mismatch",
    "Service timeout in cluster",
    "Race condition across services",
    "Circuit breaker not set",
    "Retry logic missing",
    "Downstream API latency",
    "Wrong endpoint routing",
    "Auth token refresh failure",
    "Network partition issue",
    "Load balancer misroute",
    "Session stickiness lost",
    "Wrong service discovery",
    "SSL cert mismatch",
    "Timeout too low",
    "Ordering of messages wrong",
    "Transaction not rolled back",
    "Cache invalidation bug",
    "Feature flag not propagated",
    "Message queue DLQ spike",
    "Throttling misconfigured",
    "Cross-origin blocked",
    "DNS propagation issue",
    "Legacy endpoint hit",
];

const fn category_at(index: usize) -> BugCategory {
    if index < PER_CATEGORY {
        BugCategory::Unit
    } else if index < PER_CATEGORY * 2 {
        BugCategory::Contract
    } else {
        BugCategory::Integration
    }
}

const fn build_catalog() -> [BugDefinition; CATALOG_SIZE] {
    let mut entries =
        [BugDefinition::new(DefinitionId::new(0), "", BugCategory::Unit); CATALOG_SIZE];
    let mut index = 0;
    while index < CATALOG_SIZE {
        entries[index] =
            BugDefinition::new(DefinitionId::new(index as u16), LABELS[index], category_at(index));
        index += 1;
    }
    entries
}

/// Every bug definition, grouped by category in catalog order.
pub const CATALOG: [BugDefinition; CATALOG_SIZE] = build_catalog();

/// Infinite sequence of catalog draws.
///
/// Each pass over the catalog is an independent uniform permutation, so a
/// definition can repeat only across a reshuffle boundary.
#[derive(Debug)]
pub struct BugCatalog {
    rng: ChaCha8Rng,
    queue: Vec<BugDefinition>,
}

impl BugCatalog {
    /// Creates a draw sequence seeded with the provided value.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            queue: Vec::with_capacity(CATALOG_SIZE),
        }
    }

    /// Returns the next definition, reshuffling once the current pass is exhausted.
    pub fn draw(&mut self) -> BugDefinition {
        loop {
            if let Some(definition) = self.queue.pop() {
                return definition;
            }
            self.queue.extend_from_slice(&CATALOG);
            self.queue.shuffle(&mut self.rng);
        }
    }

    /// Number of draws left before the next reshuffle.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_follow_index_order() {
        for (index, definition) in CATALOG.iter().enumerate() {
            assert_eq!(usize::from(definition.id().get()), index);
            assert!(!definition.label().is_empty());
        }
    }

    #[test]
    fn categories_split_evenly() {
        for category in BugCategory::ALL {
            let count = CATALOG
                .iter()
                .filter(|definition| definition.category() == category)
                .count();
            assert_eq!(count, PER_CATEGORY);
        }
        assert_eq!(CATALOG[24].category(), BugCategory::Unit);
        assert_eq!(CATALOG[25].category(), BugCategory::Contract);
        assert_eq!(CATALOG[50].category(), BugCategory::Integration);
    }

    #[test]
    fn first_draw_fills_the_queue() {
        let mut catalog = BugCatalog::new(7);
        assert_eq!(catalog.pending(), 0);
        let _ = catalog.draw();
        assert_eq!(catalog.pending(), CATALOG_SIZE - 1);
    }
}
