use serde::Serialize;

use crate::borrow::{BorrowEntry, outstanding_quantity};
use crate::catalog::Catalog;
use crate::fixture::FixtureKey;

/// Units on the shelf: baseline minus outstanding, floored at zero.
pub fn availability(baseline: u32, outstanding: u32) -> u32 {
    baseline.saturating_sub(outstanding)
}

/// Availability breakdown for one (article, system) pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub baseline: u32,
    pub outstanding: u32,
    pub available: u32,
}

impl Availability {
    pub fn compute(catalog: &Catalog, entries: &[BorrowEntry], key: &FixtureKey) -> Self {
        Self::from_outstanding(catalog.baseline(key), outstanding_quantity(entries, key))
    }

    pub fn from_outstanding(baseline: u32, outstanding: u32) -> Self {
        Self {
            baseline,
            outstanding,
            available: availability(baseline, outstanding),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_at_zero() {
        assert_eq!(availability(2, 5), 0);
        assert_eq!(availability(10, 3), 7);
    }
}
