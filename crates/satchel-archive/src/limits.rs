//! Decode budgets

use crate::{ArchiveError, ArchiveResult};
use satchel_core::ArchiveConfig;

/// Upper bounds applied while decoding one archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Total content bytes across all entries
    pub max_unpacked_bytes: u64,
    pub max_entries: u64,
}

impl Limits {
    pub const DEFAULT_MAX_UNPACKED_BYTES: u64 = 1024 * 1024 * 1024;
    pub const DEFAULT_MAX_ENTRIES: u64 = 100_000;

    pub fn new(max_unpacked_bytes: u64, max_entries: u64) -> Self {
        Self {
            max_unpacked_bytes,
            max_entries,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(u64::MAX, u64::MAX)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_UNPACKED_BYTES, Self::DEFAULT_MAX_ENTRIES)
    }
}

impl From<&ArchiveConfig> for Limits {
    fn from(config: &ArchiveConfig) -> Self {
        Self::new(config.max_unpacked_bytes, config.max_entries)
    }
}

/// Running totals checked against [`Limits`] before content is read
#[derive(Debug, Clone)]
pub(crate) struct Budget {
    limits: Limits,
    entries: u64,
    bytes: u64,
}

impl Budget {
    pub(crate) fn new(limits: Limits) -> Self {
        Self {
            limits,
            entries: 0,
            bytes: 0,
        }
    }

    /// Fail early when the header already declares too many entries
    pub(crate) fn check_declared_entries(&self, declared: u64) -> ArchiveResult<()> {
        if declared > self.limits.max_entries {
            return Err(ArchiveError::SizeLimitExceeded(format!(
                "archive declares {declared} entries, limit is {}",
                self.limits.max_entries
            )));
        }
        Ok(())
    }

    /// Account for one entry with `size` content bytes
    pub(crate) fn charge(&mut self, path: &str, size: u64) -> ArchiveResult<()> {
        let entries = self.entries + 1;
        if entries > self.limits.max_entries {
            return Err(ArchiveError::SizeLimitExceeded(format!(
                "more than {} entries",
                self.limits.max_entries
            )));
        }

        let bytes = self.bytes.saturating_add(size);
        if bytes > self.limits.max_unpacked_bytes {
            return Err(ArchiveError::SizeLimitExceeded(format!(
                "entry `{path}` would bring decoded content to {bytes} bytes, limit is {}",
                self.limits.max_unpacked_bytes
            )));
        }

        self.entries = entries;
        self.bytes = bytes;
        Ok(())
    }

    pub(crate) fn bytes(&self) -> u64 {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn Limits___from_config___copies_budgets() {
        let config = satchel_core::Config::default();

        let limits = Limits::from(&config.archive);

        assert_eq!(limits, Limits::default());
    }

    #[test]
    fn Budget___bytes_over_limit___fails_before_counting() {
        let mut budget = Budget::new(Limits::new(10, 100));
        budget.charge("a", 6).unwrap();

        let err = budget.charge("b", 5).unwrap_err();

        assert!(matches!(err, ArchiveError::SizeLimitExceeded(_)));
        assert_eq!(budget.bytes(), 6);
    }

    #[test]
    fn Budget___entry_over_limit___fails() {
        let mut budget = Budget::new(Limits::new(100, 2));
        budget.charge("a", 0).unwrap();
        budget.charge("b", 0).unwrap();

        assert!(budget.charge("c", 0).is_err());
    }

    #[test]
    fn Budget___declared_entries_over_limit___fails() {
        let budget = Budget::new(Limits::new(100, 2));

        assert!(budget.check_declared_entries(2).is_ok());
        assert!(budget.check_declared_entries(3).is_err());
    }

    #[test]
    fn Budget___huge_size___does_not_overflow() {
        let mut budget = Budget::new(Limits::unlimited());
        budget.charge("a", u64::MAX - 1).unwrap();

        budget.charge("b", u64::MAX).unwrap();

        assert_eq!(budget.bytes(), u64::MAX);
    }
}
