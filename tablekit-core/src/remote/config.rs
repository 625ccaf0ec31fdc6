//! Bridge configuration
//!
//! The whitelist of `"Target.method"` entries the dispatcher may invoke.
//! It is injected explicitly into the dispatcher rather than read from a
//! global property; membership is exact and case-sensitive, with no
//! wildcards.

use std::collections::HashSet;

use crate::remote::protocol::names;

/// Entries allowed when no whitelist is configured
pub const DEFAULT_WHITELIST: &[&str] = &[
    "RecordQueryService.getRecordList",
    "RecordAccessService.getRecord",
];

/// Whitelist configuration for the bridge dispatcher
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    whitelist: HashSet<String>,
}

impl BridgeConfig {
    /// Creates a configuration with the built-in default whitelist
    pub fn new() -> Self {
        Self {
            whitelist: DEFAULT_WHITELIST.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Creates a configuration with an empty whitelist
    pub fn empty() -> Self {
        Self {
            whitelist: HashSet::new(),
        }
    }

    /// Creates a configuration from a comma-delimited property string
    ///
    /// An absent property falls back to the default whitelist. Entries
    /// are taken verbatim; membership checks are exact string matches.
    pub fn from_property(property: Option<&str>) -> Self {
        match property {
            Some(raw) => Self {
                whitelist: raw
                    .split(',')
                    .filter(|entry| !entry.is_empty())
                    .map(|entry| entry.to_string())
                    .collect(),
            },
            None => Self::new(),
        }
    }

    /// Adds a `"Target.method"` entry to the whitelist
    pub fn allow(mut self, entry: impl Into<String>) -> Self {
        self.whitelist.insert(entry.into());
        self
    }

    /// Allows every standard record service method
    pub fn allow_all_record_services(self) -> Self {
        self.allow(format!("{}.{}", names::QUERY_SERVICE, names::GET_RECORD_LIST))
            .allow(format!("{}.{}", names::ACCESS_SERVICE, names::GET_RECORD))
            .allow(format!("{}.{}", names::MUTATION_SERVICE, names::INSERT_RECORD))
            .allow(format!("{}.{}", names::MUTATION_SERVICE, names::DELETE_RECORDS))
    }

    /// Returns whether a `"Target.method"` key is whitelisted
    pub fn is_allowed(&self, key: &str) -> bool {
        self.whitelist.contains(key)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_whitelist() {
        let config = BridgeConfig::new();
        assert!(config.is_allowed("RecordQueryService.getRecordList"));
        assert!(config.is_allowed("RecordAccessService.getRecord"));
        assert!(!config.is_allowed("RecordMutationService.insertRecord"));
    }

    #[test]
    fn test_from_property_parses_comma_delimited_entries() {
        let config = BridgeConfig::from_property(Some(
            "OtherService.method,RecordQueryService.getRecordList",
        ));
        assert!(config.is_allowed("OtherService.method"));
        assert!(config.is_allowed("RecordQueryService.getRecordList"));
        assert!(!config.is_allowed("RecordAccessService.getRecord"));
    }

    #[test]
    fn test_from_property_absent_falls_back_to_default() {
        let config = BridgeConfig::from_property(None);
        assert!(config.is_allowed("RecordQueryService.getRecordList"));
    }

    #[test]
    fn test_membership_is_case_sensitive_and_exact() {
        let config = BridgeConfig::from_property(Some("SvcA.run"));
        assert!(config.is_allowed("SvcA.run"));
        assert!(!config.is_allowed("svca.run"));
        assert!(!config.is_allowed("SvcA.run "));
        assert!(!config.is_allowed("SvcA.*"));
    }

    #[test]
    fn test_allow_extends_whitelist() {
        let config = BridgeConfig::empty().allow("SvcB.go");
        assert!(config.is_allowed("SvcB.go"));
        assert!(!config.is_allowed("RecordQueryService.getRecordList"));
    }
}
