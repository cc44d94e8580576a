//! Code → action tables.
//!
//! Each deployment declares a default table shared by every board plus
//! optional per-device tables for boards whose codes mean something else.
//! Lookups try the device table first and fall back to the default table.

use std::collections::{BTreeMap, HashMap};

use puzzlebox_core::Action;
use puzzlebox_core::constants::DEFAULT_CODE_TABLE;

/// Immutable mapping from (device, message code) to [`Action`].
///
/// # Examples
///
/// ```
/// use puzzlebox_core::{Action, ClipId};
/// use puzzlebox_protocol::CodeTable;
///
/// let mut table = CodeTable::new();
/// table.insert_default("19", Action::StopCurrent);
/// table.insert_for_device("engine-room", "20", Action::MarkSolved {
///     clip: ClipId::new("gearsound1"),
/// });
///
/// assert_eq!(table.lookup("crypt-gears", "19"), Some(&Action::StopCurrent));
/// assert!(table.lookup("crypt-gears", "20").is_none());
/// assert!(table.lookup("engine-room", "20").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    default: HashMap<String, Action>,
    per_device: HashMap<String, HashMap<String, Action>>,
}

impl CodeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from the `[codes]` section of the configuration.
    ///
    /// The table named `"default"` becomes the shared table; every other
    /// table is keyed by device name. Codes are trimmed.
    pub fn from_config(codes: &BTreeMap<String, BTreeMap<String, Action>>) -> Self {
        let mut table = Self::new();
        for (name, entries) in codes {
            for (code, action) in entries {
                if name == DEFAULT_CODE_TABLE {
                    table.insert_default(code, action.clone());
                } else {
                    table.insert_for_device(name, code, action.clone());
                }
            }
        }
        table
    }

    /// Add an entry to the shared table.
    pub fn insert_default(&mut self, code: &str, action: Action) {
        self.default.insert(code.trim().to_string(), action);
    }

    /// Add an entry to the table of one device.
    pub fn insert_for_device(&mut self, device: &str, code: &str, action: Action) {
        self.per_device
            .entry(device.to_string())
            .or_default()
            .insert(code.trim().to_string(), action);
    }

    /// Find the action for `message` received from `device`.
    ///
    /// Comparison is on the exact string; callers pass trimmed messages.
    pub fn lookup(&self, device: &str, message: &str) -> Option<&Action> {
        self.per_device
            .get(device)
            .and_then(|codes| codes.get(message))
            .or_else(|| self.default.get(message))
    }

    /// Total number of entries across all tables.
    pub fn len(&self) -> usize {
        self.default.len() + self.per_device.values().map(HashMap::len).sum::<usize>()
    }

    /// Check whether no entry exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
