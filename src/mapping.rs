//! Note-to-command mapping table
//!
//! Maps MIDI note numbers to named, platform-aware command specifications.
//! The table is built once at startup and never mutated afterwards.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::platform::Platform;

/// Per-platform command strings for one pad.
///
/// Not every pad defines every key; `default` is the cross-platform fallback.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CommandSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub darwin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linux: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl CommandSet {
    /// Select the command for a platform: exact key first, then `default`.
    ///
    /// Pure function; `None` means "no command available" and the caller is
    /// expected to report it.
    pub fn resolve(&self, platform: Platform) -> Option<&str> {
        let exact = match platform {
            Platform::Windows => self.windows.as_deref(),
            Platform::Darwin => self.darwin.as_deref(),
            Platform::Linux => self.linux.as_deref(),
            Platform::Other => None,
        };
        exact.or(self.default.as_deref())
    }
}

/// One pad assignment: note number, display name, commands
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PadMapping {
    pub note: u8,
    pub name: String,
    pub command: CommandSet,
}

/// Immutable note → pad lookup table
#[derive(Debug, Clone)]
pub struct MappingTable {
    entries: HashMap<u8, PadMapping>,
}

impl MappingTable {
    /// Build the table, rejecting invalid note numbers and duplicate
    /// assignments. Duplicates are a configuration error, never merged.
    pub fn from_entries(pads: Vec<PadMapping>) -> Result<Self> {
        let mut entries: HashMap<u8, PadMapping> = HashMap::with_capacity(pads.len());

        for pad in pads {
            if pad.note > 127 {
                bail!("Invalid note number {} for '{}' (must be 0-127)", pad.note, pad.name);
            }
            if let Some(existing) = entries.get(&pad.note) {
                bail!(
                    "Duplicate mapping for note {}: '{}' and '{}'",
                    pad.note,
                    existing.name,
                    pad.name
                );
            }
            entries.insert(pad.note, pad);
        }

        Ok(Self { entries })
    }

    /// Look up the pad assigned to a note, if any
    pub fn lookup(&self, note: u8) -> Option<&PadMapping> {
        self.entries.get(&note)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All pads in ascending note order, for display
    pub fn iter_sorted(&self) -> impl Iterator<Item = &PadMapping> {
        let mut pads: Vec<&PadMapping> = self.entries.values().collect();
        pads.sort_by_key(|p| p.note);
        pads.into_iter()
    }
}
