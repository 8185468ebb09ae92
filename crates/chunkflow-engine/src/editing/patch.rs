use serde::{Deserialize, Serialize};

use crate::editing::ChangeScope;
use crate::models::SegmentId;

/// Which pipeline an accepted mutation went through
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditPath {
    /// Text was identical, nothing committed
    Unchanged,
    /// Existing segments were shifted and resized in place
    Remapped,
    /// Segments were rebuilt from the text and reconciled with the old ones
    Resegmented,
}

/// Result of a committed mutation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// Document version after the mutation
    pub version: u64,
    pub path: EditPath,
    pub scope: ChangeScope,
    /// Surviving segments whose text changed
    pub changed: Vec<SegmentId>,
    /// Segments that did not exist before
    pub created: Vec<SegmentId>,
    /// Segments that no longer exist
    pub removed: Vec<SegmentId>,
}

impl Patch {
    pub(crate) fn unchanged(version: u64) -> Self {
        Self {
            version,
            path: EditPath::Unchanged,
            scope: ChangeScope::Local,
            changed: Vec::new(),
            created: Vec::new(),
            removed: Vec::new(),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.path == EditPath::Unchanged
    }
}
